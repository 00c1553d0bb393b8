//! Route handlers and the error type they share.

pub mod analyze;
pub mod health;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use tracing::error;
use triagem_common::{ErrorKind, TriagemError};

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub detail: String,
}

/// Pipeline failure rendered as `500 {"detail": ...}`.
#[derive(Debug)]
pub struct ApiError(pub TriagemError);

impl From<TriagemError> for ApiError {
    fn from(e: TriagemError) -> Self {
        Self(e)
    }
}

impl ApiError {
    pub fn detail(&self) -> String {
        match self.0.kind() {
            ErrorKind::Configuration => {
                format!("Internal server error: Missing required data file. {}", self.0)
            }
            ErrorKind::ExternalCall => format!("Internal server error: {}", self.0),
            ErrorKind::Internal => "An unexpected internal server error occurred.".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!("Analysis failed ({:?}): {}", self.0.kind(), self.0);
        let body = ErrorBody { detail: self.detail() };
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}
