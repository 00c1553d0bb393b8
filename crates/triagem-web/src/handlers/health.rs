//! Liveness plus reference-data counts.

use axum::{
    extract::State,
    response::{IntoResponse, Json},
};
use serde::Serialize;

use crate::handlers::ApiError;
use crate::state::SharedState;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub symptom_count: usize,
    pub specialty_count: usize,
}

/// GET /health
pub async fn health(State(state): State<SharedState>) -> Result<impl IntoResponse, ApiError> {
    let symptom_count = state.analysis.matcher().stats()?.symptom_count;
    let specialty_count = state.analysis.predictor().model().model_info()?.classes.len();
    Ok(Json(HealthStatus { status: "ok", symptom_count, specialty_count }))
}
