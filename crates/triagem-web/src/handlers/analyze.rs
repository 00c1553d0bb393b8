//! Symptom analysis endpoint.

use axum::{
    extract::State,
    response::{IntoResponse, Json},
};
use triagem_analysis::AnalysisRequest;

use crate::handlers::ApiError;
use crate::state::SharedState;

/// POST /analyze-symptoms
pub async fn analyze_symptoms(
    State(state): State<SharedState>,
    Json(req): Json<AnalysisRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let response = state.analysis.analyze(&req.message).await?;
    Ok(Json(response))
}
