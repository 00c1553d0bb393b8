//! Shared application state for the web server.

use std::sync::Arc;

use triagem_analysis::AnalysisService;

/// Shared state injected into every Axum handler.
#[derive(Clone)]
pub struct AppState {
    pub analysis: Arc<AnalysisService>,
}

impl AppState {
    pub fn new(analysis: Arc<AnalysisService>) -> Self {
        Self { analysis }
    }
}

pub type SharedState = Arc<AppState>;
