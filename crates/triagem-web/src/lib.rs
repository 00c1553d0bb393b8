//! triagem-web: HTTP front end for the symptom analysis pipeline.
//!   - POST /analyze-symptoms
//!   - GET  /health

pub mod router;
pub mod handlers;
pub mod state;
