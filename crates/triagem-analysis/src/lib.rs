//! triagem-analysis: Message in, symptoms and suggested specialties out.
//!
//! Pipeline: extract (LLM) → match (dictionary) → predict (classifier) → assemble.

pub mod dto;
pub mod service;

pub use dto::{AnalysisRequest, AnalysisResponse};
pub use service::AnalysisService;
