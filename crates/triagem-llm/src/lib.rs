//! triagem-llm: Free-text → symptom-list extraction through an LLM.
//!
//! The analysis pipeline only sees the [`extraction::SymptomExtractor`] trait;
//! the backends here are the HTTP plumbing behind the production extractor.

pub mod backend;
pub mod extraction;

pub use backend::{build_backend, LlmBackend, LlmError, OllamaBackend, OpenAiCompatibleBackend};
pub use extraction::{FailingExtractor, LlmSymptomExtractor, StaticExtractor, SymptomExtractor};
