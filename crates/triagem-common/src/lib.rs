//! triagem-common: Shared types, errors, and traits used across all Triagem crates.

pub mod error;
pub mod entities;
pub mod repository;
pub mod config;

// Re-export commonly used types
pub use error::{ErrorKind, Result, TriagemError};
pub use entities::{MedicalSpecialty, Symptom, SymptomVariationMap, SymptomWeightMap};
pub use repository::{InMemorySymptomRepository, SymptomRepository};
pub use config::TriagemConfig;
