use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TriagemError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Data file not found: {}", .0.display())]
    DataFileMissing(PathBuf),

    #[error("Failed to load prediction model: {0}")]
    ModelLoad(String),

    #[error("Prediction model not loaded")]
    ModelNotLoaded,

    #[error("Ranking failed: {0}")]
    Ranking(String),

    #[error("Symptom extraction failed: {0}")]
    Extraction(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Coarse classification used by callers that report failures (HTTP layer, CLI).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or unreadable reference data / model artifact.
    Configuration,
    /// Extraction or ranking collaborator failed for this request.
    ExternalCall,
    Internal,
}

impl TriagemError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TriagemError::Config(_)
            | TriagemError::DataFileMissing(_)
            | TriagemError::ModelLoad(_)
            | TriagemError::ModelNotLoaded
            | TriagemError::Io(_) => ErrorKind::Configuration,
            TriagemError::Ranking(_) | TriagemError::Extraction(_) => ErrorKind::ExternalCall,
            TriagemError::Serialization(_) | TriagemError::Other(_) => ErrorKind::Internal,
        }
    }
}

pub type Result<T> = std::result::Result<T, TriagemError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_configuration_error() {
        let err = TriagemError::DataFileMissing(PathBuf::from("assets/x.csv"));
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert_eq!(err.to_string(), "Data file not found: assets/x.csv");
    }

    #[test]
    fn test_collaborator_failures_are_external() {
        assert_eq!(TriagemError::Ranking("nan".into()).kind(), ErrorKind::ExternalCall);
        assert_eq!(TriagemError::Extraction("timeout".into()).kind(), ErrorKind::ExternalCall);
    }
}
