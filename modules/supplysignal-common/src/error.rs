use thiserror::Error;

/// Failure taxonomy shared across ingestion, storage and orchestration.
///
/// Only `Storage`, `UnknownWorkflow` and `UnknownCapability` ever cross a
/// component boundary; the rest are recovered where they occur and exist so
/// that recovery sites can log a typed cause.
#[derive(Error, Debug)]
pub enum SupplySignalError {
    #[error("Source unavailable ({source_name}): {reason}")]
    SourceUnavailable { source_name: String, reason: String },

    #[error("Classification invalid: {0}")]
    ClassificationInvalid(String),

    #[error("Storage failure: {0}")]
    Storage(String),

    #[error("Unknown workflow: {0}")]
    UnknownWorkflow(String),

    #[error("Unknown capability: {0}")]
    UnknownCapability(String),

    #[error("Unexpected computation: {0}")]
    UnexpectedComputation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}
