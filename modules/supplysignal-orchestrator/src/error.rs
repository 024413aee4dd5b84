use thiserror::Error;

use supplysignal_common::SupplySignalError;
use supplysignal_store::StoreError;

#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error("Unknown workflow: {0}")]
    UnknownWorkflow(String),

    #[error("Unknown capability: {0}")]
    UnknownCapability(String),

    #[error("{capability} requires {requires} to run first")]
    MissingPrerequisite {
        capability: &'static str,
        requires: &'static str,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<serde_json::Error> for OrchestratorError {
    fn from(e: serde_json::Error) -> Self {
        OrchestratorError::InvalidInput(e.to_string())
    }
}

impl From<OrchestratorError> for SupplySignalError {
    fn from(e: OrchestratorError) -> Self {
        match e {
            OrchestratorError::UnknownWorkflow(name) => SupplySignalError::UnknownWorkflow(name),
            OrchestratorError::UnknownCapability(name) => SupplySignalError::UnknownCapability(name),
            OrchestratorError::Store(e) => e.into(),
            other => SupplySignalError::Anyhow(anyhow::anyhow!(other.to_string())),
        }
    }
}

pub type OrchestratorResult<T> = Result<T, OrchestratorError>;
