use thiserror::Error;
use uuid::Uuid;

use supplysignal_common::SupplySignalError;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage failure: {0}")]
    Storage(String),

    #[error("Disruption not found: {0}")]
    NotFound(Uuid),

    #[error("Corrupt record: {0}")]
    Decode(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Storage(err.to_string())
    }
}

impl From<StoreError> for SupplySignalError {
    fn from(err: StoreError) -> Self {
        SupplySignalError::Storage(err.to_string())
    }
}
