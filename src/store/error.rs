use deadpool_postgres::{BuildError, PoolError};
use thiserror::Error;

// StoreError is the lowest level error type, wrapping errors from the backing stores. It does not
// wrap any higher level errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Pool(#[from] PoolError),

    #[error(transparent)]
    Pg(#[from] tokio_postgres::Error),

    #[error(transparent)]
    Migrate(#[from] refinery::Error),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Stored data is not a JSON object
    #[error("corrupt record {id}: {reason}")]
    Corrupt { id: String, reason: String },
}
