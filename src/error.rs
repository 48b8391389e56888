use crate::store::StoreError;
use thiserror::Error;

pub type AppResult<T> = Result<T, InfraError>;

#[derive(Debug, Error)]
pub enum ConfigErrorKind {
    #[error("failed to read file: {0}")]
    Read(std::io::Error),

    #[error("failed to parse file: {0}")]
    Parse(toml::de::Error),
}

/// Startup and wiring failures. Script evaluation never surfaces these; it only reports
/// status codes.
#[derive(Debug, Error)]
pub enum InfraError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("invalid configuration in {}: {source}", .path.display())]
    Config {
        path: std::path::PathBuf,
        #[source]
        source: ConfigErrorKind,
    },

    #[error("invalid environment variable {0}: {1}")]
    InvalidEnv(String, String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}
