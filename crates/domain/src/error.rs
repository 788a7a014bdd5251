use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Invalid unit id: {0}")]
    InvalidUnitId(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Invalid driver configuration: {0}")]
    InvalidDriverConfig(String),

    #[error("Driver error: {0}")]
    DriverError(String),

    #[error("Request timed out after {0}ms")]
    Timeout(u64),
}

pub type Result<T> = std::result::Result<T, DomainError>;
