use async_trait::async_trait;
use thiserror::Error;

use crate::weighing::WeighRecord;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum StorageError {
    #[error("Failed to open table {path}: {reason}")]
    Open { path: String, reason: String },
    #[error("Failed to encode row: {0}")]
    Encode(String),
    #[error("Failed to write row: {0}")]
    Write(String),
}

impl StorageError {
    /// Open failures leave the table untouched and can be retried next tick.
    /// Anything past that point may have left a partial row behind.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Open { .. })
    }
}

/// Persistent sink for weighing records
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Append one record, fully durable when `Ok` is returned
    async fn append(&self, record: &WeighRecord) -> Result<(), StorageError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_errors_are_not_fatal() {
        let err = StorageError::Open {
            path: "TEST22.DBF".into(),
            reason: "locked".into(),
        };
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_encode_and_write_errors_are_fatal() {
        assert!(StorageError::Encode("overflow".into()).is_fatal());
        assert!(StorageError::Write("disk full".into()).is_fatal());
    }

    #[test]
    fn test_open_error_message_names_path() {
        let err = StorageError::Open {
            path: "RESULTS.DBF".into(),
            reason: "locked".into(),
        };
        assert_eq!(err.to_string(), "Failed to open table RESULTS.DBF: locked");
    }
}
