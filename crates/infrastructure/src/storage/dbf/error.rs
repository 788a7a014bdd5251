use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbfError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Table {0} is locked by another process")]
    Locked(PathBuf),

    #[error("Invalid table header: {0}")]
    InvalidHeader(String),

    #[error("Invalid field definition: {0}")]
    InvalidField(String),

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Field {field} expects a {expected} value")]
    TypeMismatch {
        field: String,
        expected: &'static str,
    },

    #[error("Value for field {field} does not fit in {width} characters")]
    ValueTooWide { field: String, width: u8 },

    #[error("Value for field {field} cannot be represented in {encoding}")]
    Unmappable {
        field: String,
        encoding: &'static str,
    },

    #[error("Record length {actual} does not match table record length {expected}")]
    RecordLength { expected: usize, actual: usize },

    #[error("Record {0} is out of range")]
    RecordOutOfRange(u32),

    #[error("Table is opened read-only")]
    ReadOnly,

    #[error("Invalid value in field {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}
