use std::path::{Path, PathBuf};

use async_trait::async_trait;
use domain::{RecordStore, StorageError, WeighRecord};
use tracing::debug;

use super::dbf::{DbfTable, Row};
use super::weigh_table::record_to_row;

/// Appends each record to the DBF file in its own open/append/close cycle
pub struct DbfRecordStore {
    path: PathBuf,
}

impl DbfRecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl RecordStore for DbfRecordStore {
    async fn append(&self, record: &WeighRecord) -> Result<(), StorageError> {
        let path = self.path.clone();
        let row = record_to_row(record);

        tokio::task::spawn_blocking(move || append_row(&path, &row))
            .await
            .map_err(|e| StorageError::Write(format!("Storage task failed: {e}")))?
    }
}

fn append_row(path: &Path, row: &Row) -> Result<(), StorageError> {
    let mut table = DbfTable::open(path).map_err(|e| StorageError::Open {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    let encoded = table
        .encode_row(row)
        .map_err(|e| StorageError::Encode(e.to_string()))?;
    let index = table
        .append_encoded(&encoded)
        .map_err(|e| StorageError::Write(e.to_string()))?;
    table
        .close()
        .map_err(|e| StorageError::Write(e.to_string()))?;

    debug!(path = %path.display(), index, "Row appended");
    Ok(())
}
