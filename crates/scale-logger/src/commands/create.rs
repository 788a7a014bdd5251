use std::path::Path;

use anyhow::{Context, Result};
use infrastructure::storage::create_table_if_missing;
use tracing::info;

/// Returns `true` when a new table was written
pub fn run(table_path: &Path) -> Result<bool> {
    let created = create_table_if_missing(table_path)
        .with_context(|| format!("failed to create {}", table_path.display()))?;
    if !created {
        info!(path = %table_path.display(), "DBF file already exists");
    }
    Ok(created)
}
