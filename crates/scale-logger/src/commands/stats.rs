use std::path::Path;

use anyhow::{Context, Result};
use infrastructure::storage::{DbfTable, TableStats};

pub fn run(table_path: &Path) -> Result<TableStats> {
    let table = DbfTable::open_read_only(table_path)
        .with_context(|| format!("failed to open {}", table_path.display()))?;
    let stats = table.stats();
    table.close()?;
    Ok(stats)
}
