use std::io::ErrorKind;
use std::path::Path;

use domain::WeighRecord;
use tracing::info;

use super::dbf::{CodePage, DbfError, DbfTable, FieldDescriptor, Row};

pub const COLUMN_ADDRESS: &str = "ADR";
pub const COLUMN_WEIGHT_BEFORE: &str = "WBBFORE";
pub const COLUMN_WEIGHT_AFTER: &str = "WBAFTER";
pub const COLUMN_WEIGHT_TOTAL: &str = "WBTOTAL";
pub const COLUMN_DATE: &str = "DATEW";
pub const COLUMN_TIME: &str = "TIMEW";
pub const COLUMN_ACTION: &str = "ACT";

const NUMERIC_WIDTH: u8 = 10;
const TIME_WIDTH: u8 = 10;

pub fn weigh_columns() -> Result<Vec<FieldDescriptor>, DbfError> {
    Ok(vec![
        FieldDescriptor::numeric(COLUMN_ADDRESS, NUMERIC_WIDTH)?,
        FieldDescriptor::numeric(COLUMN_WEIGHT_BEFORE, NUMERIC_WIDTH)?,
        FieldDescriptor::numeric(COLUMN_WEIGHT_AFTER, NUMERIC_WIDTH)?,
        FieldDescriptor::numeric(COLUMN_WEIGHT_TOTAL, NUMERIC_WIDTH)?,
        FieldDescriptor::date(COLUMN_DATE)?,
        FieldDescriptor::character(COLUMN_TIME, TIME_WIDTH)?,
        FieldDescriptor::numeric(COLUMN_ACTION, NUMERIC_WIDTH)?,
    ])
}

/// Create the results table unless the file is already there.
/// Returns `true` when a new file was written.
pub fn create_table_if_missing(path: &Path) -> Result<bool, DbfError> {
    if path.exists() {
        return Ok(false);
    }

    match DbfTable::create(path, weigh_columns()?, CodePage::Windows1250) {
        Ok(table) => {
            table.close()?;
            info!(path = %path.display(), "Created new DBF file");
            Ok(true)
        }
        Err(DbfError::Io(e)) if e.kind() == ErrorKind::AlreadyExists => Ok(false),
        Err(e) => Err(e),
    }
}

pub fn record_to_row(record: &WeighRecord) -> Row {
    Row::new()
        .with(COLUMN_ADDRESS, record.address)
        .with(COLUMN_WEIGHT_BEFORE, record.weight_before)
        .with(COLUMN_WEIGHT_AFTER, record.weight_after)
        .with(COLUMN_WEIGHT_TOTAL, record.weight_total)
        .with(COLUMN_DATE, record.date)
        .with(COLUMN_TIME, record.time.as_str())
        .with(COLUMN_ACTION, record.action)
}
