pub mod dbf;
mod record_store;
mod weigh_table;

pub use dbf::{
    CodePage, DbfError, DbfTable, FieldDescriptor, FieldType, FieldValue, Row, TableStats,
};
pub use record_store::DbfRecordStore;
pub use weigh_table::{
    COLUMN_ACTION, COLUMN_ADDRESS, COLUMN_DATE, COLUMN_TIME, COLUMN_WEIGHT_AFTER,
    COLUMN_WEIGHT_BEFORE, COLUMN_WEIGHT_TOTAL, create_table_if_missing, record_to_row,
    weigh_columns,
};
