//! dBase III / FoxBase+ table files
//!
//! Layout: a 32-byte header, one 32-byte descriptor per field, a `0x0D`
//! terminator, fixed-width records prefixed by a deletion flag, then `0x1A`.

mod code_page;
mod error;
mod field;
mod header;
mod table;

pub use code_page::CodePage;
pub use error::DbfError;
pub use field::{FieldDescriptor, FieldType, FieldValue};
pub use header::TableHeader;
pub use table::{DbfTable, Row, TableStats};
