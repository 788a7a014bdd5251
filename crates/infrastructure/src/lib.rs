//! Infrastructure layer - Serial bus, DBF storage and configuration

pub mod config;
pub mod drivers;
pub mod storage;

pub use config::AppConfig;
pub use drivers::{ModbusRtuBus, SerialSettings};
pub use storage::{DbfRecordStore, DbfTable, TableStats};
