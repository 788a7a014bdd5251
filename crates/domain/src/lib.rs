//! Domain layer - Pure weighing logic with no external dependencies
//!
//! This crate contains:
//! - Value Objects (UnitId, Reading, WeighRecord)
//! - Poll settings shared by the acquisition loop
//! - Port traits (FieldBus, RecordStore, Clock) implemented by infrastructure
//!
//! Principles:
//! - No dependencies on infrastructure
//! - Record invariants enforced at construction
//! - Testable in isolation

pub mod clock;
pub mod device;
pub mod driver;
pub mod error;
pub mod storage;
pub mod weighing;

// Re-export commonly used types
pub use clock::{Clock, SystemClock};
pub use device::UnitId;
pub use driver::FieldBus;
pub use error::DomainError;
pub use storage::{RecordStore, StorageError};
pub use weighing::{PollSettings, Reading, WeighRecord};
