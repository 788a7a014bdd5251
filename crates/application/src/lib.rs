//! Application layer - Acquisition workflow

pub mod acquisition;

pub use acquisition::{AcquisitionError, AcquisitionLoop, DeviceOutcome};
