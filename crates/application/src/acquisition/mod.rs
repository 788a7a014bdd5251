mod acquisition_loop;

pub use acquisition_loop::{AcquisitionError, AcquisitionLoop, DeviceOutcome};
