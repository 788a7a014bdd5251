use crate::device::UnitId;

/// Raw values read from one device during one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reading {
    pub device_address: UnitId,
    pub ready_flag: bool,
    pub weight_before: u16,
    pub weight_after: u16,
}

impl Reading {
    pub fn new(device_address: UnitId, weight_before: u16, weight_after: u16) -> Self {
        Self {
            device_address,
            ready_flag: true,
            weight_before,
            weight_after,
        }
    }

    /// Net weight taken by the cycle. Signed: the after value may exceed the before value.
    pub fn weight_total(&self) -> i64 {
        i64::from(self.weight_before) - i64::from(self.weight_after)
    }
}
