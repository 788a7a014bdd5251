use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use super::Reading;

/// Capture time column format, always zero padded
pub const TIME_FORMAT: &str = "%H:%M:%S";

/// One persisted weighing result.
///
/// Only built from a ready reading whose registers were both read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeighRecord {
    pub address: i64,
    pub weight_before: i64,
    pub weight_after: i64,
    pub weight_total: i64,
    pub date: NaiveDate,
    pub time: String,
    pub action: i64,
}

impl WeighRecord {
    /// Build a record from a reading captured at `at`.
    /// Returns `None` when the device did not report new data.
    pub fn capture(reading: &Reading, at: NaiveDateTime) -> Option<Self> {
        if !reading.ready_flag {
            return None;
        }

        Some(Self {
            address: i64::from(reading.device_address.value()),
            weight_before: i64::from(reading.weight_before),
            weight_after: i64::from(reading.weight_after),
            weight_total: reading.weight_total(),
            date: at.date(),
            time: format_time(at.time()),
            action: 0,
        })
    }
}

pub fn format_time(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}
