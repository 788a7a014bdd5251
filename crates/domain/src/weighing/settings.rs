use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::device::UnitId;
use crate::error::{DomainError, Result};

/// What to poll and where the values live on each device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollSettings {
    #[serde(default = "default_devices")]
    pub devices: Vec<UnitId>,
    #[serde(default = "default_ready_coil")]
    pub ready_coil: u16,
    #[serde(default = "default_weight_before_register")]
    pub weight_before_register: u16,
    #[serde(default = "default_weight_after_register")]
    pub weight_after_register: u16,
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

fn default_devices() -> Vec<UnitId> {
    vec![UnitId::new_unchecked(1), UnitId::new_unchecked(2)]
}
fn default_ready_coil() -> u16 {
    10
}
fn default_weight_before_register() -> u16 {
    10
}
fn default_weight_after_register() -> u16 {
    11
}
fn default_interval_ms() -> u64 {
    1000
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            devices: default_devices(),
            ready_coil: default_ready_coil(),
            weight_before_register: default_weight_before_register(),
            weight_after_register: default_weight_after_register(),
            interval_ms: default_interval_ms(),
        }
    }
}

impl PollSettings {
    pub fn validate(&self) -> Result<()> {
        if self.devices.is_empty() {
            return Err(DomainError::InvalidConfiguration(
                "At least one device must be configured".to_string(),
            ));
        }
        if self.interval_ms == 0 {
            return Err(DomainError::InvalidConfiguration(
                "Poll interval must be greater than zero".to_string(),
            ));
        }
        if self.weight_before_register == self.weight_after_register {
            return Err(DomainError::InvalidConfiguration(format!(
                "Before and after weights share register {}",
                self.weight_before_register
            )));
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}
