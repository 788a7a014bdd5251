use crate::error::{DomainError, Result};
use serde::{Deserialize, Serialize};

/// Modbus unit identifier of a device on the shared serial bus
///
/// Rules:
/// - 0 is the broadcast address and cannot be polled
/// - 248..=255 are reserved by the RTU framing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct UnitId(u8);

impl UnitId {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 247;

    /// Create a new UnitId with validation
    pub fn new(id: u8) -> Result<Self> {
        if !(Self::MIN..=Self::MAX).contains(&id) {
            return Err(DomainError::InvalidUnitId(format!(
                "Unit id {id} out of range ({}..={})",
                Self::MIN,
                Self::MAX
            )));
        }
        Ok(Self(id))
    }

    /// Caller guarantees `id` is in range
    pub(crate) const fn new_unchecked(id: u8) -> Self {
        Self(id)
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for UnitId {
    type Error = DomainError;

    fn try_from(value: u8) -> Result<Self> {
        Self::new(value)
    }
}

impl From<UnitId> for u8 {
    fn from(id: UnitId) -> Self {
        id.0
    }
}

impl std::fmt::Display for UnitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_unit_ids() {
        assert_eq!(UnitId::new(1).unwrap().value(), 1);
        assert_eq!(UnitId::new(247).unwrap().value(), 247);
    }

    #[test]
    fn test_broadcast_address_rejected() {
        let result = UnitId::new(0);
        assert!(matches!(result, Err(DomainError::InvalidUnitId(_))));
    }

    #[test]
    fn test_reserved_addresses_rejected() {
        assert!(UnitId::new(248).is_err());
        assert!(UnitId::new(255).is_err());
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: UnitId = serde_json::from_str("2").unwrap();
        assert_eq!(ok.value(), 2);

        let bad: std::result::Result<UnitId, _> = serde_json::from_str("0");
        assert!(bad.is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(UnitId::new(17).unwrap().to_string(), "17");
    }
}
