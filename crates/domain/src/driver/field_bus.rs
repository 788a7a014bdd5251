use async_trait::async_trait;

use crate::device::UnitId;
use crate::error::DomainError;

/// Register-level access to devices sharing one serial bus.
///
/// Every call addresses a single unit; implementations switch the unit id
/// on the underlying connection before each request.
#[async_trait]
pub trait FieldBus: Send {
    /// Read one coil (single-bit register)
    async fn read_coil(&mut self, unit: UnitId, address: u16) -> Result<bool, DomainError>;

    /// Write one coil
    async fn write_coil(
        &mut self,
        unit: UnitId,
        address: u16,
        value: bool,
    ) -> Result<(), DomainError>;

    /// Read one 16-bit holding register
    async fn read_holding_register(
        &mut self,
        unit: UnitId,
        address: u16,
    ) -> Result<u16, DomainError>;
}
