pub mod modbus;

pub use modbus::{ModbusRtuBus, SUPPORTED_BAUD_RATES, SerialSettings};
