use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use domain::{DomainError, FieldBus, UnitId};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tokio::time::error::Elapsed;
use tokio_modbus::client::Context;
use tokio_modbus::prelude::*;
use tokio_serial::SerialStream;

pub const SUPPORTED_BAUD_RATES: [u32; 4] = [9600, 14400, 19200, 38400];

// Windows COM1..COM99 or a Unix tty path
static PORT_PATTERN: OnceLock<Regex> = OnceLock::new();

fn port_pattern() -> &'static Regex {
    PORT_PATTERN.get_or_init(|| {
        Regex::new(r"^(COM[0-9]{1,2}|/dev/[A-Za-z0-9._/-]+)$").expect("port pattern is valid")
    })
}

/// Serial line settings for the RTU bus
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerialSettings {
    #[serde(default)]
    pub port: String,
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
    #[serde(default = "default_data_bits")]
    pub data_bits: u8,
    #[serde(default = "default_parity")]
    pub parity: String,
    #[serde(default = "default_stop_bits")]
    pub stop_bits: u8,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_baud_rate() -> u32 {
    9600
}
fn default_data_bits() -> u8 {
    8
}
fn default_parity() -> String {
    "N".to_string()
}
fn default_stop_bits() -> u8 {
    1
}
fn default_timeout_ms() -> u64 {
    300
}

impl Default for SerialSettings {
    fn default() -> Self {
        Self {
            port: String::new(),
            baud_rate: default_baud_rate(),
            data_bits: default_data_bits(),
            parity: default_parity(),
            stop_bits: default_stop_bits(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl SerialSettings {
    pub fn validate(&self) -> Result<(), DomainError> {
        self.validate_port()?;
        self.validate_baud_rate()?;
        self.to_parity()?;
        self.to_data_bits()?;
        self.to_stop_bits()?;
        Ok(())
    }

    pub fn validate_port(&self) -> Result<(), DomainError> {
        if port_pattern().is_match(&self.port) {
            Ok(())
        } else {
            Err(DomainError::InvalidDriverConfig(format!(
                "Invalid port {:?}: expected COM1 to COM99 or a /dev path",
                self.port
            )))
        }
    }

    pub fn validate_baud_rate(&self) -> Result<(), DomainError> {
        if SUPPORTED_BAUD_RATES.contains(&self.baud_rate) {
            Ok(())
        } else {
            Err(DomainError::InvalidDriverConfig(format!(
                "Invalid baud rate {}: expected one of {:?}",
                self.baud_rate, SUPPORTED_BAUD_RATES
            )))
        }
    }

    pub fn to_data_bits(&self) -> Result<tokio_serial::DataBits, DomainError> {
        match self.data_bits {
            7 => Ok(tokio_serial::DataBits::Seven),
            8 => Ok(tokio_serial::DataBits::Eight),
            _ => Err(DomainError::InvalidDriverConfig(format!(
                "Invalid data bits: {}",
                self.data_bits
            ))),
        }
    }

    pub fn to_parity(&self) -> Result<tokio_serial::Parity, DomainError> {
        match self.parity.to_lowercase().as_str() {
            "n" | "none" => Ok(tokio_serial::Parity::None),
            "o" | "odd" => Ok(tokio_serial::Parity::Odd),
            "e" | "even" => Ok(tokio_serial::Parity::Even),
            _ => Err(DomainError::InvalidDriverConfig(format!(
                "Invalid parity: {}",
                self.parity
            ))),
        }
    }

    pub fn to_stop_bits(&self) -> Result<tokio_serial::StopBits, DomainError> {
        match self.stop_bits {
            1 => Ok(tokio_serial::StopBits::One),
            2 => Ok(tokio_serial::StopBits::Two),
            _ => Err(DomainError::InvalidDriverConfig(format!(
                "Invalid stop bits: {}",
                self.stop_bits
            ))),
        }
    }

    /// Device path handed to the OS. COM ports above 9 need the `\\.\` prefix on Windows.
    pub fn device_path(&self) -> String {
        if cfg!(target_os = "windows") && !self.port.starts_with(r"\\.\") {
            format!(r"\\.\{}", self.port)
        } else {
            self.port.clone()
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Modbus RTU client owning one serial port shared by every polled unit
pub struct ModbusRtuBus {
    ctx: Context,
    timeout_ms: u64,
}

impl ModbusRtuBus {
    pub fn open(settings: &SerialSettings) -> Result<Self, DomainError> {
        settings.validate()?;
        let port_name = settings.device_path();

        let builder = tokio_serial::new(&port_name, settings.baud_rate)
            .data_bits(settings.to_data_bits()?)
            .parity(settings.to_parity()?)
            .stop_bits(settings.to_stop_bits()?)
            .timeout(settings.timeout());

        let port = SerialStream::open(&builder).map_err(|e| {
            let err_msg = format!("Failed to open serial port {}: {}", port_name, e);
            tracing::error!("{}", err_msg);
            DomainError::DriverError(err_msg)
        })?;

        tracing::info!(
            port = %port_name,
            baud_rate = settings.baud_rate,
            parity = %settings.parity,
            "Serial port opened"
        );

        // Unit id is switched before every request
        let ctx = tokio_modbus::client::rtu::attach_slave(port, Slave(1));

        Ok(Self {
            ctx,
            timeout_ms: settings.timeout_ms,
        })
    }

    fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Collapse timeout, transport and exception layers into one error
fn settle<T>(
    result: Result<tokio_modbus::Result<T>, Elapsed>,
    timeout_ms: u64,
) -> Result<T, DomainError> {
    match result {
        Ok(Ok(Ok(value))) => Ok(value),
        Ok(Ok(Err(exception))) => Err(DomainError::DriverError(format!(
            "Modbus exception: {}",
            exception
        ))),
        Ok(Err(e)) => Err(DomainError::DriverError(format!(
            "Modbus transport error: {}",
            e
        ))),
        Err(_) => Err(DomainError::Timeout(timeout_ms)),
    }
}

#[async_trait]
impl FieldBus for ModbusRtuBus {
    async fn read_coil(&mut self, unit: UnitId, address: u16) -> Result<bool, DomainError> {
        tracing::debug!(device = %unit, address, "Reading coil");
        self.ctx.set_slave(Slave(unit.value()));

        let timeout = self.timeout();
        let result = tokio::time::timeout(timeout, self.ctx.read_coils(address, 1)).await;
        let coils = settle(result, self.timeout_ms)?;

        coils
            .first()
            .copied()
            .ok_or_else(|| DomainError::DriverError("Empty coil response".into()))
    }

    async fn write_coil(
        &mut self,
        unit: UnitId,
        address: u16,
        value: bool,
    ) -> Result<(), DomainError> {
        tracing::debug!(device = %unit, address, value, "Writing coil");
        self.ctx.set_slave(Slave(unit.value()));

        let timeout = self.timeout();
        let result =
            tokio::time::timeout(timeout, self.ctx.write_single_coil(address, value)).await;
        settle(result, self.timeout_ms)
    }

    async fn read_holding_register(
        &mut self,
        unit: UnitId,
        address: u16,
    ) -> Result<u16, DomainError> {
        tracing::debug!(device = %unit, address, "Reading holding register");
        self.ctx.set_slave(Slave(unit.value()));

        let timeout = self.timeout();
        let result =
            tokio::time::timeout(timeout, self.ctx.read_holding_registers(address, 1)).await;
        let words = settle(result, self.timeout_ms)?;

        words
            .first()
            .copied()
            .ok_or_else(|| DomainError::DriverError("Empty register response".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(port: &str) -> SerialSettings {
        SerialSettings {
            port: port.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults() {
        let s = SerialSettings::default();
        assert_eq!(s.baud_rate, 9600);
        assert_eq!(s.data_bits, 8);
        assert_eq!(s.stop_bits, 1);
        assert_eq!(s.timeout(), Duration::from_millis(300));
        assert_eq!(s.to_parity().unwrap(), tokio_serial::Parity::None);
    }

    #[test]
    fn test_accepts_com_ports() {
        assert!(settings("COM1").validate_port().is_ok());
        assert!(settings("COM7").validate_port().is_ok());
        assert!(settings("COM99").validate_port().is_ok());
    }

    #[test]
    fn test_accepts_unix_tty() {
        assert!(settings("/dev/ttyUSB0").validate_port().is_ok());
        assert!(settings("/dev/serial/by-id/usb-FTDI_0-if00").validate_port().is_ok());
    }

    #[test]
    fn test_rejects_bad_ports() {
        for port in ["", "COM", "COM100", "com7", "LPT1", "COM7 "] {
            assert!(
                settings(port).validate_port().is_err(),
                "{port:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_baud_rate_set() {
        for baud_rate in SUPPORTED_BAUD_RATES {
            let s = SerialSettings {
                baud_rate,
                ..settings("COM3")
            };
            assert!(s.validate().is_ok());
        }
        let s = SerialSettings {
            baud_rate: 115200,
            ..settings("COM3")
        };
        assert!(matches!(
            s.validate(),
            Err(DomainError::InvalidDriverConfig(_))
        ));
    }

    #[test]
    fn test_parity_letters_and_names() {
        let cases = [
            ("N", tokio_serial::Parity::None),
            ("E", tokio_serial::Parity::Even),
            ("O", tokio_serial::Parity::Odd),
            ("even", tokio_serial::Parity::Even),
        ];
        for (parity, expected) in cases {
            let s = SerialSettings {
                parity: parity.to_string(),
                ..Default::default()
            };
            assert_eq!(s.to_parity().unwrap(), expected);
        }
        let s = SerialSettings {
            parity: "M".to_string(),
            ..Default::default()
        };
        assert!(s.to_parity().is_err());
    }

    #[test]
    fn test_settle_maps_timeout() {
        let elapsed = tokio_test::block_on(async {
            tokio::time::timeout(Duration::from_millis(1), std::future::pending::<()>()).await
        })
        .unwrap_err();
        let result: Result<u16, DomainError> = settle(Err(elapsed), 300);
        assert_eq!(result, Err(DomainError::Timeout(300)));
    }

    #[test]
    fn test_settle_maps_exception() {
        let result: Result<u16, DomainError> =
            settle(Ok(Ok(Err(tokio_modbus::Exception::IllegalDataAddress))), 300);
        assert!(matches!(
            result,
            Err(DomainError::DriverError(msg)) if msg.starts_with("Modbus exception")
        ));
    }

    #[test]
    fn test_settle_passes_value() {
        let result: Result<u16, DomainError> = settle(Ok(Ok(Ok(42))), 300);
        assert_eq!(result, Ok(42));
    }
}
