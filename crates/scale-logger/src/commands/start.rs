use std::sync::Arc;

use anyhow::Result;
use application::AcquisitionLoop;
use domain::SystemClock;
use infrastructure::AppConfig;
use infrastructure::drivers::{ModbusRtuBus, SerialSettings};
use infrastructure::storage::{DbfRecordStore, create_table_if_missing};
use tracing::info;

use crate::cli::StartArgs;

/// CLI flags win over the config file
pub fn serial_settings(config: &AppConfig, args: &StartArgs) -> SerialSettings {
    let mut serial = config.serial.clone();
    serial.port = args.com.clone();
    if let Some(baud_rate) = args.br {
        serial.baud_rate = baud_rate;
    }
    if let Some(parity) = &args.parity {
        serial.parity = parity.clone();
    }
    serial
}

/// Poll until the loop stops. Returns `Err` when a record could not be written.
pub async fn run(config: AppConfig, args: StartArgs) -> Result<()> {
    let serial = serial_settings(&config, &args);
    info!(
        port = %serial.port,
        baud_rate = serial.baud_rate,
        parity = %serial.parity,
        "Opening Modbus RTU bus"
    );
    let bus = ModbusRtuBus::open(&serial)?;

    let table_path = config.storage.table_path.clone();
    create_table_if_missing(&table_path)?;
    info!(path = %table_path.display(), "💾 Results table ready");

    let store = Arc::new(DbfRecordStore::new(table_path));
    let acquisition = AcquisitionLoop::new(
        Box::new(bus),
        store,
        Arc::new(SystemClock),
        config.poll.clone(),
    );

    info!("Start monitoring!");
    acquisition.run().await?;

    info!("🛑 Poll loop stopped");
    Ok(())
}
