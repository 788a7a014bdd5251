use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use infrastructure::drivers::{SUPPORTED_BAUD_RATES, SerialSettings};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Save diagnostics to the error log file instead of the console
    #[arg(long, global = true)]
    pub log: bool,

    /// Path to a TOML config file (default: ./scale-logger.toml if present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the DBF file if it does not exist
    Create,
    /// Start polling the scales
    Start(StartArgs),
    /// Read stats from a DBF file
    Stats(StatsArgs),
}

#[derive(Args, Debug)]
pub struct StartArgs {
    /// Serial port, for example COM7 or /dev/ttyUSB0
    #[arg(long, value_parser = parse_port)]
    pub com: String,

    /// Baud rate: 9600|14400|19200|38400 [default: 9600]
    #[arg(long, value_parser = parse_baud_rate)]
    pub br: Option<u32>,

    /// Parity mode: N, E or O [default: N]
    #[arg(long, value_parser = ["N", "E", "O"])]
    pub parity: Option<String>,
}

#[derive(Args, Debug)]
pub struct StatsArgs {
    /// Table to inspect (default: the configured table file)
    #[arg(long)]
    pub file: Option<PathBuf>,
}

fn parse_port(value: &str) -> Result<String, String> {
    let settings = SerialSettings {
        port: value.to_string(),
        ..Default::default()
    };
    settings
        .validate_port()
        .map(|_| settings.port)
        .map_err(|e| e.to_string())
}

fn parse_baud_rate(value: &str) -> Result<u32, String> {
    let baud_rate: u32 = value
        .parse()
        .map_err(|_| format!("{value:?} is not a number"))?;
    if SUPPORTED_BAUD_RATES.contains(&baud_rate) {
        Ok(baud_rate)
    } else {
        Err(format!(
            "baud rate should be one of {}",
            SUPPORTED_BAUD_RATES
                .iter()
                .map(|b| b.to_string())
                .collect::<Vec<_>>()
                .join("|")
        ))
    }
}
