use clap::Parser;
use infrastructure::AppConfig;
use scale_logger::cli::{Cli, Command};
use scale_logger::commands;
use tempfile::TempDir;

fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
    Cli::try_parse_from(std::iter::once("scale-logger").chain(args.iter().copied()))
}

#[test]
fn test_start_requires_port() {
    assert!(parse(&["start"]).is_err());
}

#[test]
fn test_start_defaults() {
    let cli = parse(&["start", "--com", "COM7"]).unwrap();
    assert!(!cli.log);
    match cli.command {
        Command::Start(args) => {
            assert_eq!(args.com, "COM7");
            assert_eq!(args.br, None);
            assert_eq!(args.parity, None);

            let serial = commands::start::serial_settings(&AppConfig::default(), &args);
            assert_eq!(serial.port, "COM7");
            assert_eq!(serial.baud_rate, 9600);
            assert_eq!(serial.parity, "N");
            assert_eq!(serial.timeout_ms, 300);
        }
        other => panic!("Expected start, got {:?}", other),
    }
}

#[test]
fn test_start_with_all_flags() {
    let cli = parse(&[
        "--log", "start", "--com", "COM12", "--br", "38400", "--parity", "E",
    ])
    .unwrap();
    assert!(cli.log);
    match cli.command {
        Command::Start(args) => {
            let serial = commands::start::serial_settings(&AppConfig::default(), &args);
            assert_eq!(serial.baud_rate, 38400);
            assert_eq!(serial.parity, "E");
            assert!(serial.validate().is_ok());
        }
        other => panic!("Expected start, got {:?}", other),
    }
}

#[test]
fn test_log_flag_after_subcommand() {
    let cli = parse(&["stats", "--log"]).unwrap();
    assert!(cli.log);
}

#[test]
fn test_rejects_invalid_port() {
    assert!(parse(&["start", "--com", "COM100"]).is_err());
    assert!(parse(&["start", "--com", "LPT1"]).is_err());
}

#[test]
fn test_accepts_unix_port() {
    assert!(parse(&["start", "--com", "/dev/ttyUSB0"]).is_ok());
}

#[test]
fn test_rejects_unsupported_baud_rate() {
    assert!(parse(&["start", "--com", "COM1", "--br", "115200"]).is_err());
    assert!(parse(&["start", "--com", "COM1", "--br", "fast"]).is_err());
}

#[test]
fn test_rejects_unknown_parity() {
    assert!(parse(&["start", "--com", "COM1", "--parity", "M"]).is_err());
}

#[test]
fn test_config_values_used_when_flags_absent() {
    let cli = parse(&["start", "--com", "COM3"]).unwrap();
    let mut config = AppConfig::default();
    config.serial.baud_rate = 19200;
    config.serial.parity = "O".to_string();

    let Command::Start(args) = cli.command else {
        panic!("Expected start");
    };
    let serial = commands::start::serial_settings(&config, &args);

    assert_eq!(serial.baud_rate, 19200);
    assert_eq!(serial.parity, "O");
}

#[test]
fn test_create_then_stats() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("RESULTS.DBF");

    assert!(commands::create::run(&path).unwrap());
    assert!(!commands::create::run(&path).unwrap());

    let stats = commands::stats::run(&path).unwrap();
    assert_eq!(stats.columns_count, 7);
    assert_eq!(stats.records_count, 0);
}

#[test]
fn test_stats_on_missing_file_fails() {
    let dir = TempDir::new().unwrap();
    assert!(commands::stats::run(&dir.path().join("MISSING.DBF")).is_err());
}
