use anyhow::Result;
use clap::Parser;
use dotenv::dotenv;
use tracing::info;

use infrastructure::AppConfig;
use scale_logger::cli::{Cli, Command};
use scale_logger::{commands, logging};

async fn run() -> Result<()> {
    dotenv().ok();

    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;

    logging::init(cli.log.then_some(config.logging.file.as_path()))?;
    info!("⚖️ Scale Logger Starting...");
    info!("🆔 Process ID: {}", std::process::id());

    match cli.command {
        Command::Create => {
            if commands::create::run(&config.storage.table_path)? {
                info!("✅ Created {}", config.storage.table_path.display());
            }
        }
        Command::Start(args) => commands::start::run(config, args).await?,
        Command::Stats(args) => {
            let path = args.file.unwrap_or(config.storage.table_path);
            let stats = commands::stats::run(&path)?;
            println!("{stats}");
        }
    }

    Ok(())
}

fn main() {
    let result = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt.block_on(run()),
        Err(e) => Err(e.into()),
    };

    if let Err(e) = result {
        tracing::error!(error = ?e, "Fatal error");
        eprintln!("\n❌ CRITICAL ERROR: {:?}", e);
        eprintln!("--------------------------------------------------");
        eprintln!("The application stopped because of a fatal error.");
        std::process::exit(1);
    }
}
