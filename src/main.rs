use anyhow::{Context, Result};
use clap::Parser;
use daysnap::backup::Scheduler;
use daysnap::config::AppConfig;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "daysnap")]
#[command(about = "Scheduled daily folder snapshots with retention", version)]
struct Args {
    /// Path to the YAML configuration file
    #[arg(short, long, default_value = "daysnap.yaml")]
    config: PathBuf,

    /// Run a single due-check cycle and exit instead of looping
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = AppConfig::from_file(&args.config)
        .with_context(|| format!("failed to load configuration from {:?}", args.config))?;

    init_tracing(&config);

    info!("Starting daysnap v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Backing up {} into {}",
        config.backup.source_folder.display(),
        config.backup.destination_folder.display()
    );

    let scheduler = Scheduler::new(config)?;

    if args.once {
        scheduler.run_once().await?;
        return Ok(());
    }

    // The loop never exits on its own; race it against Ctrl-C so process
    // termination is prompt even mid-sleep.
    tokio::select! {
        _ = scheduler.run() => {}
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received, exiting");
        }
    }

    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(config.logging.level.clone()));

    match config.logging.format.as_str() {
        "json" => tracing_subscriber::fmt().with_env_filter(filter).json().init(),
        _ => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}
