use clap::Parser;
use eyre::{Context, Result};
use log::info;
use std::fs;
use std::io;
use std::path::PathBuf;

mod cli;
mod config;
mod shutdown;
mod stream;

use cli::Cli;
use config::{Config, LogLevel};
use shutdown::Shutdown;
use stream::Emitter;

fn setup_logging(log_level: &LogLevel) -> Result<()> {
    let from_env = std::env::var("RUST_LOG").is_ok();

    // stdout and stderr belong to the event streams, so logging is file-only
    // and skipped entirely when nothing would be logged
    if !from_env && *log_level == LogLevel::Off {
        return Ok(());
    }

    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("eventgen")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("eventgen.log");

    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    // RUST_LOG env var takes precedence, otherwise use config log_level
    let mut builder = env_logger::Builder::new();

    if from_env {
        builder.parse_default_env();
    } else {
        builder.filter_level(log_level.as_filter());
    }

    builder.target(env_logger::Target::Pipe(target)).init();

    info!("Logging initialized, writing to: {}", log_file.display());
    info!(
        "Log level: {} (from {})",
        log_level.as_filter(),
        if from_env { "RUST_LOG env" } else { "config" }
    );
    Ok(())
}

fn run(cli: Cli, config: Config) -> Result<u64> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create tokio runtime")?;

    let result = runtime.block_on(async {
        let shutdown = Shutdown::install()?;
        let emitter = Emitter::new(cli.label(), io::stdout(), io::stderr());
        stream::run(emitter, config.interval(), shutdown.recv()).await
    });

    // A write abandoned at shutdown still occupies a blocking thread
    runtime.shutdown_background();
    result
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    setup_logging(&config.log_level).context("Failed to setup logging")?;

    info!(
        "Starting eventgen with label {:?}, interval {:?}",
        cli.label(),
        config.interval()
    );

    let emitted = run(cli, config).context("Event stream failed")?;

    info!("Stopped after {} events", emitted);
    Ok(())
}
