use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use doublecloud_provider::provider::Provider;
use doublecloud_provider::server::Server;
use doublecloud_provider::VERSION;
use std::path::PathBuf;
use tokio::io::BufReader;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// DoubleCloud infrastructure provider plugin.
///
/// Speaks newline-delimited JSON on stdin/stdout; logs go to a file.
#[derive(Parser, Debug)]
#[command(name = "terraform-provider-doublecloud", version = VERSION, about, long_about = None)]
struct Args {
    /// Log level for debugging
    #[arg(long, value_enum, env = "DC_PROVIDER_LOG_LEVEL", default_value = "off")]
    log_level: LogLevel,

    /// Log file, defaults to the user config directory
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(
    level: LogLevel,
    log_file: Option<PathBuf>,
) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let Some(tracing_level) = level.to_tracing_level() else {
        return Ok(None);
    };

    let log_path = log_file.unwrap_or_else(get_log_path);

    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {:?}", parent))?;
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {:?}", log_path))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    // stdout carries the protocol, so logs only ever go to the file
    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("terraform-provider-doublecloud {} started with log level: {:?}", VERSION, level);
    tracing::info!("Log file: {:?}", log_path);

    Ok(Some(guard))
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("doublecloud").join("provider.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".doublecloud").join("provider.log");
    }
    PathBuf::from("doublecloud-provider.log")
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level, args.log_file)?;

    let server = Server::new(Provider::new());
    let root = server.root_context();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupted, cancelling in-flight operations");
            root.cancel();
        }
    });

    server
        .serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
        .await
        .context("Provider host loop failed")?;

    tracing::info!("Provider exited");
    Ok(())
}
