//! # Asset Monitor
//!
//! Real-time monitoring of a tracked vehicle's location, cabin climate and
//! accident sensor.
//!
//! This application connects to the device gateway, feeds telemetry into
//! the core and offers an operator console on stdin.

use anyhow::{Context, Result};
use chrono::Utc;
use std::io::BufRead;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use asset_monitor::alerts::threshold::{FileStore, ThresholdStore};
use asset_monitor::config::{Config, LoggingConfig};
use asset_monitor::console::{self, ConsoleCommand};
use asset_monitor::dashboard::{self, CoreCommand, DashboardSnapshot, TelemetryCore};
use asset_monitor::telemetry::GpsReading;
use asset_monitor::transport::TcpTransport;

/// File name prefix of the rolling log
const LOG_FILE_PREFIX: &str = "asset-monitor.log";

/// Main entry point for Asset Monitor
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Load configuration (first argument, else defaults)
///    - Set up logging with tracing subscriber
///    - Load persisted thresholds
///
/// 2. **Main Loop**
///    - Core task drains the command channel
///    - Transport task connects to the gateway and reconnects on link loss
///    - Console task reads operator commands from stdin
///
/// 3. **Graceful Shutdown**
///    - On Ctrl+C or `quit`, stop the core and the transport
///
/// # Examples
///
/// ```bash
/// cargo run --release -- config/default.toml
/// ```
#[tokio::main]
async fn main() -> Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => Config::load(&path)
            .with_context(|| format!("Failed to load configuration from {}", path))?,
        None => Config::default(),
    };

    let _log_guard = init_logging(&config.logging)?;

    info!("Asset Monitor v{} starting...", env!("CARGO_PKG_VERSION"));

    let thresholds = ThresholdStore::open(Box::new(FileStore::new(&config.storage.data_dir)));
    let current = thresholds.current();
    info!(
        "Alert thresholds: temperature > {}°C, humidity > {}%",
        current.temperature, current.humidity
    );

    let core = TelemetryCore::new(thresholds);
    let snapshots = core.subscribe();

    let (commands, receiver) = mpsc::channel(config.transport.queue_capacity);
    let core_task = tokio::spawn(dashboard::run(core, receiver));
    let transport = TcpTransport::from_config(&config.transport);
    let transport_task = tokio::spawn(transport.run(commands.clone()));
    let mut console_task =
        tokio::spawn(console_loop(commands.clone(), snapshots, config.asset.home()));

    info!("Type 'help' for console commands, Ctrl+C to exit");

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down...");
        }
        result = &mut console_task => {
            match result {
                Ok(true) => info!("Quit requested, shutting down..."),
                // Stdin closed: keep monitoring until interrupted
                _ => {
                    tokio::signal::ctrl_c().await?;
                    info!("Received Ctrl+C, shutting down...");
                }
            }
        }
    }

    console_task.abort();
    if commands.send(CoreCommand::Shutdown).await.is_err() {
        warn!("Telemetry core already stopped");
    }
    drop(commands);

    let core = core_task.await.context("Telemetry core task failed")?;
    transport_task.abort();

    info!("Total history records at shutdown: {}", core.history().len());
    Ok(())
}

/// Install the tracing subscriber
///
/// The returned guard flushes the file writer on drop and must be kept
/// alive for the life of the program.
fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let level: tracing::Level = config
        .level
        .parse()
        .with_context(|| format!("Invalid log level '{}'", config.level))?;
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if config.file_enabled {
        let appender = tracing_appender::rolling::daily(&config.log_dir, LOG_FILE_PREFIX);
        let (writer, guard) = tracing_appender::non_blocking(appender);

        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .with(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(writer))
            .init();

        Ok(Some(guard))
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
        Ok(None)
    }
}

/// Forward stdin lines from a dedicated thread
fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(16);
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if tx.blocking_send(line).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        }
    });
    rx
}

/// Read operator commands from stdin
///
/// Returns `true` when the operator asked to quit and `false` when stdin closed.
async fn console_loop(
    commands: mpsc::Sender<CoreCommand>,
    snapshots: watch::Receiver<DashboardSnapshot>,
    home: GpsReading,
) -> bool {
    let mut lines = spawn_stdin_reader();

    while let Some(line) = lines.recv().await {
        let command = match console::parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                println!("{} (type 'help' for commands)", e);
                continue;
            }
        };

        match command {
            ConsoleCommand::SetThreshold(update) => {
                let (reply, outcome) = oneshot::channel();
                let request = CoreCommand::UpdateThresholds { update, reply: Some(reply) };
                if commands.send(request).await.is_err() {
                    return true;
                }
                match outcome.await {
                    Ok(Ok(config)) => println!(
                        "Thresholds saved: temperature {:.1}°C, humidity {:.1}%",
                        config.temperature, config.humidity
                    ),
                    Ok(Err(e)) => println!("Threshold not saved: {}", e),
                    Err(_) => return true,
                }
            }
            ConsoleCommand::Show => {
                let snapshot = snapshots.borrow().clone();
                println!("{}", console::render_summary(&snapshot, home, Utc::now()));
            }
            ConsoleCommand::History(rows) => {
                let snapshot = snapshots.borrow().clone();
                println!("{}", console::render_history(&snapshot, rows));
            }
            ConsoleCommand::Help => println!("{}", console::HELP),
            ConsoleCommand::Quit => return true,
        }
    }

    false
}
