//! # Carbot
//!
//! Joystick control for a differential-drive RC car carrying a 4-DOF robot arm.
//!
//! Reads control frames from stdin and runs them through the drive and arm
//! controllers. Without motor hardware attached, actuation is reported through
//! the log.

use anyhow::{Context, Result};
use tokio::io::BufReader;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use carbot::actuator::TracingSink;
use carbot::config::{Config, LoggingConfig};
use carbot::control::runner::ControlLoop;
use carbot::input::forward_frames;

/// Log file name prefix inside the configured log directory
const LOG_FILE_PREFIX: &str = "carbot.log";

/// Main entry point for Carbot
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Load configuration (first argument, or built-in defaults)
///    - Set up logging with tracing subscriber
///    - Start reading control frames from stdin
///
/// 2. **Main Loop**
///    - Apply each frame to the enabled controllers
///    - Wait out the arm update interval after each arm step
///
/// 3. **Graceful Shutdown**
///    - On end of input or Ctrl+C, park the wheels and center the arm
///    - Stop all PWM channels
///
/// # Examples
///
/// ```bash
/// echo "12 512 512 412" | cargo run --release -- config/default.toml
/// ```
#[tokio::main]
async fn main() -> Result<()> {
    let config = load_config(std::env::args().nth(1))?;
    let _log_guard = init_logging(&config.logging);

    info!("Carbot v{} starting...", env!("CARGO_PKG_VERSION"));

    let (tx, mut rx) = mpsc::channel(config.control.frame_queue);
    let reader = tokio::spawn(forward_frames(BufReader::new(tokio::io::stdin()), tx));

    let mut control = ControlLoop::new(TracingSink::new(), &config)?;
    info!("Reading control frames from stdin, press Ctrl+C to exit");

    let frames = control
        .run(&mut rx, async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Received Ctrl+C, shutting down...");
        })
        .await?;

    info!("Total frames processed: {}", frames);
    finish_input(reader).await
}

/// Stops the stdin reader and reports how it ended.
///
/// A reader that already finished (end of input or a read error) keeps its
/// result; one still blocked on stdin after Ctrl+C is cancelled.
async fn finish_input(reader: JoinHandle<carbot::error::Result<u64>>) -> Result<()> {
    reader.abort();
    match reader.await {
        Ok(result) => {
            let forwarded = result.context("Failed to read control frames from stdin")?;
            info!("Input closed after {} frames", forwarded);
            Ok(())
        }
        Err(e) if e.is_cancelled() => Ok(()),
        Err(e) => Err(e).context("Frame input task failed"),
    }
}

/// Loads the configuration file at `path`, or the defaults when none is given.
fn load_config(path: Option<String>) -> Result<Config> {
    match path {
        Some(path) => {
            Config::load(&path).with_context(|| format!("Failed to load configuration from {}", path))
        }
        None => Ok(Config::default()),
    }
}

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` overrides the configured level. When a log directory is set,
/// output goes to a daily rolling file and the returned guard must be kept
/// alive to flush it.
fn init_logging(config: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match &config.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
            None
        }
    }
}
