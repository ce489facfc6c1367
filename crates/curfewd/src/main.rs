//! curfewd - The curfew service
//!
//! This is the main entry point for the curfew service.
//! It wires together all the components:
//! - Configuration loading
//! - Remote time source (or the development mock hour)
//! - Session controller and its driver loop
//! - Host adapter (Linux): browser surface and wake lock
//! - NDJSON front-end protocol on stdin/stdout

mod stdio;

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use curfew_config::{Config, load_config_or_default, validate_endpoint};
use curfew_core::{DestinationCatalog, IntervalTicker, SessionController, SessionDriver};
use curfew_host_api::WakeLock;
use curfew_host_linux::{LoggingBrowser, SystemdInhibitWakeLock};
use curfew_time::{FixedTimeSource, HttpTimeSource, TimeSource};
use curfew_util::{default_config_path, format_duration, mock_hour};
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal::unix::{SignalKind, signal};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// curfewd - Time-gated browsing for a fixed set of destinations
#[derive(Parser, Debug)]
#[command(name = "curfewd")]
#[command(about = "Time-gated browsing for a fixed set of destinations", long_about = None)]
struct Args {
    /// Configuration file path (default: ~/.config/curfew/config.toml)
    #[arg(short, long, default_value_os_t = default_config_path())]
    config: PathBuf,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Time service endpoint override (or set CURFEW_TIME_ENDPOINT env var)
    #[arg(short, long, env = "CURFEW_TIME_ENDPOINT")]
    endpoint: Option<String>,

    /// Do not hold an idle inhibitor while running
    #[arg(long)]
    no_wake_lock: bool,
}

/// Main service state
struct Service {
    config: Config,
    controller: SessionController,
    time_source: Arc<dyn TimeSource>,
    wake_lock: Option<Arc<dyn WakeLock>>,
}

impl Service {
    fn new(args: &Args) -> Result<Self> {
        let mut config = load_config_or_default(&args.config)
            .with_context(|| format!("Failed to load config from {:?}", args.config))?;

        if let Some(endpoint) = &args.endpoint {
            validate_endpoint(endpoint)
                .map_err(|e| anyhow!("Invalid --endpoint {:?}: {}", endpoint, e))?;
            config.time.endpoint = endpoint.clone();
        }

        info!(
            config_path = %args.config.display(),
            endpoint = %config.time.endpoint,
            refresh_interval = %format_duration(config.time.refresh_interval),
            retry = ?config.time.retry,
            "Configuration loaded"
        );

        let time_source: Arc<dyn TimeSource> = match mock_hour() {
            Some(hour) => {
                warn!(hour = %hour, "Mock hour pinned, remote time service not used");
                Arc::new(FixedTimeSource::new(hour))
            }
            None => Arc::new(
                HttpTimeSource::new(&config.time.endpoint, config.time.request_timeout)
                    .context("Failed to create time service client")?,
            ),
        };

        let browser = Arc::new(LoggingBrowser::new());
        let controller = SessionController::new(
            DestinationCatalog::builtin(),
            browser,
            config.time.on_fetch_failure,
        );

        let wake_lock: Option<Arc<dyn WakeLock>> = if args.no_wake_lock {
            info!("Wake lock disabled");
            None
        } else {
            Some(Arc::new(SystemdInhibitWakeLock::new()))
        };

        Ok(Self {
            config,
            controller,
            time_source,
            wake_lock,
        })
    }

    async fn run(self) -> Result<()> {
        let (request_tx, request_rx) = mpsc::unbounded_channel();
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        // stdin is read on a plain thread so a pending read never holds up exit
        let reader_outbound = outbound_tx.clone();
        std::thread::Builder::new()
            .name("curfewd-stdin".into())
            .spawn(move || {
                stdio::read_requests(std::io::stdin().lock(), request_tx, reader_outbound)
            })
            .context("Failed to start stdin reader")?;

        let writer = tokio::spawn(stdio::write_messages(tokio::io::stdout(), outbound_rx));

        let ticker = IntervalTicker::new(self.config.time.refresh_interval);
        let mut driver = SessionDriver::new(
            self.controller,
            self.time_source,
            ticker,
            self.config.time.retry,
        );
        if let Some(wake_lock) = self.wake_lock {
            driver = driver.with_wake_lock(wake_lock);
        }
        let mut driver_task = tokio::spawn(driver.run(request_rx, outbound_tx, shutdown_rx));

        // Set up signal handlers
        let mut sigterm =
            signal(SignalKind::terminate()).context("Failed to create SIGTERM handler")?;
        let mut sigint =
            signal(SignalKind::interrupt()).context("Failed to create SIGINT handler")?;
        let mut sighup =
            signal(SignalKind::hangup()).context("Failed to create SIGHUP handler")?;

        info!("Service running");

        let signals = async {
            tokio::select! {
                _ = sigterm.recv() => "SIGTERM",
                _ = sigint.recv() => "SIGINT",
                _ = sighup.recv() => "SIGHUP",
            }
        };
        wait_for_shutdown(&mut driver_task, signals).await?;

        // Receiver only goes away if the driver already stopped
        let _ = shutdown_tx.send(true);

        let controller = driver_task.await.context("Session driver task failed")?;
        writer
            .await
            .context("Output writer task failed")?
            .context("Failed to write front-end output")?;

        info!(
            final_state = controller.presentation().name(),
            "Shutdown complete"
        );
        Ok(())
    }
}

/// Wait for a shutdown signal. Fails if the driver stops on its own first.
async fn wait_for_shutdown(
    driver_task: &mut JoinHandle<SessionController>,
    signal: impl Future<Output = &'static str>,
) -> Result<()> {
    tokio::select! {
        name = signal => {
            info!(signal = name, "Received signal, shutting down gracefully");
            Ok(())
        }
        result = driver_task => {
            let controller = result.context("Session driver task failed")?;
            bail!(
                "Session driver stopped unexpectedly (state: {})",
                controller.presentation().name()
            )
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging; stdout carries the protocol
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "curfewd starting");

    let service = Service::new(&args)?;
    service.run().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use curfew_config::FetchFailurePolicy;
    use curfew_host_api::MockBrowser;

    fn controller() -> SessionController {
        SessionController::new(
            DestinationCatalog::builtin(),
            Arc::new(MockBrowser::new()),
            FetchFailurePolicy::Clear,
        )
    }

    fn crashed_driver() -> SessionController {
        panic!("driver crashed")
    }

    #[tokio::test]
    async fn signal_stops_running_driver() {
        let mut task = tokio::spawn(std::future::pending::<SessionController>());

        let result = wait_for_shutdown(&mut task, async { "SIGTERM" }).await;
        assert!(result.is_ok());
        assert!(!task.is_finished());
        task.abort();
    }

    #[tokio::test]
    async fn driver_exit_without_signal_is_error() {
        let controller = controller();
        let mut task = tokio::spawn(async move { controller });

        let err = wait_for_shutdown(&mut task, std::future::pending())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("stopped unexpectedly"));
    }

    #[tokio::test]
    async fn driver_panic_is_reported() {
        let mut task = tokio::spawn(async { crashed_driver() });

        let err = wait_for_shutdown(&mut task, std::future::pending())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Session driver task failed"));
    }
}
