//! upwatch - Service health monitoring and alerting daemon.
//!
//! Main entry point for the upwatch CLI.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use clap::{Parser, Subcommand};
use tokio::sync::{broadcast, Mutex};
use tracing::{error, info, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use upwatch_config::{Config, ConfigLoader, ConfigValidator};
use upwatch_daemon::Scheduler;
use upwatch_monitor::{
    HealthCheck, HealthClient, LogSink, MessageFormat, MetricsProvider, NotificationSink,
    ReportFormatter, SysinfoMetrics, TelegramSink,
};
use upwatch_stats::{AvailabilityTracker, FileStatsStore};

/// upwatch CLI.
#[derive(Parser)]
#[command(name = "upwatch")]
#[command(about = "Service health monitoring and alerting daemon")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the monitoring daemon in foreground (default)
    Run,

    /// Probe the service and host once and print the status report
    Check {
        /// Also deliver the report to the configured notification channel
        #[arg(long)]
        notify: bool,
    },

    /// Print availability statistics
    Stats {
        /// Reporting period (daily, weekly, overall)
        #[arg(long, default_value = "overall")]
        period: String,
    },
}

fn upwatch_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".upwatch")
}

fn init_tracing() -> Result<(), Box<dyn std::error::Error>> {
    // Create log directory
    let log_dir = upwatch_dir().join("debug");
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("upwatch")
        .filename_suffix("log")
        .max_log_files(30) // Keep 30 days of logs
        .build(&log_dir)?;

    // Create a non-blocking writer for file output
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    // The guard must live for the program duration to keep the writer flushing
    static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
        std::sync::OnceLock::new();
    let _ = GUARD.set(_guard);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        // Console layer (human-readable text format with colors)
        .with(fmt::layer().with_target(true).with_ansi(true))
        // File layer (text format without colors)
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    Ok(())
}

fn load_config(path: &PathBuf) -> Result<Config, Box<dyn std::error::Error>> {
    let config = ConfigLoader::load_or_default(path)?;

    let validation = ConfigValidator::validate(&config)?;
    for warning in &validation.warnings {
        warn!("Config warning [{}]: {}", warning.path, warning.message);
    }
    if !validation.is_valid() {
        for err in &validation.errors {
            error!("Config error [{}]: {}", err.path, err.message);
        }
        return Err("Invalid configuration".into());
    }

    Ok(config)
}

fn build_sink(config: &Config) -> Arc<dyn NotificationSink> {
    match TelegramSink::from_config(&config.telegram) {
        Ok(sink) => {
            info!("Using Telegram notification channel");
            Arc::new(sink)
        }
        Err(_) => {
            warn!("Telegram not configured, notifications go to the log only");
            Arc::new(LogSink)
        }
    }
}

async fn load_tracker(config: &Config) -> Result<AvailabilityTracker, Box<dyn std::error::Error>> {
    let store = Arc::new(FileStatsStore::new(config.stats.file.clone()));
    Ok(AvailabilityTracker::load(store).await?)
}

async fn run_daemon(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    info!("Starting upwatch daemon");
    info!("Health endpoint: {}", config.health.url);
    info!("Stats file: {}", config.stats.file.display());

    let metrics = Arc::new(SysinfoMetrics::new());
    let health = Arc::new(HealthClient::new(
        config.health.url.clone(),
        config.health.timeout(),
    ));
    let sink = build_sink(&config);
    let tracker = Arc::new(Mutex::new(load_tracker(&config).await?));

    let mut scheduler = Scheduler::new(&config, metrics, health, sink, tracker, Utc::now());

    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for shutdown signal: {}", e);
            return;
        }
        info!("Received Ctrl-C");
        let _ = shutdown_tx.send(());
    });

    scheduler.run(shutdown_rx).await;
    info!("upwatch daemon stopped");
    Ok(())
}

async fn run_check(config: Config, notify: bool) -> Result<(), Box<dyn std::error::Error>> {
    let metrics = SysinfoMetrics::new();
    let health_client = HealthClient::new(config.health.url.clone(), config.health.timeout());
    let formatter = ReportFormatter::new(config.telegram.admins.clone());

    let snapshot = metrics.snapshot().await?;
    let health = health_client.check().await;
    let report = formatter.status_report(&health, &snapshot);

    println!("{}", report);

    if notify {
        let sink = build_sink(&config);
        sink.send(&report, MessageFormat::Html).await?;
        info!("Status report delivered via {}", sink.name());
    }

    Ok(())
}

async fn run_stats(config: Config, period: &str) -> Result<(), Box<dyn std::error::Error>> {
    let tracker = load_tracker(&config).await?;
    let formatter = ReportFormatter::new(config.telegram.admins.clone());
    let today = Utc::now().date_naive();

    let text = match period {
        "daily" => formatter.daily_stats(&tracker.daily_summary(today)),
        "weekly" => formatter.weekly_stats(&tracker.weekly_summary(today)),
        "overall" => formatter.overall_stats(&tracker.overall_summary()),
        other => {
            return Err(format!(
                "Unknown period '{}', expected daily, weekly or overall",
                other
            )
            .into());
        }
    };

    println!("{}", text);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing()?;

    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    match cli.command {
        None | Some(Commands::Run) => run_daemon(config).await,
        Some(Commands::Check { notify }) => run_check(config, notify).await,
        Some(Commands::Stats { period }) => run_stats(config, &period).await,
    }
}
