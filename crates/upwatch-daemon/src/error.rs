//! Daemon errors.

use thiserror::Error;

use upwatch_monitor::MonitorError;
use upwatch_stats::StatsError;

/// Daemon error types. None of these are fatal to the process: the loop
/// catches them at the iteration boundary and keeps running.
#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("Statistics error: {0}")]
    Stats(#[from] StatsError),

    #[error("Monitor error: {0}")]
    Monitor(#[from] MonitorError),

    #[error("{0}")]
    Custom(String),
}
