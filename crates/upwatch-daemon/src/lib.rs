//! # upwatch Daemon
//!
//! The sampling loop: polls health and host metrics on a fixed interval,
//! feeds the availability tracker, evaluates alert conditions, and emits
//! scheduled reports.

mod error;
mod scheduler;

pub use error::DaemonError;
pub use scheduler::Scheduler;
