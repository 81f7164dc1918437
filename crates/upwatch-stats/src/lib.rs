//! # upwatch Stats
//!
//! Availability statistics for the upwatch monitoring daemon: a persistent
//! uptime/downtime ledger, per-day aggregates, and summary reports.

mod document;
mod error;
mod store;
mod summary;
mod tracker;

pub use document::{DayStats, DowntimeEvent, StatsDocument};
pub use error::StatsError;
pub use store::{FileStatsStore, MemoryStatsStore, StatsStore};
pub use summary::{
    format_duration, DailySummary, OverallSummary, ServiceStatus, WeeklySummary,
};
pub use tracker::AvailabilityTracker;
