//! Persistent statistics document.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Date key format used for `daily_stats` entries.
const DAY_KEY_FORMAT: &str = "%Y-%m-%d";

/// A completed downtime episode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DowntimeEvent {
    /// When the service was first observed offline.
    pub start: DateTime<Utc>,

    /// When the service was next observed online.
    pub end: DateTime<Utc>,

    /// Episode length in seconds.
    pub duration_seconds: f64,
}

/// Per-day availability aggregates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DayStats {
    /// Seconds the service was observed online on this day.
    #[serde(default)]
    pub uptime_seconds: f64,

    /// Seconds the service was observed offline on this day.
    #[serde(default)]
    pub downtime_seconds: f64,

    /// Number of downtime episodes that started on this day.
    #[serde(default)]
    pub downtime_events: u32,

    /// Most recent observed status on this day (`true` = online).
    #[serde(default)]
    pub last_status: Option<bool>,
}

/// The full availability ledger, persisted as a single JSON document.
///
/// Time is credited between consecutive observations: each update attributes
/// the elapsed interval since `last_updated` to uptime or downtime according
/// to the status that held over that interval.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsDocument {
    /// When tracking began.
    pub service_started: DateTime<Utc>,

    /// Timestamp of the most recent observation.
    pub last_updated: DateTime<Utc>,

    /// Total seconds observed online since `service_started`.
    #[serde(default)]
    pub total_uptime_seconds: f64,

    /// Total seconds observed offline since `service_started`.
    #[serde(default)]
    pub total_downtime_seconds: f64,

    /// Completed downtime episodes, oldest first.
    #[serde(default)]
    pub downtime_events: Vec<DowntimeEvent>,

    /// Per-day aggregates keyed by `YYYY-MM-DD`.
    #[serde(default)]
    pub daily_stats: BTreeMap<String, DayStats>,
}

impl StatsDocument {
    /// Create a fresh document starting at `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            service_started: now,
            last_updated: now,
            total_uptime_seconds: 0.0,
            total_downtime_seconds: 0.0,
            downtime_events: Vec::new(),
            daily_stats: BTreeMap::new(),
        }
    }

    /// Format a date as a `daily_stats` key.
    pub fn day_key(date: NaiveDate) -> String {
        date.format(DAY_KEY_FORMAT).to_string()
    }

    /// Get the aggregates for a date, if any observations were recorded.
    pub fn day(&self, date: NaiveDate) -> Option<&DayStats> {
        self.daily_stats.get(&Self::day_key(date))
    }
}

impl Default for StatsDocument {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}
