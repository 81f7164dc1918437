//! Summary report types.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Observed service status for a reporting period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServiceStatus {
    Online,
    Offline,
    /// No observations recorded for the period.
    NoData,
}

impl std::fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceStatus::Online => write!(f, "Online"),
            ServiceStatus::Offline => write!(f, "Offline"),
            ServiceStatus::NoData => write!(f, "No data"),
        }
    }
}

/// Availability summary for a single day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    /// Percentage of observed time online, rounded to two decimals.
    /// 100.0 when nothing was observed.
    pub availability: f64,
    pub uptime_seconds: f64,
    pub downtime_seconds: f64,
    pub downtime_events: u32,
    pub status: ServiceStatus,
}

/// Availability summary over the trailing seven days.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklySummary {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub availability: f64,
    pub uptime_seconds: f64,
    pub downtime_seconds: f64,
    pub downtime_events: u32,
    /// How many of the seven days have any recorded observations.
    pub days_with_data: u32,
    /// Per-day breakdown, only for days with observations, oldest first.
    pub daily: Vec<DailySummary>,
}

/// Availability summary since tracking began.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverallSummary {
    pub since: DateTime<Utc>,
    pub availability: f64,
    pub uptime_seconds: f64,
    pub downtime_seconds: f64,
    pub downtime_events: u32,
    pub status: ServiceStatus,
}

/// Availability percentage over an observed interval, rounded to two
/// decimals. An empty interval counts as fully available.
pub(crate) fn availability_percent(uptime: f64, downtime: f64) -> f64 {
    let total = uptime + downtime;
    if total <= 0.0 {
        100.0
    } else {
        round2(uptime / total * 100.0)
    }
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Render a duration in seconds as a short human-readable string.
///
/// Durations under a minute render as `"N seconds"`. Longer durations use
/// `d`/`h`/`m`/`s` parts, with seconds omitted once days are involved.
pub fn format_duration(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    if total < 60 {
        return format!("{} seconds", total);
    }

    let days = total / 86400;
    let hours = (total % 86400) / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    let mut parts = Vec::new();
    if days > 0 {
        parts.push(format!("{}d", days));
    }
    if hours > 0 {
        parts.push(format!("{}h", hours));
    }
    if minutes > 0 {
        parts.push(format!("{}m", minutes));
    }
    if days == 0 && secs > 0 {
        parts.push(format!("{}s", secs));
    }

    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration_under_a_minute() {
        assert_eq!(format_duration(0.0), "0 seconds");
        assert_eq!(format_duration(45.9), "45 seconds");
        assert_eq!(format_duration(59.0), "59 seconds");
    }

    #[test]
    fn test_format_duration_minutes_and_seconds() {
        assert_eq!(format_duration(60.0), "1m");
        assert_eq!(format_duration(125.0), "2m 5s");
        assert_eq!(format_duration(3600.0), "1h");
        assert_eq!(format_duration(3725.0), "1h 2m 5s");
    }

    #[test]
    fn test_format_duration_days_suppress_seconds() {
        assert_eq!(format_duration(90061.0), "1d 1h 1m");
        assert_eq!(format_duration(86400.0), "1d");
        assert_eq!(format_duration(266645.0), "3d 2h 4m");
    }

    #[test]
    fn test_format_duration_negative_clamped() {
        assert_eq!(format_duration(-5.0), "0 seconds");
    }

    #[test]
    fn test_availability_percent() {
        assert_eq!(availability_percent(0.0, 0.0), 100.0);
        assert_eq!(availability_percent(100.0, 0.0), 100.0);
        assert_eq!(availability_percent(0.0, 100.0), 0.0);
        assert_eq!(availability_percent(2.0, 1.0), 66.67);
    }

    #[test]
    fn test_service_status_display() {
        assert_eq!(ServiceStatus::Online.to_string(), "Online");
        assert_eq!(ServiceStatus::Offline.to_string(), "Offline");
        assert_eq!(ServiceStatus::NoData.to_string(), "No data");
    }
}
