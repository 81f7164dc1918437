//! Availability tracking.

use chrono::{DateTime, NaiveDate, Utc};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::document::{DowntimeEvent, StatsDocument};
use crate::error::StatsError;
use crate::store::StatsStore;
use crate::summary::{
    availability_percent, DailySummary, OverallSummary, ServiceStatus, WeeklySummary,
};

#[cfg(test)]
#[path = "tracker_tests.rs"]
mod tracker_tests;

/// Maintains the availability ledger and persists it after every update.
///
/// Each observation credits the interval since the previous observation to
/// uptime or downtime. Transition ticks credit no time at all: going offline
/// opens a downtime episode, coming back online closes it, and only the
/// intervals between like-status observations accumulate.
pub struct AvailabilityTracker {
    doc: StatsDocument,
    store: Arc<dyn StatsStore>,
    /// Start of the downtime episode currently in progress, if any.
    /// Deliberately not persisted: a restart starts with a clean slate.
    current_downtime_start: Option<DateTime<Utc>>,
}

impl AvailabilityTracker {
    /// Load the ledger from the store.
    pub async fn load(store: Arc<dyn StatsStore>) -> Result<Self, StatsError> {
        let doc = store.load().await?;
        Ok(Self {
            doc,
            store,
            current_downtime_start: None,
        })
    }

    /// Create a tracker around an existing document.
    pub fn with_document(doc: StatsDocument, store: Arc<dyn StatsStore>) -> Self {
        Self {
            doc,
            store,
            current_downtime_start: None,
        }
    }

    /// The underlying ledger.
    pub fn document(&self) -> &StatsDocument {
        &self.doc
    }

    /// Record an observation and persist the updated ledger.
    pub async fn update_service_status(
        &mut self,
        online: bool,
        at: DateTime<Utc>,
    ) -> Result<(), StatsError> {
        self.apply(online, at);
        self.store.save(&self.doc).await
    }

    fn apply(&mut self, online: bool, at: DateTime<Utc>) {
        let mut elapsed = (at - self.doc.last_updated).num_milliseconds() as f64 / 1000.0;
        if elapsed < 0.0 {
            warn!(
                "Observation at {} precedes last update {}, not crediting elapsed time",
                at, self.doc.last_updated
            );
            elapsed = 0.0;
        }

        let key = StatsDocument::day_key(at.date_naive());

        if online {
            if let Some(start) = self.current_downtime_start.take() {
                let duration = (at - start).num_milliseconds() as f64 / 1000.0;
                debug!("Downtime episode ended after {:.0}s", duration);
                self.doc.downtime_events.push(DowntimeEvent {
                    start,
                    end: at,
                    duration_seconds: duration,
                });
            } else if elapsed > 0.0 {
                self.doc.total_uptime_seconds += elapsed;
                let day = self.doc.daily_stats.entry(key.clone()).or_default();
                day.uptime_seconds += elapsed;
            }
        } else if self.current_downtime_start.is_none() {
            debug!("Downtime episode started at {}", at);
            self.current_downtime_start = Some(at);
            let day = self.doc.daily_stats.entry(key.clone()).or_default();
            day.downtime_events += 1;
        } else if elapsed > 0.0 {
            self.doc.total_downtime_seconds += elapsed;
            let day = self.doc.daily_stats.entry(key.clone()).or_default();
            day.downtime_seconds += elapsed;
        }

        let day = self.doc.daily_stats.entry(key).or_default();
        day.last_status = Some(online);
        self.doc.last_updated = at;
    }

    /// Summarize a single day.
    pub fn daily_summary(&self, date: NaiveDate) -> DailySummary {
        match self.doc.day(date) {
            Some(day) => DailySummary {
                date,
                availability: availability_percent(day.uptime_seconds, day.downtime_seconds),
                uptime_seconds: day.uptime_seconds,
                downtime_seconds: day.downtime_seconds,
                downtime_events: day.downtime_events,
                status: match day.last_status {
                    Some(true) => ServiceStatus::Online,
                    Some(false) => ServiceStatus::Offline,
                    None => ServiceStatus::NoData,
                },
            },
            None => DailySummary {
                date,
                availability: 100.0,
                uptime_seconds: 0.0,
                downtime_seconds: 0.0,
                downtime_events: 0,
                status: ServiceStatus::NoData,
            },
        }
    }

    /// Summarize the trailing seven days ending at `today`, inclusive.
    /// Only days with accrued time contribute to the aggregates; a day whose
    /// entry holds nothing but a transition tick counts as having no data.
    pub fn weekly_summary(&self, today: NaiveDate) -> WeeklySummary {
        let start = today - chrono::Duration::days(6);

        let mut uptime = 0.0;
        let mut downtime = 0.0;
        let mut events = 0u32;
        let mut daily = Vec::new();

        for offset in 0..7 {
            let date = start + chrono::Duration::days(offset);
            if let Some(day) = self.doc.day(date) {
                if day.uptime_seconds <= 0.0 && day.downtime_seconds <= 0.0 {
                    continue;
                }
                uptime += day.uptime_seconds;
                downtime += day.downtime_seconds;
                events += day.downtime_events;
                daily.push(self.daily_summary(date));
            }
        }

        WeeklySummary {
            start,
            end: today,
            availability: availability_percent(uptime, downtime),
            uptime_seconds: uptime,
            downtime_seconds: downtime,
            downtime_events: events,
            days_with_data: daily.len() as u32,
            daily,
        }
    }

    /// Summarize everything since tracking began.
    pub fn overall_summary(&self) -> OverallSummary {
        let status = if self.current_downtime_start.is_some() {
            ServiceStatus::Offline
        } else {
            ServiceStatus::Online
        };

        OverallSummary {
            since: self.doc.service_started,
            availability: availability_percent(
                self.doc.total_uptime_seconds,
                self.doc.total_downtime_seconds,
            ),
            uptime_seconds: self.doc.total_uptime_seconds,
            downtime_seconds: self.doc.total_downtime_seconds,
            downtime_events: self.doc.downtime_events.len() as u32,
            status,
        }
    }
}
