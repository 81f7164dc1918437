//! The periodic sampling loop.

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;

use chrono::{DateTime, Duration, NaiveTime, Timelike, Utc};
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, error, info, warn};

use upwatch_config::Config;
use upwatch_monitor::{
    AlertEvent, AlertPolicy, HealthCheck, MessageFormat, MetricsProvider, NotificationSink,
    ReportFormatter, ServiceHealth, SystemSnapshot,
};
use upwatch_stats::AvailabilityTracker;

use crate::error::DaemonError;

/// Minimum gap between two daily-summary dispatches. Guards against the
/// summary firing on every poll inside the target minute.
const SUMMARY_MIN_GAP: i64 = 3600;

/// Drives one sampling iteration after another: observe, account, evaluate,
/// dispatch, sleep. Strictly sequential; an iteration finishes all its I/O
/// before the next sleep begins.
pub struct Scheduler {
    metrics: Arc<dyn MetricsProvider>,
    health: Arc<dyn HealthCheck>,
    sink: Arc<dyn NotificationSink>,
    tracker: Arc<Mutex<AvailabilityTracker>>,
    policy: AlertPolicy,
    formatter: ReportFormatter,

    poll_interval: std::time::Duration,
    status_update_interval: Duration,
    summary_hour: u32,
    summary_minute: u32,
    cpu_samples: u32,
    cpu_sample_window: std::time::Duration,

    last_status_update: DateTime<Utc>,
    last_stats_summary: DateTime<Utc>,
}

impl Scheduler {
    /// Create a scheduler. `start` anchors the report gates: the first
    /// regular status update is due after a full interval, and the summary
    /// gate opens as if the last summary went out at local midnight.
    pub fn new(
        config: &Config,
        metrics: Arc<dyn MetricsProvider>,
        health: Arc<dyn HealthCheck>,
        sink: Arc<dyn NotificationSink>,
        tracker: Arc<Mutex<AvailabilityTracker>>,
        start: DateTime<Utc>,
    ) -> Self {
        Self {
            metrics,
            health,
            sink,
            tracker,
            policy: AlertPolicy::from_config(&config.monitor),
            formatter: ReportFormatter::new(config.telegram.admins.clone()),
            poll_interval: config.monitor.poll_interval(),
            status_update_interval: Duration::seconds(
                config.monitor.status_update_interval_secs as i64,
            ),
            summary_hour: config.summary.hour,
            summary_minute: config.summary.minute,
            cpu_samples: config.monitor.cpu_samples,
            cpu_sample_window: config.monitor.cpu_sample_window(),
            last_status_update: start - Duration::minutes(10),
            last_stats_summary: start.date_naive().and_time(NaiveTime::MIN).and_utc(),
        }
    }

    /// Run until shutdown. Iteration errors are reported best-effort and
    /// never stop the loop; a shutdown signal lets the in-flight iteration
    /// finish before returning.
    pub async fn run(&mut self, mut shutdown: broadcast::Receiver<()>) {
        info!(
            sink = self.sink.name(),
            interval_secs = self.poll_interval.as_secs(),
            "Monitoring loop started"
        );

        loop {
            self.iteration(Utc::now()).await;

            tokio::select! {
                _ = tokio::time::sleep(self.poll_interval) => {}
                _ = shutdown.recv() => {
                    info!("Shutdown requested, monitoring loop stopping");
                    break;
                }
            }
        }
    }

    /// One iteration plus the catch-all error boundary.
    async fn iteration(&mut self, now: DateTime<Utc>) {
        if let Err(e) = self.run_once(now).await {
            error!("Monitoring iteration failed: {}", e);
            let text = self.formatter.monitoring_error(&e.to_string());
            if let Err(send_err) = self.sink.send(&text, MessageFormat::Plain).await {
                error!("Failed to report monitoring error: {}", send_err);
            }
        }
    }

    /// One sampling iteration at the given instant.
    pub async fn run_once(&mut self, now: DateTime<Utc>) -> Result<(), DaemonError> {
        let snapshot = self.metrics.snapshot().await?;
        let health = self.health.check().await;

        {
            let mut tracker = self.tracker.lock().await;
            tracker.update_service_status(health.is_online(), now).await?;
        }

        let cpu_average = self
            .metrics
            .cpu_average(self.cpu_samples, self.cpu_sample_window)
            .await?;

        let events = self.policy.evaluate(cpu_average, &snapshot, &health, now);
        for event in events {
            self.dispatch(&event, &health, &snapshot, now).await;
        }

        self.maybe_send_status_update(&health, &snapshot, now).await;
        self.maybe_send_daily_summary(now).await;

        Ok(())
    }

    /// Deliver one alert or recovery message. Failures are logged and
    /// isolated; a dead sink must not take the loop down.
    async fn dispatch(
        &self,
        event: &AlertEvent,
        health: &ServiceHealth,
        snapshot: &SystemSnapshot,
        now: DateTime<Utc>,
    ) {
        let text = match event {
            AlertEvent::Recovery => self.formatter.recovery(health, now),
            AlertEvent::Alert { issues } => {
                let status = self.formatter.status_report(health, snapshot);
                self.formatter.alert(issues, &status)
            }
        };

        match self.sink.send(&text, MessageFormat::Html).await {
            Ok(()) => debug!("Dispatched {:?} event", event_kind(event)),
            Err(e) => warn!("Failed to dispatch {:?} event: {}", event_kind(event), e),
        }
    }

    async fn maybe_send_status_update(
        &mut self,
        health: &ServiceHealth,
        snapshot: &SystemSnapshot,
        now: DateTime<Utc>,
    ) {
        if now - self.last_status_update < self.status_update_interval {
            return;
        }

        let status = self.formatter.status_report(health, snapshot);
        let text = self.formatter.regular_status_update(&status);
        match self.sink.send(&text, MessageFormat::Html).await {
            Ok(()) => {
                self.last_status_update = now;
                debug!("Sent regular status update");
            }
            Err(e) => warn!("Failed to send regular status update: {}", e),
        }
    }

    async fn maybe_send_daily_summary(&mut self, now: DateTime<Utc>) {
        let in_window = now.hour() == self.summary_hour && now.minute() == self.summary_minute;
        if !in_window || (now - self.last_stats_summary).num_seconds() <= SUMMARY_MIN_GAP {
            return;
        }

        let summary = {
            let tracker = self.tracker.lock().await;
            tracker.daily_summary(now.date_naive())
        };
        let text = self.formatter.daily_summary_announcement(&summary);
        match self.sink.send(&text, MessageFormat::Html).await {
            Ok(()) => {
                self.last_stats_summary = now;
                debug!("Sent daily statistics summary");
            }
            Err(e) => warn!("Failed to send daily statistics summary: {}", e),
        }
    }
}

fn event_kind(event: &AlertEvent) -> &'static str {
    match event {
        AlertEvent::Recovery => "recovery",
        AlertEvent::Alert { .. } => "alert",
    }
}
