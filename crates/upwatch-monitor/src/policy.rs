//! Alert evaluation and repeat suppression.

#[cfg(test)]
#[path = "policy_tests.rs"]
mod tests;

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use tracing::debug;

use upwatch_config::MonitorConfig;

use crate::health::ServiceHealth;
use crate::metrics::SystemSnapshot;

/// Resource thresholds, each an independent percentage check.
#[derive(Debug, Clone, Copy)]
pub struct AlertThresholds {
    pub cpu: f64,
    pub memory: f64,
    pub disk: f64,
}

/// An actionable event produced by one evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlertEvent {
    /// The service transitioned from offline back to online.
    Recovery,
    /// One or more critical conditions hold, sorted alphabetically.
    Alert { issues: Vec<String> },
}

/// Decides which conditions are newly actionable.
///
/// An identical issue set fires at most once per repeat interval; any change
/// to the set is treated as new and fires immediately. Recovery events are
/// never suppressed.
pub struct AlertPolicy {
    thresholds: AlertThresholds,
    repeat_interval: Duration,
    recovery_notification: bool,
    last_alert_time: HashMap<String, DateTime<Utc>>,
    last_online: Option<bool>,
}

impl AlertPolicy {
    /// Create a policy with explicit parameters.
    pub fn new(
        thresholds: AlertThresholds,
        repeat_interval: Duration,
        recovery_notification: bool,
    ) -> Self {
        Self {
            thresholds,
            repeat_interval,
            recovery_notification,
            last_alert_time: HashMap::new(),
            last_online: None,
        }
    }

    /// Create a policy from monitor configuration.
    pub fn from_config(config: &MonitorConfig) -> Self {
        Self::new(
            AlertThresholds {
                cpu: config.cpu_threshold,
                memory: config.memory_threshold,
                disk: config.disk_threshold,
            },
            Duration::seconds(config.alert_repeat_secs as i64),
            config.recovery_notification,
        )
    }

    /// Evaluate one observation. Returns zero or more actionable events.
    pub fn evaluate(
        &mut self,
        cpu_average: f64,
        snapshot: &SystemSnapshot,
        health: &ServiceHealth,
        now: DateTime<Utc>,
    ) -> Vec<AlertEvent> {
        let mut events = Vec::new();

        if self.last_online == Some(false) && health.is_online() && self.recovery_notification {
            debug!("Service recovered");
            events.push(AlertEvent::Recovery);
        }
        self.last_online = Some(health.is_online());

        let issues = self.collect_issues(cpu_average, snapshot, health);
        if issues.is_empty() {
            return events;
        }

        let fingerprint = fingerprint(&issues);
        let due = match self.last_alert_time.get(&fingerprint) {
            None => true,
            Some(last) => now - *last >= self.repeat_interval,
        };

        if due {
            self.last_alert_time.insert(fingerprint, now);
            events.push(AlertEvent::Alert { issues });
        } else {
            debug!("Suppressing repeat alert: {}", fingerprint);
        }

        events
    }

    fn collect_issues(
        &self,
        cpu_average: f64,
        snapshot: &SystemSnapshot,
        health: &ServiceHealth,
    ) -> Vec<String> {
        let mut issues = Vec::new();

        if cpu_average > self.thresholds.cpu {
            issues.push(format!("High CPU Usage: {:.1}%", cpu_average));
        }
        if snapshot.memory.percent > self.thresholds.memory {
            issues.push(format!("High Memory Usage: {:.1}%", snapshot.memory.percent));
        }
        if snapshot.disk.percent > self.thresholds.disk {
            issues.push(format!("Low Disk Space: {:.1}% used", snapshot.disk.percent));
        }
        if let Some(reason) = health.offline_reason() {
            issues.push(format!("Service Down: {}", reason));
        }

        issues.sort();
        issues
    }
}

/// De-duplication key for an issue set.
pub(crate) fn fingerprint(sorted_issues: &[String]) -> String {
    sorted_issues.join("|")
}
