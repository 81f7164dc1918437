//! Configuration schema definitions.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub health: HealthConfig,

    #[serde(default)]
    pub monitor: MonitorConfig,

    #[serde(default)]
    pub summary: SummaryConfig,

    #[serde(default)]
    pub stats: StatsConfig,

    #[serde(default)]
    pub telegram: TelegramConfig,
}

/// Remote health endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthConfig {
    /// URL of the health-check endpoint to probe.
    #[serde(default = "default_health_url")]
    pub url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_health_timeout")]
    pub timeout_secs: u64,
}

impl HealthConfig {
    /// Get the request timeout as a Duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            url: default_health_url(),
            timeout_secs: default_health_timeout(),
        }
    }
}

fn default_health_url() -> String {
    "http://127.0.0.1:3000/health/check".to_string()
}

fn default_health_timeout() -> u64 {
    5
}

/// Sampling loop and alert threshold configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Seconds between sampling iterations.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Seconds between regular (unconditional) status broadcasts.
    #[serde(default = "default_status_update_interval")]
    pub status_update_interval_secs: u64,

    /// CPU usage percentage above which an alert issue is raised.
    #[serde(default = "default_threshold")]
    pub cpu_threshold: f64,

    /// Memory usage percentage above which an alert issue is raised.
    #[serde(default = "default_threshold")]
    pub memory_threshold: f64,

    /// Disk usage percentage above which an alert issue is raised.
    #[serde(default = "default_threshold")]
    pub disk_threshold: f64,

    /// Minimum seconds between repeated alerts for the same issue set.
    #[serde(default = "default_alert_repeat")]
    pub alert_repeat_secs: u64,

    /// Whether to notify when the service comes back online.
    #[serde(default = "default_recovery_notification")]
    pub recovery_notification: bool,

    /// Number of consecutive CPU readings averaged per check.
    #[serde(default = "default_cpu_samples")]
    pub cpu_samples: u32,

    /// Measurement window per CPU reading, in milliseconds.
    #[serde(default = "default_cpu_sample_millis")]
    pub cpu_sample_millis: u64,
}

impl MonitorConfig {
    /// Get the poll interval as a Duration.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Get the regular status update interval as a Duration.
    pub fn status_update_interval(&self) -> Duration {
        Duration::from_secs(self.status_update_interval_secs)
    }

    /// Get the per-reading CPU measurement window as a Duration.
    pub fn cpu_sample_window(&self) -> Duration {
        Duration::from_millis(self.cpu_sample_millis)
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval(),
            status_update_interval_secs: default_status_update_interval(),
            cpu_threshold: default_threshold(),
            memory_threshold: default_threshold(),
            disk_threshold: default_threshold(),
            alert_repeat_secs: default_alert_repeat(),
            recovery_notification: default_recovery_notification(),
            cpu_samples: default_cpu_samples(),
            cpu_sample_millis: default_cpu_sample_millis(),
        }
    }
}

fn default_poll_interval() -> u64 {
    10
}

fn default_status_update_interval() -> u64 {
    86400
}

fn default_threshold() -> f64 {
    90.0
}

fn default_alert_repeat() -> u64 {
    1800
}

fn default_recovery_notification() -> bool {
    true
}

fn default_cpu_samples() -> u32 {
    3
}

fn default_cpu_sample_millis() -> u64 {
    500
}

/// Daily statistics summary schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryConfig {
    /// Hour of day (24h clock) to send the daily statistics summary.
    #[serde(default = "default_summary_hour")]
    pub hour: u32,

    /// Minute of the hour to send the daily statistics summary.
    #[serde(default)]
    pub minute: u32,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            hour: default_summary_hour(),
            minute: 0,
        }
    }
}

fn default_summary_hour() -> u32 {
    23
}

/// Statistics persistence configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsConfig {
    /// Path of the JSON statistics document.
    #[serde(default = "default_stats_file")]
    pub file: PathBuf,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            file: default_stats_file(),
        }
    }
}

fn default_stats_file() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".upwatch")
        .join("service_stats.json")
}

/// Telegram notification channel configuration.
///
/// When `bot_token` or `chat_id` is absent, notifications go to the log only.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Bot API token. Supports `${VAR}` expansion.
    pub bot_token: Option<String>,

    /// Target chat ID. Supports `${VAR}` expansion.
    pub chat_id: Option<String>,

    /// Optional forum topic / thread ID within the chat.
    pub thread_id: Option<i64>,

    /// Admin usernames (without `@`) tagged in alert and recovery messages.
    #[serde(default)]
    pub admins: Vec<String>,
}

impl TelegramConfig {
    /// Whether enough is configured to send to Telegram.
    pub fn is_configured(&self) -> bool {
        matches!((&self.bot_token, &self.chat_id), (Some(t), Some(c)) if !t.is_empty() && !c.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.monitor.poll_interval_secs, 10);
        assert_eq!(config.monitor.status_update_interval_secs, 86400);
        assert_eq!(config.monitor.cpu_threshold, 90.0);
        assert_eq!(config.monitor.alert_repeat_secs, 1800);
        assert!(config.monitor.recovery_notification);
        assert_eq!(config.summary.hour, 23);
        assert_eq!(config.summary.minute, 0);
        assert_eq!(config.health.timeout_secs, 5);
    }

    #[test]
    fn test_duration_getters() {
        let config = MonitorConfig::default();
        assert_eq!(config.poll_interval(), Duration::from_secs(10));
        assert_eq!(config.status_update_interval(), Duration::from_secs(86400));
        assert_eq!(config.cpu_sample_window(), Duration::from_millis(500));
        assert_eq!(HealthConfig::default().timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_telegram_is_configured() {
        let mut tg = TelegramConfig::default();
        assert!(!tg.is_configured());

        tg.bot_token = Some("123456:ABC".to_string());
        assert!(!tg.is_configured());

        tg.chat_id = Some("-1002355".to_string());
        assert!(tg.is_configured());

        tg.bot_token = Some(String::new());
        assert!(!tg.is_configured());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.monitor.poll_interval_secs, config.monitor.poll_interval_secs);
        assert_eq!(parsed.health.url, config.health.url);
        assert_eq!(parsed.stats.file, config.stats.file);
    }

    #[test]
    fn test_deserialization_partial() {
        let config: Config = toml::from_str(
            r#"
            [monitor]
            poll_interval_secs = 30
            cpu_threshold = 80.0
            "#,
        )
        .unwrap();
        assert_eq!(config.monitor.poll_interval_secs, 30);
        assert_eq!(config.monitor.cpu_threshold, 80.0);
        // Untouched fields keep defaults
        assert_eq!(config.monitor.memory_threshold, 90.0);
        assert_eq!(config.summary.hour, 23);
    }
}
