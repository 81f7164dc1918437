//! Chat message formatting.
//!
//! One formatter function per report type, shared by scheduled dispatches
//! and on-demand commands. All dynamic content is HTML-escaped; the sink
//! sends these with HTML parse mode.

use chrono::{DateTime, Utc};

use upwatch_stats::{format_duration, DailySummary, OverallSummary, ServiceStatus, WeeklySummary};

use crate::health::ServiceHealth;
use crate::metrics::SystemSnapshot;

/// Escape Telegram-HTML special characters.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn status_emoji(status: ServiceStatus) -> &'static str {
    match status {
        ServiceStatus::Online => "\u{1f7e2}",
        _ => "\u{1f534}",
    }
}

/// Renders report messages for the notification sink.
pub struct ReportFormatter {
    admins: Vec<String>,
}

impl ReportFormatter {
    pub fn new(admins: Vec<String>) -> Self {
        Self { admins }
    }

    /// Admin usernames as `@user` mentions, space separated.
    pub fn admin_tags(&self) -> String {
        self.admins
            .iter()
            .filter(|u| !u.is_empty())
            .map(|u| format!("@{}", u))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Combined service + host status report.
    pub fn status_report(&self, health: &ServiceHealth, snapshot: &SystemSnapshot) -> String {
        let service_section = match health {
            ServiceHealth::Offline { reason } => format!(
                "\u{26a0}\u{fe0f} <b>Service Unavailable</b>: <code>{}</code>",
                escape_html(reason)
            ),
            ServiceHealth::Online(report) => format!(
                "<b>\u{1f7e2} Service Status</b>\n\
                 <b>Time</b>: <code>{}</code>\n\
                 <b>Uptime</b>: <code>{} minutes</code>\n\
                 <b>Environment</b>: <code>{}</code>\n\n\
                 <b>Memory Usage</b>:\n  - RSS: <code>{}</code>\n  - Heap Total: <code>{}</code>\n  - Heap Used: <code>{}</code>\n",
                escape_html(&report.timestamp),
                (report.uptime / 60.0 * 100.0).round() / 100.0,
                escape_html(&report.environment),
                report.memory_usage.rss,
                report.memory_usage.heap_total,
                report.memory_usage.heap_used,
            ),
        };

        let system_section = format!(
            "<b>\u{1f5a5}\u{fe0f} System Status</b> (<code>{}</code>)\n\
             <b>Platform</b>: <code>{} {}</code>\n\
             <b>Uptime</b>: <code>{}</code>\n\n\
             <b>CPU Usage</b>: <code>{:.1}%</code> ({}/{} cores)\n\
             <b>Memory</b>: <code>{:.2}GB/{:.2}GB</code> ({:.1}%)\n\
             <b>Disk</b>: <code>{:.2}GB/{:.2}GB</code> ({:.1}%)\n\
             <b>Processes</b>: <code>{}</code>\n\
             <b>Network Connections</b>: <code>{}</code>\n\
             <b>Time</b>: <code>{}</code>",
            escape_html(&snapshot.system.hostname),
            escape_html(&snapshot.system.platform),
            escape_html(&snapshot.system.machine),
            format_duration(snapshot.system.uptime_seconds as f64),
            snapshot.cpu.usage_percent,
            snapshot.cpu.physical_cores,
            snapshot.cpu.logical_cores,
            snapshot.memory.used_gb,
            snapshot.memory.total_gb,
            snapshot.memory.percent,
            snapshot.disk.used_gb,
            snapshot.disk.total_gb,
            snapshot.disk.percent,
            snapshot.process_count,
            snapshot.network_connections,
            escape_html(&snapshot.timestamp.format("%Y-%m-%d %H:%M:%S UTC").to_string()),
        );

        format!("{}\n\n{}", service_section, system_section)
    }

    /// Scheduled status broadcast wrapper.
    pub fn regular_status_update(&self, status_report: &str) -> String {
        format!(
            "\u{1f4ca} <b>Daily Status Update</b>\n\n{}",
            status_report
        )
    }

    /// Single-day statistics.
    pub fn daily_stats(&self, summary: &DailySummary) -> String {
        format!(
            "<b>\u{1f4ca} Daily Statistics: {}</b>\n\n\
             <b>Current Status</b>: {} <code>{}</code>\n\
             <b>Availability</b>: <code>{}%</code>\n\
             <b>Uptime</b>: <code>{}</code>\n\
             <b>Downtime</b>: <code>{}</code>\n\
             <b>Outages</b>: <code>{} events</code>\n",
            summary.date,
            status_emoji(summary.status),
            summary.status,
            summary.availability,
            format_duration(summary.uptime_seconds),
            format_duration(summary.downtime_seconds),
            summary.downtime_events,
        )
    }

    /// Scheduled daily-summary wrapper.
    pub fn daily_summary_announcement(&self, summary: &DailySummary) -> String {
        format!(
            "\u{1f4c8} <b>Daily Statistics Summary</b>\n\n{}",
            self.daily_stats(summary)
        )
    }

    /// Trailing-week statistics with a per-day breakdown.
    pub fn weekly_stats(&self, summary: &WeeklySummary) -> String {
        let breakdown = summary
            .daily
            .iter()
            .filter(|d| d.uptime_seconds > 0.0 || d.downtime_seconds > 0.0)
            .map(|d| {
                format!(
                    "- {}: {}% available, {} outages",
                    d.date, d.availability, d.downtime_events
                )
            })
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "<b>\u{1f4c8} Weekly Statistics Summary</b>\n\
             <b>Period</b>: <code>{} to {}</code>\n\n\
             <b>Overall Availability</b>: <code>{}%</code>\n\
             <b>Total Uptime</b>: <code>{}</code>\n\
             <b>Total Downtime</b>: <code>{}</code>\n\
             <b>Total Outages</b>: <code>{} events</code>\n\n\
             <b>Daily Breakdown</b>:\n{}",
            summary.start,
            summary.end,
            summary.availability,
            format_duration(summary.uptime_seconds),
            format_duration(summary.downtime_seconds),
            summary.downtime_events,
            breakdown,
        )
    }

    /// All-time statistics.
    pub fn overall_stats(&self, summary: &OverallSummary) -> String {
        format!(
            "<b>\u{1f4ca} Overall Service Statistics</b>\n\
             <b>Tracking Since</b>: <code>{}</code>\n\
             <b>Current Status</b>: {} <code>{}</code>\n\n\
             <b>Overall Availability</b>: <code>{}%</code>\n\
             <b>Total Uptime</b>: <code>{}</code>\n\
             <b>Total Downtime</b>: <code>{}</code>\n\
             <b>Total Outages</b>: <code>{} events</code>\n",
            summary.since.format("%Y-%m-%d %H:%M:%S UTC"),
            status_emoji(summary.status),
            summary.status,
            summary.availability,
            format_duration(summary.uptime_seconds),
            format_duration(summary.downtime_seconds),
            summary.downtime_events,
        )
    }

    /// Critical alert with the triggering issues and a full status report.
    pub fn alert(&self, issues: &[String], status_report: &str) -> String {
        let issue_lines = issues
            .iter()
            .map(|i| format!("\u{26a0}\u{fe0f} <b>{}</b>", escape_html(i)))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "\u{1f6a8} <b>SYSTEM ALERT</b> {}\n\n{}\n\n{}",
            self.admin_tags(),
            issue_lines,
            status_report,
        )
    }

    /// Offline-to-online recovery notification.
    pub fn recovery(&self, health: &ServiceHealth, now: DateTime<Utc>) -> String {
        let (environment, uptime_minutes) = match health {
            ServiceHealth::Online(report) => (
                report.environment.clone(),
                (report.uptime / 60.0 * 100.0).round() / 100.0,
            ),
            ServiceHealth::Offline { .. } => ("Unknown".to_string(), 0.0),
        };

        format!(
            "\u{2705} <b>SERVICE RECOVERED</b>\n\n\
             The service is now back online! {}\n\n\
             <b>Time</b>: <code>{}</code>\n\
             <b>Environment</b>: <code>{}</code>\n\
             <b>Uptime</b>: <code>{} minutes</code>",
            self.admin_tags(),
            now.format("%Y-%m-%d %H:%M:%S"),
            escape_html(&environment),
            uptime_minutes,
        )
    }

    /// Last-resort plain-text error report, sent without HTML parsing.
    pub fn monitoring_error(&self, error: &str) -> String {
        format!("\u{26a0}\u{fe0f} Monitoring Error: {}", error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::{HealthReport, MemoryUsage};
    use crate::metrics::{CpuInfo, DiskInfo, MemoryInfo, SystemInfo};
    use chrono::{NaiveDate, TimeZone};

    fn formatter() -> ReportFormatter {
        ReportFormatter::new(vec!["ops_one".to_string(), "ops_two".to_string()])
    }

    fn snapshot() -> SystemSnapshot {
        SystemSnapshot {
            cpu: CpuInfo {
                usage_percent: 12.5,
                logical_cores: 8,
                physical_cores: 4,
            },
            memory: MemoryInfo {
                total_gb: 16.0,
                used_gb: 8.0,
                percent: 50.0,
            },
            disk: DiskInfo {
                total_gb: 100.0,
                used_gb: 40.0,
                percent: 40.0,
            },
            system: SystemInfo {
                platform: "Linux".to_string(),
                version: "6.1".to_string(),
                machine: "x86_64".to_string(),
                hostname: "web-1".to_string(),
                boot_time: Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap(),
                uptime_seconds: 90061,
            },
            network_connections: 23,
            process_count: 150,
            timestamp: Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<b>"a" & b</b>"#),
            "&lt;b&gt;&quot;a&quot; &amp; b&lt;/b&gt;"
        );
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_admin_tags() {
        assert_eq!(formatter().admin_tags(), "@ops_one @ops_two");
        assert_eq!(ReportFormatter::new(vec![]).admin_tags(), "");
        assert_eq!(
            ReportFormatter::new(vec![String::new(), "x".to_string()]).admin_tags(),
            "@x"
        );
    }

    #[test]
    fn test_status_report_offline_escapes_reason() {
        let health = ServiceHealth::Offline {
            reason: "returned <html> page".to_string(),
        };
        let text = formatter().status_report(&health, &snapshot());
        assert!(text.contains("Service Unavailable"));
        assert!(text.contains("&lt;html&gt;"));
        assert!(!text.contains("<html>"));
        assert!(text.contains("web-1"));
        assert!(text.contains("4/8 cores"));
    }

    #[test]
    fn test_status_report_online_shows_uptime_minutes() {
        let health = ServiceHealth::Online(HealthReport {
            timestamp: "2026-03-10T12:00:00Z".to_string(),
            uptime: 600.0,
            environment: "production".to_string(),
            memory_usage: MemoryUsage {
                rss: 1000,
                heap_total: 2000,
                heap_used: 1500,
            },
        });
        let text = formatter().status_report(&health, &snapshot());
        assert!(text.contains("10 minutes"));
        assert!(text.contains("production"));
        // Host uptime uses duration formatting, seconds suppressed at day scale.
        assert!(text.contains("1d 1h 1m"));
    }

    #[test]
    fn test_alert_contains_tags_and_issues() {
        let issues = vec![
            "High CPU Usage: 95.0%".to_string(),
            "Service Down: status 503".to_string(),
        ];
        let text = formatter().alert(&issues, "status body");
        assert!(text.starts_with("\u{1f6a8}"));
        assert!(text.contains("@ops_one @ops_two"));
        assert!(text.contains("High CPU Usage: 95.0%"));
        assert!(text.contains("status body"));
    }

    #[test]
    fn test_recovery_message() {
        let health = ServiceHealth::Online(HealthReport {
            timestamp: "2026-03-10T12:00:00Z".to_string(),
            uptime: 90.0,
            environment: "production".to_string(),
            memory_usage: MemoryUsage {
                rss: 1,
                heap_total: 1,
                heap_used: 1,
            },
        });
        let now = Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 5).unwrap();
        let text = formatter().recovery(&health, now);
        assert!(text.contains("SERVICE RECOVERED"));
        assert!(text.contains("2026-03-10 12:00:05"));
        assert!(text.contains("1.5 minutes"));
    }

    #[test]
    fn test_daily_stats_render() {
        let summary = DailySummary {
            date: NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
            availability: 99.5,
            uptime_seconds: 85000.0,
            downtime_seconds: 425.0,
            downtime_events: 2,
            status: ServiceStatus::Online,
        };
        let text = formatter().daily_stats(&summary);
        assert!(text.contains("2026-03-10"));
        assert!(text.contains("99.5%"));
        assert!(text.contains("2 events"));
        assert!(text.contains("\u{1f7e2}"));
    }

    #[test]
    fn test_weekly_stats_breakdown_skips_empty_days() {
        let day = |d: u32, up: f64| DailySummary {
            date: NaiveDate::from_ymd_opt(2026, 3, d).unwrap(),
            availability: 100.0,
            uptime_seconds: up,
            downtime_seconds: 0.0,
            downtime_events: 0,
            status: ServiceStatus::Online,
        };
        let summary = WeeklySummary {
            start: NaiveDate::from_ymd_opt(2026, 3, 4).unwrap(),
            end: NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
            availability: 100.0,
            uptime_seconds: 1000.0,
            downtime_seconds: 0.0,
            downtime_events: 0,
            days_with_data: 2,
            daily: vec![day(9, 1000.0), day(10, 0.0)],
        };
        let text = formatter().weekly_stats(&summary);
        assert!(text.contains("2026-03-04 to 2026-03-10"));
        assert!(text.contains("- 2026-03-09"));
        assert!(!text.contains("- 2026-03-10"));
    }

    #[test]
    fn test_overall_stats_render() {
        let summary = OverallSummary {
            since: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
            availability: 98.76,
            uptime_seconds: 100000.0,
            downtime_seconds: 1255.0,
            downtime_events: 4,
            status: ServiceStatus::Offline,
        };
        let text = formatter().overall_stats(&summary);
        assert!(text.contains("2026-01-01"));
        assert!(text.contains("98.76%"));
        assert!(text.contains("\u{1f534}"));
    }

    #[test]
    fn test_monitoring_error_is_plain() {
        let text = formatter().monitoring_error("stats file locked");
        assert!(text.contains("Monitoring Error: stats file locked"));
        assert!(!text.contains("<b>"));
    }
}
