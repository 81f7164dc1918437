//! # upwatch Monitor
//!
//! Monitoring primitives for the upwatch daemon:
//!
//! - Host metrics snapshots (CPU/memory/disk/process counts)
//! - Remote health-endpoint probing with bounded timeouts
//! - Threshold evaluation with alert de-duplication
//! - Notification sinks (Telegram, log)

pub mod error;
pub mod health;
pub mod metrics;
pub mod notify;
pub mod policy;
pub mod report;

pub use error::MonitorError;
pub use health::{HealthCheck, HealthClient, HealthReport, MemoryUsage, ServiceHealth};
pub use metrics::{
    CpuInfo, DiskInfo, MemoryInfo, MetricsProvider, SysinfoMetrics, SystemInfo, SystemSnapshot,
};
pub use notify::{LogSink, MessageFormat, NotificationSink, TelegramSink};
pub use policy::{AlertEvent, AlertPolicy, AlertThresholds};
pub use report::{escape_html, ReportFormatter};
