//! Host metrics collection.

#[cfg(test)]
#[path = "metrics_tests.rs"]
mod tests;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use sysinfo::{Disks, System};
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::MonitorError;

const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

/// CPU usage and topology.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CpuInfo {
    pub usage_percent: f64,
    pub logical_cores: usize,
    pub physical_cores: usize,
}

/// Memory usage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryInfo {
    pub total_gb: f64,
    pub used_gb: f64,
    pub percent: f64,
}

/// Disk usage for the root filesystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiskInfo {
    pub total_gb: f64,
    pub used_gb: f64,
    pub percent: f64,
}

/// Host identity and uptime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemInfo {
    pub platform: String,
    pub version: String,
    pub machine: String,
    pub hostname: String,
    pub boot_time: DateTime<Utc>,
    pub uptime_seconds: u64,
}

/// Point-in-time snapshot of host resource usage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemSnapshot {
    pub cpu: CpuInfo,
    pub memory: MemoryInfo,
    pub disk: DiskInfo,
    pub system: SystemInfo,
    pub network_connections: u32,
    pub process_count: usize,
    pub timestamp: DateTime<Utc>,
}

/// Host metrics source.
#[async_trait]
pub trait MetricsProvider: Send + Sync {
    /// Collect a full snapshot of current host state.
    async fn snapshot(&self) -> Result<SystemSnapshot, MonitorError>;

    /// Average CPU usage over `samples` consecutive readings, each measured
    /// over `window`.
    async fn cpu_average(&self, samples: u32, window: Duration) -> Result<f64, MonitorError>;
}

/// Arithmetic mean of a reading series. Empty input averages to zero.
pub(crate) fn mean(readings: &[f64]) -> f64 {
    if readings.is_empty() {
        0.0
    } else {
        readings.iter().sum::<f64>() / readings.len() as f64
    }
}

pub(crate) fn bytes_to_gb(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_GB
}

pub(crate) fn usage_percent(used: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        used as f64 / total as f64 * 100.0
    }
}

/// Metrics provider backed by the `sysinfo` crate.
pub struct SysinfoMetrics {
    sys: Mutex<System>,
}

impl SysinfoMetrics {
    /// Create a new provider with a fully refreshed system handle.
    pub fn new() -> Self {
        let mut sys = System::new_all();
        sys.refresh_all();
        Self {
            sys: Mutex::new(sys),
        }
    }

    fn disk_usage() -> (u64, u64) {
        let disks = Disks::new_with_refreshed_list();

        // Prefer the root filesystem, matching what an operator expects from
        // a "disk full" alert. Fall back to the first listed disk.
        let root = disks
            .iter()
            .find(|d| d.mount_point() == std::path::Path::new("/"))
            .or_else(|| disks.iter().next());

        match root {
            Some(disk) => {
                let total = disk.total_space();
                let used = total.saturating_sub(disk.available_space());
                (used, total)
            }
            None => (0, 0),
        }
    }

    /// Count open TCP connections from procfs. Zero on platforms without it.
    fn network_connections() -> u32 {
        let mut count = 0u32;
        for path in ["/proc/net/tcp", "/proc/net/tcp6"] {
            if let Ok(content) = std::fs::read_to_string(path) {
                // First line is the header.
                count += content.lines().skip(1).count() as u32;
            }
        }
        count
    }
}

impl Default for SysinfoMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MetricsProvider for SysinfoMetrics {
    async fn snapshot(&self) -> Result<SystemSnapshot, MonitorError> {
        let mut sys = self.sys.lock().await;
        sys.refresh_all();

        let logical_cores = sys.cpus().len();
        let physical_cores = sys.physical_core_count().unwrap_or(logical_cores);

        let mem_total = sys.total_memory();
        let mem_used = sys.used_memory();
        let (disk_used, disk_total) = Self::disk_usage();

        let snapshot = SystemSnapshot {
            cpu: CpuInfo {
                usage_percent: sys.global_cpu_usage() as f64,
                logical_cores,
                physical_cores,
            },
            memory: MemoryInfo {
                total_gb: bytes_to_gb(mem_total),
                used_gb: bytes_to_gb(mem_used),
                percent: usage_percent(mem_used, mem_total),
            },
            disk: DiskInfo {
                total_gb: bytes_to_gb(disk_total),
                used_gb: bytes_to_gb(disk_used),
                percent: usage_percent(disk_used, disk_total),
            },
            system: SystemInfo {
                platform: System::name().unwrap_or_else(|| "unknown".to_string()),
                version: System::os_version().unwrap_or_else(|| "unknown".to_string()),
                machine: std::env::consts::ARCH.to_string(),
                hostname: System::host_name().unwrap_or_else(|| "unknown".to_string()),
                boot_time: Utc
                    .timestamp_opt(System::boot_time() as i64, 0)
                    .single()
                    .unwrap_or_else(Utc::now),
                uptime_seconds: System::uptime(),
            },
            network_connections: Self::network_connections(),
            process_count: sys.processes().len(),
            timestamp: Utc::now(),
        };

        debug!(
            cpu = snapshot.cpu.usage_percent,
            memory = snapshot.memory.percent,
            disk = snapshot.disk.percent,
            "Collected host snapshot"
        );

        Ok(snapshot)
    }

    async fn cpu_average(&self, samples: u32, window: Duration) -> Result<f64, MonitorError> {
        let mut readings = Vec::with_capacity(samples as usize);

        for _ in 0..samples {
            {
                let mut sys = self.sys.lock().await;
                sys.refresh_cpu_usage();
            }
            // sysinfo measures usage between two refreshes.
            tokio::time::sleep(window).await;
            let mut sys = self.sys.lock().await;
            sys.refresh_cpu_usage();
            readings.push(sys.global_cpu_usage() as f64);
        }

        Ok(mean(&readings))
    }
}
