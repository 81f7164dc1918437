//! Monitor errors.

use thiserror::Error;

/// Monitor error types.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// Failed to collect metrics.
    #[error("Failed to collect metrics: {0}")]
    MetricsCollection(String),

    /// Notification delivery failed.
    #[error("Notification delivery failed: {0}")]
    Notification(String),

    /// Notification sink not configured.
    #[error("Notification sink not configured: {0}")]
    SinkNotConfigured(String),

    /// Generic error.
    #[error("{0}")]
    Custom(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MonitorError::MetricsCollection("no disks found".to_string());
        assert!(err.to_string().contains("no disks found"));

        let err = MonitorError::Notification("telegram returned 429".to_string());
        assert!(err.to_string().contains("429"));
    }
}
