//! Remote health-endpoint probing.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Process memory figures reported by the monitored service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryUsage {
    pub rss: u64,
    pub heap_total: u64,
    pub heap_used: u64,
}

/// Payload of a successful health-check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub timestamp: String,
    /// Service process uptime in seconds.
    pub uptime: f64,
    #[serde(default)]
    pub environment: String,
    pub memory_usage: MemoryUsage,
}

/// Outcome of a single health probe. Failures are values, never panics:
/// timeouts, refused connections and bad payloads all land in `Offline`.
#[derive(Debug, Clone)]
pub enum ServiceHealth {
    Online(HealthReport),
    Offline { reason: String },
}

impl ServiceHealth {
    pub fn is_online(&self) -> bool {
        matches!(self, ServiceHealth::Online(_))
    }

    /// The failure reason, if offline.
    pub fn offline_reason(&self) -> Option<&str> {
        match self {
            ServiceHealth::Online(_) => None,
            ServiceHealth::Offline { reason } => Some(reason),
        }
    }
}

/// Health probe trait.
#[async_trait]
pub trait HealthCheck: Send + Sync {
    /// Probe the service once. Infallible by construction: every failure
    /// mode is reported as `ServiceHealth::Offline`.
    async fn check(&self) -> ServiceHealth;
}

/// HTTP health-check client with a bounded per-request timeout.
pub struct HealthClient {
    url: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl HealthClient {
    /// Create a new client for the given endpoint.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            timeout,
            client: reqwest::Client::new(),
        }
    }

    /// The probed endpoint URL.
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl HealthCheck for HealthClient {
    async fn check(&self) -> ServiceHealth {
        let response = match self
            .client
            .get(&self.url)
            .timeout(self.timeout)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) if e.is_timeout() => {
                return ServiceHealth::Offline {
                    reason: format!("Health check timed out after {}s", self.timeout.as_secs()),
                };
            }
            Err(e) if e.is_connect() => {
                return ServiceHealth::Offline {
                    reason: "Cannot connect to service".to_string(),
                };
            }
            Err(e) => {
                return ServiceHealth::Offline {
                    reason: format!("Health check failed: {}", e),
                };
            }
        };

        let status = response.status();
        if !status.is_success() {
            return ServiceHealth::Offline {
                reason: format!("Health check returned status {}", status.as_u16()),
            };
        }

        match response.json::<HealthReport>().await {
            Ok(report) => {
                debug!(uptime = report.uptime, "Service healthy");
                ServiceHealth::Online(report)
            }
            Err(e) => ServiceHealth::Offline {
                reason: format!("Invalid health check response: {}", e),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn healthy_body() -> serde_json::Value {
        serde_json::json!({
            "timestamp": "2026-03-10T12:00:00.000Z",
            "uptime": 12345.6,
            "environment": "production",
            "memoryUsage": {
                "rss": 52428800,
                "heapTotal": 20971520,
                "heapUsed": 18874368
            }
        })
    }

    #[tokio::test]
    async fn test_check_online() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health/check"))
            .respond_with(ResponseTemplate::new(200).set_body_json(healthy_body()))
            .mount(&server)
            .await;

        let client = HealthClient::new(
            format!("{}/health/check", server.uri()),
            Duration::from_secs(5),
        );
        let health = client.check().await;

        match health {
            ServiceHealth::Online(report) => {
                assert_eq!(report.environment, "production");
                assert_eq!(report.memory_usage.rss, 52428800);
                assert_eq!(report.uptime, 12345.6);
            }
            ServiceHealth::Offline { reason } => panic!("expected online, got: {}", reason),
        }
    }

    #[tokio::test]
    async fn test_check_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = HealthClient::new(server.uri(), Duration::from_secs(5));
        let health = client.check().await;

        assert!(!health.is_online());
        assert!(health.offline_reason().unwrap().contains("503"));
    }

    #[tokio::test]
    async fn test_check_invalid_payload() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = HealthClient::new(server.uri(), Duration::from_secs(5));
        let health = client.check().await;

        assert!(!health.is_online());
        assert!(health
            .offline_reason()
            .unwrap()
            .contains("Invalid health check response"));
    }

    #[tokio::test]
    async fn test_check_connection_refused() {
        // Nothing listens on this port.
        let client = HealthClient::new("http://127.0.0.1:1/health", Duration::from_secs(5));
        let health = client.check().await;

        assert!(!health.is_online());
        assert!(health.offline_reason().is_some());
    }

    #[tokio::test]
    async fn test_check_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(healthy_body())
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let client = HealthClient::new(server.uri(), Duration::from_millis(100));
        let health = client.check().await;

        assert!(!health.is_online());
        assert!(health.offline_reason().unwrap().contains("timed out"));
    }
}
