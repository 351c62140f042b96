//! Post-launch health probing.
//!
//! Advisory only: an unhealthy service stays supervised.

use std::time::Duration;

use reqwest::StatusCode;
use tracing::debug;

use crate::domain::ServiceSpec;
use crate::error::Result;

/// Path every service exposes for readiness.
pub const HEALTH_PATH: &str = "/health";

/// Result of probing one service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// The endpoint answered with a success status.
    Healthy,
    /// No answer, a timeout, or a non-success status, with the reason.
    Unhealthy(String),
}

/// Health of a single service on its port.
#[derive(Debug, Clone)]
pub struct HealthCheck {
    name: String,
    port: u16,
    status: HealthStatus,
}

impl HealthCheck {
    /// Create a new health check result.
    pub fn new(name: impl Into<String>, port: u16, status: HealthStatus) -> Self {
        Self {
            name: name.into(),
            port,
            status,
        }
    }

    /// Get the service name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the probed port.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Get the probe status.
    pub fn status(&self) -> &HealthStatus {
        &self.status
    }

    /// Check if the service answered healthy.
    pub fn is_healthy(&self) -> bool {
        matches!(self.status, HealthStatus::Healthy)
    }
}

/// Health of every probed service, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct HealthReport {
    checks: Vec<HealthCheck>,
}

impl HealthReport {
    /// Get all checks.
    pub fn checks(&self) -> &[HealthCheck] {
        &self.checks
    }

    /// Find the check for a service by name.
    pub fn check(&self, name: &str) -> Option<&HealthCheck> {
        self.checks.iter().find(|c| c.name() == name)
    }

    /// Check if every service is healthy. True for an empty report.
    pub fn is_healthy(&self) -> bool {
        self.checks.iter().all(HealthCheck::is_healthy)
    }

    /// Number of healthy services.
    pub fn healthy_count(&self) -> usize {
        self.checks.iter().filter(|c| c.is_healthy()).count()
    }
}

/// Polls `GET http://<host>:<port>/health` with a bounded timeout.
#[derive(Debug, Clone)]
pub struct HealthProber {
    client: reqwest::Client,
    host: String,
}

impl HealthProber {
    /// Build a prober whose every request gives up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        Self::with_host("localhost", timeout)
    }

    pub fn with_host(host: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            host: host.into(),
        })
    }

    /// True only if the service answered `200 OK` in time.
    pub async fn probe(&self, service: &str, port: u16) -> bool {
        self.status(service, port).await == HealthStatus::Healthy
    }

    /// Probe one service and describe the result.
    pub async fn status(&self, service: &str, port: u16) -> HealthStatus {
        let url = format!("http://{}:{port}{HEALTH_PATH}", self.host);
        let status = match self.client.get(&url).send().await {
            Ok(response) if response.status() == StatusCode::OK => HealthStatus::Healthy,
            Ok(response) => HealthStatus::Unhealthy(format!("HTTP {}", response.status())),
            Err(e) if e.is_timeout() => HealthStatus::Unhealthy("timed out".to_string()),
            Err(e) if e.is_connect() => HealthStatus::Unhealthy("connection refused".to_string()),
            Err(e) => HealthStatus::Unhealthy(e.to_string()),
        };
        debug!(service, port, ?status, "Health probe");
        status
    }

    /// Probe every spec in order.
    pub async fn report(&self, specs: &[ServiceSpec]) -> HealthReport {
        let mut checks = Vec::with_capacity(specs.len());
        for spec in specs {
            let status = self.status(spec.name(), spec.port()).await;
            checks.push(HealthCheck::new(spec.name(), spec.port(), status));
        }
        HealthReport { checks }
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::*;

    /// Serve `response` to every connection on an ephemeral port.
    async fn serve(response: &'static str) -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = [0u8; 1024];
                let _ = socket.read(&mut buf).await;
                let _ = socket.write_all(response.as_bytes()).await;
            }
        });
        port
    }

    fn prober() -> HealthProber {
        HealthProber::with_host("127.0.0.1", Duration::from_millis(500)).unwrap()
    }

    #[tokio::test]
    async fn ok_status_is_healthy() {
        let port = serve("HTTP/1.1 200 OK\r\ncontent-length: 0\r\nconnection: close\r\n\r\n").await;
        assert!(prober().probe("auth", port).await);
    }

    #[tokio::test]
    async fn other_success_statuses_are_unhealthy() {
        let port =
            serve("HTTP/1.1 204 No Content\r\ncontent-length: 0\r\nconnection: close\r\n\r\n").await;
        assert_eq!(
            prober().status("auth", port).await,
            HealthStatus::Unhealthy("HTTP 204 No Content".to_string())
        );
    }

    #[tokio::test]
    async fn server_error_is_unhealthy() {
        let port = serve(
            "HTTP/1.1 503 Service Unavailable\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
        )
        .await;
        assert!(!prober().probe("auth", port).await);
    }

    #[tokio::test]
    async fn closed_port_is_unhealthy() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        assert!(!prober().probe("ghost", port).await);
    }

    #[tokio::test]
    async fn silent_server_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let prober = HealthProber::with_host("127.0.0.1", Duration::from_millis(200)).unwrap();
        let started = std::time::Instant::now();
        assert!(!prober.probe("slow", port).await);
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn report_is_healthy_only_when_all_checks_pass() {
        let report = HealthReport {
            checks: vec![
                HealthCheck::new("a", 4000, HealthStatus::Healthy),
                HealthCheck::new("b", 4001, HealthStatus::Unhealthy("timed out".into())),
            ],
        };

        assert!(!report.is_healthy());
        assert_eq!(report.healthy_count(), 1);
        assert!(report.check("a").unwrap().is_healthy());
        assert!(!report.check("b").unwrap().is_healthy());
        assert!(report.check("c").is_none());
    }
}
