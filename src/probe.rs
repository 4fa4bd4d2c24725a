use crate::address;
use crate::protocol::{Command, CommandEnvelope, CAST_PATH};
use crate::types::DeviceDescriptor;
use reqwest::StatusCode;
use std::future::Future;
use std::time::Duration;

/// Verifies that a candidate runs the FF1 command daemon
pub trait LivenessProbe: Send + Sync {
    /// Returns a descriptor named after `host` when the device answers in
    /// time, `None` otherwise. Never fails.
    fn probe(
        &self,
        host: &str,
        port: u16,
        timeout: Duration,
    ) -> impl Future<Output = Option<DeviceDescriptor>> + Send;
}

/// Probes with a `getDeviceStatus` command over HTTP
#[derive(Debug, Clone)]
pub struct HttpProbe {
    http: reqwest::Client,
}

impl HttpProbe {
    pub fn new() -> Self {
        Self {
            http: crate::client::lan_http_client(),
        }
    }

    /// Reuse an existing HTTP client (connection pool, proxy settings)
    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }
}

impl Default for HttpProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl LivenessProbe for HttpProbe {
    async fn probe(&self, host: &str, port: u16, timeout: Duration) -> Option<DeviceDescriptor> {
        let url = format!("http://{}{}", address::authority(host, port), CAST_PATH);
        let envelope = CommandEnvelope::new(Command::DeviceStatus).with_request(serde_json::json!({}));

        let result = self
            .http
            .post(&url)
            .json(&envelope)
            .timeout(timeout)
            .send()
            .await;

        match result {
            Ok(response) if response.status() == StatusCode::OK => {
                tracing::debug!("Probe of {} succeeded", url);
                Some(DeviceDescriptor::new(host, port))
            }
            Ok(response) => {
                tracing::debug!("Probe of {} returned {}", url, response.status());
                None
            }
            Err(e) => {
                tracing::debug!("Probe of {} failed: {}", url, e);
                None
            }
        }
    }
}
