//! HTTP worker client backed by reqwest.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tokio::time;

use crate::config::RouterConfig;
use crate::load_balancer::Instance;
use crate::upstream::{Payload, UpstreamError, WorkerClient};

/// Paths and deadlines for worker calls.
#[derive(Debug, Clone)]
pub struct UpstreamSettings {
    pub api_path: String,
    pub health_path: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub health_timeout: Duration,
}

impl Default for UpstreamSettings {
    fn default() -> Self {
        Self {
            api_path: "/process".to_string(),
            health_path: "/actuator/health".to_string(),
            connect_timeout: Duration::from_secs(3),
            request_timeout: Duration::from_secs(5),
            health_timeout: Duration::from_secs(2),
        }
    }
}

impl From<&RouterConfig> for UpstreamSettings {
    fn from(config: &RouterConfig) -> Self {
        Self {
            api_path: config.balancer.worker_api_path.clone(),
            health_path: config.balancer.worker_health_path.clone(),
            connect_timeout: Duration::from_secs(config.timeouts.connect_secs),
            request_timeout: Duration::from_secs(config.timeouts.request_secs),
            health_timeout: Duration::from_secs(config.health_check.timeout_secs),
        }
    }
}

/// Talks JSON over HTTP to worker instances.
#[derive(Debug, Clone)]
pub struct HttpWorkerClient {
    client: Client,
    settings: UpstreamSettings,
}

impl HttpWorkerClient {
    pub fn new(settings: UpstreamSettings) -> Result<Self, UpstreamError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .connect_timeout(settings.connect_timeout)
            .user_agent(concat!("worker-router/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, settings })
    }

    /// Send a request and decode a 2xx JSON body, all within `deadline`.
    async fn execute<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        deadline: Duration,
    ) -> Result<T, UpstreamError> {
        match time::timeout(deadline, send_and_decode(request)).await {
            Ok(result) => result,
            Err(_) => Err(UpstreamError::Timeout(deadline)),
        }
    }
}

async fn send_and_decode<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, UpstreamError> {
    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(UpstreamError::Status(status.as_u16()));
    }
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| UpstreamError::Decode(e.to_string()))
}

#[async_trait]
impl WorkerClient for HttpWorkerClient {
    async fn forward(&self, instance: &Instance, payload: &Payload) -> Result<Payload, UpstreamError> {
        let url = instance.url_for(&self.settings.api_path);
        let request = self.client.post(url).json(payload);
        self.execute(request, self.settings.request_timeout).await
    }

    async fn health(&self, instance: &Instance) -> Result<Value, UpstreamError> {
        let url = instance.url_for(&self.settings.health_path);
        let request = self.client.get(url);
        self.execute(request, self.settings.health_timeout).await
    }
}
