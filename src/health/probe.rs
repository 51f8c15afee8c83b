//! HTTP health probe.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use crate::health::HealthStatus;

/// Answers whether the instance at `url` is healthy.
#[async_trait]
pub trait HealthProbe: Send + Sync {
    async fn probe(&self, url: &str) -> HealthStatus;
}

/// Probe that issues a `GET` and requires exactly `200 OK`.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: Client,
}

impl HttpProbe {
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .no_proxy()
            .user_agent(concat!("register-vulcan/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HealthProbe for HttpProbe {
    async fn probe(&self, url: &str) -> HealthStatus {
        match self.client.get(url).send().await {
            Ok(response) if response.status() == StatusCode::OK => HealthStatus::Healthy,
            Ok(response) => {
                tracing::warn!(url = %url, status = %response.status(), "Health check failed: non-200 status");
                HealthStatus::Unhealthy
            }
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Health check failed: connection error");
                HealthStatus::Unhealthy
            }
        }
    }
}
