//! vulcand v2 HTTP API client.
//!
//! # Endpoints
//! - `GET    /v2/backends/{backend}/servers/{server}` (404 → absent)
//! - `POST   /v2/backends/{backend}/servers` with `{"Server": {...}, "TTL": "11s"}`
//! - `DELETE /v2/backends/{backend}/servers/{server}` (404 → already gone)

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::duration::format_duration;
use crate::registry::{Registry, RegistrationKey, RegistryError, ServerEntry};

#[derive(Debug, Serialize)]
struct UpsertRequest<'a> {
    #[serde(rename = "Server")]
    server: &'a ServerEntry,

    #[serde(rename = "TTL")]
    ttl: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Registry backed by a vulcand API endpoint.
#[derive(Debug, Clone)]
pub struct VulcandRegistry {
    endpoint: Url,
}

impl VulcandRegistry {
    pub fn new(endpoint: Url) -> Self {
        Self { endpoint }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Each operation gets its own non-pooled client, so no connection state
    /// is shared between cycles.
    fn client(&self) -> Result<Client, RegistryError> {
        Client::builder()
            .pool_max_idle_per_host(0)
            .no_proxy()
            .user_agent(concat!("register-vulcan/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(RegistryError::Client)
    }

    fn url(&self, segments: &[&str]) -> Result<Url, RegistryError> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| RegistryError::Endpoint {
                endpoint: self.endpoint.to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn servers_url(&self, backend_id: &str) -> Result<Url, RegistryError> {
        self.url(&["v2", "backends", backend_id, "servers"])
    }

    fn server_url(&self, key: &RegistrationKey) -> Result<Url, RegistryError> {
        self.url(&["v2", "backends", &key.backend_id, "servers", &key.server_id])
    }
}

async fn rejection(response: Response) -> RegistryError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .map(|b| b.message)
        .unwrap_or(body);
    RegistryError::Rejected { status, message }
}

#[async_trait]
impl Registry for VulcandRegistry {
    async fn get_server(&self, key: &RegistrationKey) -> Result<Option<ServerEntry>, RegistryError> {
        let url = self.server_url(key)?;
        let response = self
            .client()?
            .get(url)
            .send()
            .await
            .map_err(RegistryError::Transport)?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(rejection(response).await);
        }

        let body = response.bytes().await.map_err(RegistryError::Transport)?;
        serde_json::from_slice(&body)
            .map(Some)
            .map_err(RegistryError::Decode)
    }

    async fn upsert_server(
        &self,
        key: &RegistrationKey,
        url: &str,
        ttl: Duration,
    ) -> Result<(), RegistryError> {
        let server = ServerEntry {
            id: key.server_id.clone(),
            url: url.to_string(),
        };
        let request = UpsertRequest {
            server: &server,
            ttl: format_duration(ttl),
        };

        let response = self
            .client()?
            .post(self.servers_url(&key.backend_id)?)
            .json(&request)
            .send()
            .await
            .map_err(RegistryError::Transport)?;

        if !response.status().is_success() {
            return Err(rejection(response).await);
        }
        tracing::debug!(key = %key, url = %url, ttl = ?ttl, "Server upserted");
        Ok(())
    }

    async fn remove_server(&self, key: &RegistrationKey) -> Result<(), RegistryError> {
        let response = self
            .client()?
            .delete(self.server_url(key)?)
            .send()
            .await
            .map_err(RegistryError::Transport)?;

        match response.status() {
            status if status.is_success() => {
                tracing::debug!(key = %key, "Server removed");
                Ok(())
            }
            StatusCode::NOT_FOUND => {
                tracing::debug!(key = %key, "Server already absent");
                Ok(())
            }
            _ => Err(rejection(response).await),
        }
    }
}
