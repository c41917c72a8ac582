//! HTTP client for a remote cache server.

use crate::error::{NetworkError, Result};
use crate::network::rpc::{GetResponse, MessageResponse, OwnerDataResponse, SetRequest};
use crate::types::CacheStats;
use reqwest::{Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use tracing::debug;

/// Default server URL used by the command-line client.
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8000";

/// Client for the cache REST routes.
///
/// Lookups that can legitimately miss (`get`, `delete`, `remove_node`,
/// `node_data`) map a 404 to `None`/`false`. Every other non-2xx status is
/// returned as [`NetworkError::UnexpectedStatus`].
#[derive(Debug, Clone)]
pub struct CacheClient {
    base_url: String,
    http: reqwest::Client,
}

impl CacheClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            http: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a route URL, percent-encoding each segment so keys containing
    /// `?`, `#`, `/` or spaces reach the server intact.
    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| NetworkError::InvalidAddress(format!("{}: {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| NetworkError::InvalidAddress(self.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Fetch the value stored under `key`.
    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        let response = self.http.get(self.url(&["get", key])?).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let body: GetResponse = decode(response).await?;
        Ok(Some(body.value))
    }

    /// Store `value` under `key`; returns the server's confirmation.
    pub async fn set(&self, key: &str, value: &str) -> Result<String> {
        let response = self
            .http
            .post(self.url(&["set", key])?)
            .json(&SetRequest {
                value: value.to_string(),
            })
            .send()
            .await?;
        let body: MessageResponse = decode(response).await?;
        Ok(body.message)
    }

    /// Delete `key`. Returns false if it was absent.
    pub async fn delete(&self, key: &str) -> Result<bool> {
        let response = self
            .http
            .delete(self.url(&["delete", key])?)
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        decode::<MessageResponse>(response).await?;
        Ok(true)
    }

    pub async fn list_nodes(&self) -> Result<Vec<String>> {
        let response = self.http.get(self.url(&["nodes"])?).send().await?;
        decode(response).await
    }

    pub async fn add_node(&self, name: &str) -> Result<String> {
        let response = self
            .http
            .post(self.url(&["nodes", name])?)
            .send()
            .await?;
        let body: MessageResponse = decode(response).await?;
        Ok(body.message)
    }

    /// Remove a node. Returns `None` if no such node is attached.
    pub async fn remove_node(&self, name: &str) -> Result<Option<String>> {
        let response = self
            .http
            .delete(self.url(&["nodes", name])?)
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let body: MessageResponse = decode(response).await?;
        Ok(Some(body.message))
    }

    pub async fn node_data(&self, name: &str) -> Result<Option<HashMap<String, String>>> {
        let response = self.http.get(self.url(&["data", name])?).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let body: OwnerDataResponse = decode(response).await?;
        Ok(Some(body.data))
    }

    pub async fn stats(&self) -> Result<CacheStats> {
        let response = self.http.get(self.url(&["stats"])?).send().await?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    debug!(url = %response.url(), status = status.as_u16(), "Response received");

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(NetworkError::UnexpectedStatus {
            status: status.as_u16(),
            body,
        }
        .into());
    }
    Ok(response.json().await?)
}
