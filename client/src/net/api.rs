//! HTTP implementation of [`AccountData`] over the `/data` endpoints.
//!
//! ERROR HANDLING
//! ==============
//! Non-success responses are turned into [`AccountError`] values carrying
//! the server's `{ error }` message when one is present. Callers in the sync
//! bindings log these and move on; the CLI prints them.

use std::time::Duration;

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{Map, Value, json};

use super::account::{AccountData, AccountError};
use crate::config::ClientConfig;

#[derive(Debug, Deserialize)]
struct ValueResponse {
    value: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct SavedResponse {
    saved: usize,
}

/// [`AccountData`] backed by a remote Account Data Service.
#[derive(Debug, Clone)]
pub struct HttpAccountData {
    http: reqwest::Client,
    base_url: String,
}

impl HttpAccountData {
    /// Build a client for `base_url` with request and connect timeouts.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: &str, request_timeout: Duration, connect_timeout: Duration) -> Result<Self, AccountError> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .connect_timeout(connect_timeout)
            .build()?;
        Ok(Self::with_client(http, base_url))
    }

    /// Build a client from typed client configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &ClientConfig) -> Result<Self, AccountError> {
        Self::new(&config.base_url, config.request_timeout, config.connect_timeout)
    }

    /// Wrap an existing `reqwest` client.
    #[must_use]
    pub fn with_client(http: reqwest::Client, base_url: &str) -> Self {
        Self { http, base_url: normalize_base_url(base_url) }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn data_url(&self) -> String {
        data_endpoint(&self.base_url)
    }
}

pub(crate) fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_owned()
}

pub(crate) fn data_endpoint(base_url: &str) -> String {
    format!("{base_url}/data")
}

/// Extract the `error` field from a JSON error body, falling back to the raw
/// body text.
pub(crate) fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_owned))
        .unwrap_or_else(|| body.trim().to_owned())
}

pub(crate) fn status_error(status: StatusCode, body: &str) -> AccountError {
    let message = error_message(body);
    if status == StatusCode::UNAUTHORIZED {
        AccountError::Unauthorized(message)
    } else {
        AccountError::Status { status: status.as_u16(), message }
    }
}

async fn read_success(resp: reqwest::Response) -> Result<Vec<u8>, AccountError> {
    let status = resp.status();
    let body = resp.bytes().await?;
    if !status.is_success() {
        return Err(status_error(status, &String::from_utf8_lossy(&body)));
    }
    Ok(body.to_vec())
}

#[async_trait::async_trait]
impl AccountData for HttpAccountData {
    async fn fetch(&self, token: &str, key: &str) -> Result<Option<Value>, AccountError> {
        let resp = self
            .http
            .get(self.data_url())
            .bearer_auth(token)
            .query(&[("key", key)])
            .send()
            .await?;
        let body: ValueResponse = serde_json::from_slice(&read_success(resp).await?)?;
        Ok(body.value)
    }

    async fn fetch_all(&self, token: &str) -> Result<Map<String, Value>, AccountError> {
        let resp = self.http.get(self.data_url()).bearer_auth(token).send().await?;
        Ok(serde_json::from_slice(&read_success(resp).await?)?)
    }

    async fn save(&self, token: &str, key: &str, value: &Value) -> Result<(), AccountError> {
        let resp = self
            .http
            .post(self.data_url())
            .bearer_auth(token)
            .json(&json!({ "key": key, "value": value }))
            .send()
            .await?;
        read_success(resp).await?;
        Ok(())
    }

    async fn save_many(&self, token: &str, entries: &Map<String, Value>) -> Result<usize, AccountError> {
        let resp = self
            .http
            .put(self.data_url())
            .bearer_auth(token)
            .json(entries)
            .send()
            .await?;
        let body: SavedResponse = serde_json::from_slice(&read_success(resp).await?)?;
        Ok(body.saved)
    }

    async fn delete(&self, token: &str, key: &str) -> Result<(), AccountError> {
        let resp = self
            .http
            .delete(self.data_url())
            .bearer_auth(token)
            .query(&[("key", key)])
            .send()
            .await?;
        read_success(resp).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;
