//! Account Data Service contract.
//!
//! SYSTEM CONTEXT
//! ==============
//! Sync bindings talk to the remote key/value API only through
//! [`AccountData`], so tests and embedders can substitute their own backend.
//! The session token is passed per call; bindings read it from their
//! injected token provider at the moment a call is gated.

use serde_json::{Map, Value};

#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("not authorized: {0}")]
    Unauthorized(String),
    #[error("account data request failed with {status}: {message}")]
    Status { status: u16, message: String },
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid response payload: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Remote per-user key/value store.
#[async_trait::async_trait]
pub trait AccountData: Send + Sync {
    /// Read one key. `Ok(None)` when the key is absent server-side.
    async fn fetch(&self, token: &str, key: &str) -> Result<Option<Value>, AccountError>;

    /// Read every key owned by the token's user.
    async fn fetch_all(&self, token: &str) -> Result<Map<String, Value>, AccountError>;

    /// Upsert one key.
    async fn save(&self, token: &str, key: &str, value: &Value) -> Result<(), AccountError>;

    /// Upsert every entry of `entries`, returning how many were saved.
    async fn save_many(&self, token: &str, entries: &Map<String, Value>) -> Result<usize, AccountError>;

    /// Remove one key.
    async fn delete(&self, token: &str, key: &str) -> Result<(), AccountError>;
}
