//! Session token lookup.
//!
//! ARCHITECTURE
//! ============
//! Sessions are issued by the account login flow, which lives outside this
//! service. Here a bearer token only has to resolve to the owning user id.
//! Postgres deployments read the shared `sessions` table; the in-memory
//! store serves local development and tests.

use std::collections::HashMap;
use std::fmt::Write;

use rand::Rng;
use sqlx::PgPool;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::records::StoreError;

pub(crate) fn bytes_to_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{b:02x}");
    }
    s
}

/// Generate a cryptographically random 32-byte hex token.
#[must_use]
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    bytes_to_hex(&bytes)
}

/// Resolves bearer tokens to user ids.
#[async_trait::async_trait]
pub trait SessionStore: Send + Sync {
    /// Return the user owning `token`, or `None` if it is unknown or expired.
    async fn user_for_token(&self, token: &str) -> Result<Option<Uuid>, StoreError>;
}

pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl SessionStore for PgSessionStore {
    async fn user_for_token(&self, token: &str) -> Result<Option<Uuid>, StoreError> {
        let user_id: Option<Uuid> =
            sqlx::query_scalar("SELECT user_id FROM sessions WHERE token = $1 AND expires_at > now()")
                .bind(token)
                .fetch_optional(&self.pool)
                .await?;
        Ok(user_id)
    }
}

/// Token table held in process memory. Tokens never expire.
#[derive(Default)]
pub struct MemorySessionStore {
    tokens: RwLock<HashMap<String, Uuid>>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an existing token for `user_id`.
    pub async fn insert(&self, token: impl Into<String>, user_id: Uuid) {
        self.tokens.write().await.insert(token.into(), user_id);
    }

    /// Issue a fresh random token for `user_id`.
    pub async fn issue(&self, user_id: Uuid) -> String {
        let token = generate_token();
        self.insert(token.clone(), user_id).await;
        token
    }

    /// Register a development session, reusing `token` and `user_id` when
    /// given. Returns the owning user and the token to present.
    pub async fn seed_dev(&self, token: Option<&str>, user_id: Option<Uuid>) -> (Uuid, String) {
        let user_id = user_id.unwrap_or_else(Uuid::new_v4);
        let token = match token {
            Some(token) => {
                self.insert(token, user_id).await;
                token.to_owned()
            }
            None => self.issue(user_id).await,
        };
        (user_id, token)
    }

    /// Forget a token. Returns `true` if it was known.
    pub async fn revoke(&self, token: &str) -> bool {
        self.tokens.write().await.remove(token).is_some()
    }
}

#[async_trait::async_trait]
impl SessionStore for MemorySessionStore {
    async fn user_for_token(&self, token: &str) -> Result<Option<Uuid>, StoreError> {
        Ok(self.tokens.read().await.get(token).copied())
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
