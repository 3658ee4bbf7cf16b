//! Session token providers.
//!
//! Bindings never reach into shared state for credentials; they are handed a
//! [`TokenProvider`] and ask it each time a remote call is gated. `None`
//! means local-only mode, not an error.

use std::sync::{Arc, PoisonError, RwLock};

use tracing::warn;

use super::cache::LocalCache;

/// Cache key the login flow stores the session token under.
pub const TOKEN_CACHE_KEY: &str = "token";

pub trait TokenProvider: Send + Sync {
    /// Current session token, or `None` when signed out.
    fn token(&self) -> Option<String>;
}

impl<F> TokenProvider for F
where
    F: Fn() -> Option<String> + Send + Sync,
{
    fn token(&self) -> Option<String> {
        self()
    }
}

fn non_empty(token: Option<String>) -> Option<String> {
    token.filter(|t| !t.trim().is_empty())
}

/// A token fixed at construction.
#[derive(Debug, Clone, Default)]
pub struct StaticToken(Option<String>);

impl StaticToken {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(non_empty(Some(token.into())))
    }

    /// A provider that never has a token.
    #[must_use]
    pub fn none() -> Self {
        Self(None)
    }
}

impl TokenProvider for StaticToken {
    fn token(&self) -> Option<String> {
        self.0.clone()
    }
}

/// A token that can be replaced at runtime, e.g. on login and logout.
#[derive(Debug, Default)]
pub struct SharedToken {
    inner: RwLock<Option<String>>,
}

impl SharedToken {
    #[must_use]
    pub fn new(token: Option<String>) -> Self {
        Self { inner: RwLock::new(non_empty(token)) }
    }

    pub fn set(&self, token: impl Into<String>) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = non_empty(Some(token.into()));
    }

    pub fn clear(&self) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl TokenProvider for SharedToken {
    fn token(&self) -> Option<String> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Reads the raw token string stored in a local cache.
pub struct CachedToken {
    cache: Arc<dyn LocalCache>,
    key: String,
}

impl CachedToken {
    /// Provider reading [`TOKEN_CACHE_KEY`].
    #[must_use]
    pub fn new(cache: Arc<dyn LocalCache>) -> Self {
        Self::with_key(cache, TOKEN_CACHE_KEY)
    }

    #[must_use]
    pub fn with_key(cache: Arc<dyn LocalCache>, key: impl Into<String>) -> Self {
        Self { cache, key: key.into() }
    }
}

impl TokenProvider for CachedToken {
    fn token(&self) -> Option<String> {
        match self.cache.get(&self.key) {
            Ok(token) => non_empty(token),
            Err(e) => {
                warn!(key = %self.key, error = %e, "session token lookup failed; treating as signed out");
                None
            }
        }
    }
}

#[cfg(test)]
#[path = "token_test.rs"]
mod tests;
