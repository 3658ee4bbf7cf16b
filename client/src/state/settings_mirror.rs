//! Settings mirror: a lighter binding for single primitive settings.
//!
//! The cache holds the setting's plain string form, not JSON. Reading it
//! back only recognises the exact strings `true` and `false`; any other
//! cached text comes back as [`SettingValue::Text`]. Writes go to the cache
//! synchronously and, when a session token is present, to the remote store
//! as a detached partial update. There is no debounce, cancellation, or
//! loading state.

use std::fmt;

use serde_json::{Map, Number, Value};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::{debug, warn};

use super::SyncDeps;

/// A primitive setting value.
#[derive(Debug, Clone, PartialEq)]
pub enum SettingValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl SettingValue {
    /// Coerce a cached string.
    #[must_use]
    pub fn from_cached(raw: &str) -> Self {
        match raw {
            "true" => Self::Bool(true),
            "false" => Self::Bool(false),
            other => Self::Text(other.to_owned()),
        }
    }

    /// JSON form sent to the remote store. Non-finite numbers become `null`.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Bool(b) => Value::Bool(*b),
            Self::Number(n) => Number::from_f64(*n).map_or(Value::Null, Value::Number),
            Self::Text(s) => Value::String(s.clone()),
        }
    }
}

/// The string written to the local cache.
impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) if n.is_infinite() => {
                f.write_str(if n.is_sign_positive() { "Infinity" } else { "-Infinity" })
            }
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<bool> for SettingValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for SettingValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for SettingValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for SettingValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

pub struct SettingsMirror {
    key: String,
    deps: SyncDeps,
    runtime: Handle,
    value: watch::Sender<SettingValue>,
}

impl SettingsMirror {
    /// Mirror `key`, starting from its cached string or `initial` when the
    /// cache has nothing usable.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn observe(key: impl Into<String>, initial: impl Into<SettingValue>, deps: SyncDeps) -> Self {
        let key = key.into();
        let start = match deps.cache.get(&key) {
            Ok(Some(raw)) => SettingValue::from_cached(&raw),
            Ok(None) => initial.into(),
            Err(e) => {
                warn!(%key, error = %e, "settings cache read failed; using initial value");
                initial.into()
            }
        };
        let (value, _) = watch::channel(start);
        Self { key, deps, runtime: Handle::current(), value }
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub fn get(&self) -> SettingValue {
        self.value.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SettingValue> {
        self.value.subscribe()
    }

    /// Store a new value locally and push it to the remote store in the
    /// background. Safe to call from any thread.
    pub fn set(&self, value: impl Into<SettingValue>) {
        let value = value.into();
        self.value.send_replace(value.clone());

        if let Err(e) = self.deps.cache.set(&self.key, &value.to_string()) {
            warn!(key = %self.key, error = %e, "settings cache write failed");
        }

        let Some(token) = self.deps.tokens.token() else {
            debug!(key = %self.key, "no session token; setting kept local");
            return;
        };

        let mut entries = Map::new();
        entries.insert(self.key.clone(), value.to_json());
        let account = self.deps.account.clone();
        let key = self.key.clone();
        self.runtime.spawn(async move {
            if let Err(e) = account.save_many(&token, &entries).await {
                warn!(%key, error = %e, "settings remote write failed");
            }
        });
    }
}

#[cfg(test)]
#[path = "settings_mirror_test.rs"]
mod tests;
