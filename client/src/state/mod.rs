//! Sync bindings and their shared dependencies.
//!
//! ARCHITECTURE
//! ============
//! Each binding owns one key. It reads and writes the local cache
//! synchronously and talks to the Account Data Service in background Tokio
//! tasks. All collaborators arrive through [`SyncDeps`] so a binding never
//! touches process-global state.

pub mod settings_mirror;
pub mod synced_value;

use std::sync::Arc;
use std::time::Duration;

use crate::config::{ClientConfig, DEFAULT_DEBOUNCE_MS};
use crate::net::AccountData;
use crate::storage::{LocalCache, TokenProvider};

pub use settings_mirror::{SettingValue, SettingsMirror};
pub use synced_value::{Setter, SyncedValue};

/// Collaborators shared by every binding of one client.
#[derive(Clone)]
pub struct SyncDeps {
    pub account: Arc<dyn AccountData>,
    pub cache: Arc<dyn LocalCache>,
    pub tokens: Arc<dyn TokenProvider>,
}

impl SyncDeps {
    #[must_use]
    pub fn new(account: Arc<dyn AccountData>, cache: Arc<dyn LocalCache>, tokens: Arc<dyn TokenProvider>) -> Self {
        Self { account, cache, tokens }
    }
}

/// Per-binding behavior of a [`SyncedValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOptions {
    /// Refresh from the remote store once on activation.
    pub sync_on_mount: bool,
    /// Quiet period before an update is written remotely.
    pub debounce: Duration,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self { sync_on_mount: true, debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS) }
    }
}

impl SyncOptions {
    /// Defaults with the debounce taken from client configuration.
    #[must_use]
    pub fn from_config(config: &ClientConfig) -> Self {
        Self { debounce: config.debounce, ..Self::default() }
    }

    #[must_use]
    pub fn sync_on_mount(mut self, enabled: bool) -> Self {
        self.sync_on_mount = enabled;
        self
    }

    #[must_use]
    pub fn debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }
}
