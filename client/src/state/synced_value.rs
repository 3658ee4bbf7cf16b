//! Synced value binding: one key kept in step between the local cache and
//! the Account Data Service.
//!
//! DESIGN
//! ======
//! Reads are served from memory, seeded from the local cache on activation.
//! Every update is written to the cache synchronously and to the remote
//! store through a debounced task: each update aborts the pending task and
//! arms a new one, so only the last value inside a quiet period is sent.
//!
//! On activation (when `sync_on_mount` is set and a token is present) the
//! binding fetches the remote value once. A remote value replaces the local
//! one unless the binding was updated locally while the fetch was in flight;
//! in that case the local edit is kept and will be written remotely by its
//! own debounced task.
//!
//! ERROR HANDLING
//! ==============
//! Cache and remote failures are logged and swallowed. The in-memory value
//! is always the last value applied, whatever happened to persistence.
//!
//! TEARDOWN
//! ========
//! Dropping the binding clears its liveness flag and aborts the pending
//! debounce task. An in-flight mount fetch still completes but no longer
//! touches state. A remote write whose timer already fired is not
//! interrupted.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::{SyncDeps, SyncOptions};
use crate::net::AccountError;
use crate::storage::{load_json, save_json};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

struct Shared<T> {
    key: String,
    options: SyncOptions,
    deps: SyncDeps,
    /// Runtime captured on activation; background work is spawned here so
    /// updates may come from any thread.
    runtime: Handle,
    value: watch::Sender<T>,
    loading: watch::Sender<bool>,
    /// Liveness flag; cleared on teardown.
    alive: AtomicBool,
    /// Set by the first local update.
    edited: AtomicBool,
    /// Serializes updates, refresh application, and teardown.
    update_lock: Mutex<()>,
    /// Pending debounced remote write.
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl<T> Shared<T> {
    fn teardown(&self) {
        let _guard = lock(&self.update_lock);
        if self.alive.swap(false, Ordering::AcqRel) {
            if let Some(handle) = lock(&self.pending).take() {
                handle.abort();
            }
            debug!(key = %self.key, "synced value torn down");
        }
    }
}

impl<T> Shared<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    fn apply(&self, f: impl FnOnce(&T) -> T) {
        let _guard = lock(&self.update_lock);
        if !self.alive.load(Ordering::Acquire) {
            debug!(key = %self.key, "update after teardown ignored");
            return;
        }

        let previous = self.value.borrow().clone();
        let next = f(&previous);
        self.edited.store(true, Ordering::Release);
        self.value.send_replace(next.clone());

        save_json(self.deps.cache.as_ref(), &self.key, &next);
        self.schedule_remote_write(&next);
    }

    fn schedule_remote_write(&self, value: &T) {
        let mut pending = lock(&self.pending);
        if let Some(previous) = pending.take() {
            previous.abort();
        }

        let payload = match serde_json::to_value(value) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(key = %self.key, error = %e, "value could not be serialized; remote write skipped");
                return;
            }
        };

        let account = Arc::clone(&self.deps.account);
        let tokens = Arc::clone(&self.deps.tokens);
        let key = self.key.clone();
        let debounce = self.options.debounce;

        let runtime = self.runtime.clone();
        *pending = Some(self.runtime.spawn(async move {
            tokio::time::sleep(debounce).await;
            let Some(token) = tokens.token() else {
                debug!(%key, "no session token; remote write skipped");
                return;
            };
            // Detached so that aborting this timer never cuts off a write in flight.
            runtime.spawn(async move {
                match account.save(&token, &key, &payload).await {
                    Ok(()) => debug!(%key, "remote write complete"),
                    Err(e) => warn!(%key, error = %e, "remote write failed"),
                }
            });
        }));
    }

    async fn refresh(self: Arc<Self>, token: String) {
        let result = self.deps.account.fetch(&token, &self.key).await;
        self.apply_refresh(result);
    }

    fn apply_refresh(&self, result: Result<Option<Value>, AccountError>) {
        let _guard = lock(&self.update_lock);
        if !self.alive.load(Ordering::Acquire) {
            debug!(key = %self.key, "refresh finished after teardown; ignored");
            return;
        }

        match result {
            Ok(Some(raw)) => match serde_json::from_value::<T>(raw) {
                Ok(_) if self.edited.load(Ordering::Acquire) => {
                    debug!(key = %self.key, "local update made during refresh kept over remote value");
                }
                Ok(remote) => {
                    save_json(self.deps.cache.as_ref(), &self.key, &remote);
                    self.value.send_replace(remote);
                }
                Err(e) => {
                    warn!(key = %self.key, error = %e, "remote value has an unexpected shape; keeping local value");
                }
            },
            Ok(None) => debug!(key = %self.key, "no remote value; keeping local value"),
            Err(e) => warn!(key = %self.key, error = %e, "remote refresh failed; keeping local value"),
        }

        self.loading.send_replace(false);
    }
}

/// A live binding to one key. Drop it (or call [`SyncedValue::close`]) to
/// tear it down.
pub struct SyncedValue<T> {
    shared: Arc<Shared<T>>,
}

impl<T> SyncedValue<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    /// Activate a binding for `key`.
    ///
    /// The starting value is the cached value for `key` when it decodes as
    /// `T`, otherwise `initial`.
    ///
    /// The binding keeps a handle to the current Tokio runtime, so later
    /// updates may be made from any thread.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn observe(key: impl Into<String>, initial: T, options: SyncOptions, deps: SyncDeps) -> Self {
        let key = key.into();
        let start = load_json::<T>(deps.cache.as_ref(), &key).unwrap_or(initial);
        let (value, _) = watch::channel(start);
        let (loading, _) = watch::channel(options.sync_on_mount);

        let shared = Arc::new(Shared {
            key,
            options,
            deps,
            runtime: Handle::current(),
            value,
            loading,
            alive: AtomicBool::new(true),
            edited: AtomicBool::new(false),
            update_lock: Mutex::new(()),
            pending: Mutex::new(None),
        });

        if options.sync_on_mount {
            match shared.deps.tokens.token() {
                Some(token) => {
                    shared.runtime.spawn(Arc::clone(&shared).refresh(token));
                }
                None => {
                    debug!(key = %shared.key, "no session token; skipping mount refresh");
                    shared.loading.send_replace(false);
                }
            }
        }

        Self { shared }
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.shared.key
    }

    /// Current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.shared.value.borrow().clone()
    }

    /// `true` until the mount refresh has settled.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        *self.shared.loading.borrow()
    }

    /// Wait until the mount refresh has settled.
    pub async fn wait_loaded(&self) {
        let mut loading = self.shared.loading.subscribe();
        let _ = loading.wait_for(|l| !*l).await;
    }

    /// Receiver notified on every value change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.shared.value.subscribe()
    }

    /// Replace the value.
    pub fn set(&self, value: T) {
        self.shared.apply(|_| value);
    }

    /// Derive the new value from the latest one. The updater must not call
    /// back into this binding's setters.
    pub fn update(&self, f: impl FnOnce(&T) -> T) {
        self.shared.apply(f);
    }

    /// Cloneable setter handle that outlives borrows of the binding. It turns
    /// into a no-op once the binding is torn down.
    #[must_use]
    pub fn setter(&self) -> Setter<T> {
        Setter { shared: Arc::clone(&self.shared) }
    }

    /// Tear the binding down.
    pub fn close(self) {}
}

impl<T> Drop for SyncedValue<T> {
    fn drop(&mut self) {
        self.shared.teardown();
    }
}

pub struct Setter<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for Setter<T> {
    fn clone(&self) -> Self {
        Self { shared: Arc::clone(&self.shared) }
    }
}

impl<T> Setter<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    pub fn set(&self, value: T) {
        self.shared.apply(|_| value);
    }

    pub fn update(&self, f: impl FnOnce(&T) -> T) {
        self.shared.apply(f);
    }
}

#[cfg(test)]
#[path = "synced_value_test.rs"]
mod tests;
