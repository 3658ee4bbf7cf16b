//! Shared fakes for binding tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{Map, Value};

use crate::net::{AccountData, AccountError};
use crate::state::SyncDeps;
use crate::storage::{CacheError, LocalCache, MemoryCache, SharedToken};

/// One recorded remote write.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedCall {
    pub token: String,
    pub key: String,
    pub value: Value,
}

/// In-memory [`AccountData`] that records every call.
#[derive(Default)]
pub struct MockAccount {
    pub remote: Mutex<HashMap<String, Value>>,
    pub saves: Mutex<Vec<SavedCall>>,
    pub batches: Mutex<Vec<Map<String, Value>>>,
    pub fetches: AtomicUsize,
    pub fail: AtomicBool,
    pub fetch_delay: Mutex<Duration>,
}

impl MockAccount {
    pub fn with_remote(key: &str, value: Value) -> Self {
        let account = Self::default();
        account
            .remote
            .lock()
            .unwrap()
            .insert(key.to_owned(), value);
        account
    }

    pub fn set_fetch_delay(&self, delay: Duration) {
        *self.fetch_delay.lock().unwrap() = delay;
    }

    pub fn saves(&self) -> Vec<SavedCall> {
        self.saves.lock().unwrap().clone()
    }

    pub fn batches(&self) -> Vec<Map<String, Value>> {
        self.batches.lock().unwrap().clone()
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Total remote calls of any kind.
    pub fn network_calls(&self) -> usize {
        self.fetch_count() + self.saves().len() + self.batches().len()
    }

    fn failure() -> AccountError {
        AccountError::Status { status: 503, message: "unavailable".into() }
    }
}

#[async_trait::async_trait]
impl AccountData for MockAccount {
    async fn fetch(&self, _token: &str, key: &str) -> Result<Option<Value>, AccountError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let delay = *self.fetch_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(Self::failure());
        }
        Ok(self.remote.lock().unwrap().get(key).cloned())
    }

    async fn fetch_all(&self, _token: &str) -> Result<Map<String, Value>, AccountError> {
        Ok(self.remote.lock().unwrap().clone().into_iter().collect())
    }

    async fn save(&self, token: &str, key: &str, value: &Value) -> Result<(), AccountError> {
        self.saves.lock().unwrap().push(SavedCall {
            token: token.to_owned(),
            key: key.to_owned(),
            value: value.clone(),
        });
        if self.fail.load(Ordering::SeqCst) {
            return Err(Self::failure());
        }
        self.remote
            .lock()
            .unwrap()
            .insert(key.to_owned(), value.clone());
        Ok(())
    }

    async fn save_many(&self, _token: &str, entries: &Map<String, Value>) -> Result<usize, AccountError> {
        self.batches.lock().unwrap().push(entries.clone());
        if self.fail.load(Ordering::SeqCst) {
            return Err(Self::failure());
        }
        let mut remote = self.remote.lock().unwrap();
        for (key, value) in entries {
            remote.insert(key.clone(), value.clone());
        }
        Ok(entries.len())
    }

    async fn delete(&self, _token: &str, key: &str) -> Result<(), AccountError> {
        self.remote.lock().unwrap().remove(key);
        Ok(())
    }
}

/// Cache that rejects every operation.
pub struct BrokenCache;

impl LocalCache for BrokenCache {
    fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Err(CacheError::Unavailable("storage disabled".into()))
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), CacheError> {
        Err(CacheError::Unavailable("quota exceeded".into()))
    }

    fn remove(&self, _key: &str) -> Result<(), CacheError> {
        Err(CacheError::Unavailable("storage disabled".into()))
    }
}

/// Mock account, memory cache, and switchable token wired together.
pub struct Harness {
    pub account: Arc<MockAccount>,
    pub cache: Arc<MemoryCache>,
    pub tokens: Arc<SharedToken>,
}

impl Harness {
    pub fn new(token: Option<&str>) -> Self {
        Self::with_account(MockAccount::default(), token)
    }

    pub fn with_account(account: MockAccount, token: Option<&str>) -> Self {
        Self {
            account: Arc::new(account),
            cache: Arc::new(MemoryCache::new()),
            tokens: Arc::new(SharedToken::new(token.map(str::to_owned))),
        }
    }

    pub fn deps(&self) -> SyncDeps {
        SyncDeps::new(self.account.clone(), self.cache.clone(), self.tokens.clone())
    }

    pub fn cached(&self, key: &str) -> Option<String> {
        self.cache.get(key).unwrap()
    }
}

/// Let spawned tasks run to their next suspension point.
pub async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}
