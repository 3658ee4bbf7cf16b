//! Client configuration parsed from environment variables.

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:3000";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_DEBOUNCE_MS: u64 = 1000;

const CACHE_FILE_NAME: &str = "local-cache.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    /// Quiet period before a synced value is written remotely.
    pub debounce: Duration,
    /// Location of the file-backed local cache, if one could be resolved.
    pub cache_path: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            cache_path: default_cache_path(),
        }
    }
}

impl ClientConfig {
    /// Build typed client config from environment variables.
    ///
    /// - `ACCOUNT_DATA_URL`: service base URL
    /// - `ACCOUNT_DATA_TIMEOUT_SECS`: request timeout, default 10
    /// - `ACCOUNT_DATA_CONNECT_TIMEOUT_SECS`: connect timeout, default 5
    /// - `SYNC_DEBOUNCE_MS`: remote write debounce, default 1000
    /// - `ACCOUNT_DATA_CACHE_PATH`: local cache file; platform data dir when absent
    #[must_use]
    pub fn from_env() -> Self {
        let base_url = std::env::var("ACCOUNT_DATA_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_owned())
            .trim_end_matches('/')
            .to_owned();
        let cache_path = std::env::var("ACCOUNT_DATA_CACHE_PATH")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .or_else(default_cache_path);

        Self {
            base_url,
            request_timeout: Duration::from_secs(env_parse("ACCOUNT_DATA_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)),
            connect_timeout: Duration::from_secs(env_parse(
                "ACCOUNT_DATA_CONNECT_TIMEOUT_SECS",
                DEFAULT_CONNECT_TIMEOUT_SECS,
            )),
            debounce: Duration::from_millis(env_parse("SYNC_DEBOUNCE_MS", DEFAULT_DEBOUNCE_MS)),
            cache_path,
        }
    }
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

/// Per-user data directory location for the cache file.
#[must_use]
pub fn default_cache_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "accountdata").map(|dirs| dirs.data_local_dir().join(CACHE_FILE_NAME))
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
