//! Local persistence: the device cache and session token providers.

pub mod cache;
pub mod token;

pub use cache::{CacheError, FileCache, LocalCache, MemoryCache, load_json, save_json};
pub use token::{CachedToken, SharedToken, StaticToken, TOKEN_CACHE_KEY, TokenProvider};
