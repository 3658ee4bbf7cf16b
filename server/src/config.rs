//! Server configuration parsed from environment variables.

use uuid::Uuid;

pub const DEFAULT_PORT: u16 = 3000;

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Postgres URL. `None` runs the in-memory store.
    pub database_url: Option<String>,
    pub port: u16,
    /// Session token to seed when running in memory.
    pub dev_session_token: Option<String>,
    /// Owner of the seeded dev session; random when unset or malformed.
    pub dev_user_id: Option<Uuid>,
}

impl ServerConfig {
    /// Build typed server config from environment variables.
    ///
    /// - `DATABASE_URL`: Postgres URL; in-memory storage when absent
    /// - `PORT`: listen port, default 3000
    /// - `DEV_SESSION_TOKEN`: token accepted in in-memory mode
    /// - `DEV_USER_ID`: user id bound to `DEV_SESSION_TOKEN`
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            database_url: env_non_empty("DATABASE_URL"),
            port: env_parse("PORT", DEFAULT_PORT),
            dev_session_token: env_non_empty("DEV_SESSION_TOKEN"),
            dev_user_id: env_non_empty("DEV_USER_ID").and_then(|raw| raw.parse().ok()),
        }
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
