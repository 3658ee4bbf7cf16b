//! Client side of the Account Data Service.
//!
//! [`state::SyncedValue`] keeps one typed value in step between a local
//! cache and the remote store with a debounced write path;
//! [`state::SettingsMirror`] does the same for primitive settings without
//! the debounce. Both take their collaborators through [`state::SyncDeps`]:
//! an [`net::AccountData`] implementation, a [`storage::LocalCache`], and a
//! [`storage::TokenProvider`].

pub mod config;
pub mod net;
pub mod state;
pub mod storage;

#[cfg(test)]
mod test_support;

pub use config::ClientConfig;
pub use net::{AccountData, AccountError, HttpAccountData};
pub use state::{SettingValue, SettingsMirror, SyncDeps, SyncOptions, SyncedValue};
