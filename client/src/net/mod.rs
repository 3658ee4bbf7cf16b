//! Remote Account Data Service access.

pub mod account;
pub mod api;

pub use account::{AccountData, AccountError};
pub use api::HttpAccountData;
