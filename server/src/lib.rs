//! Account Data Service: authenticated per-user key/value storage over HTTP.
//!
//! The binary in `main.rs` wires configuration, storage, and the router; the
//! library exposes the same pieces so clients can run the service in-process
//! for integration tests.

pub mod config;
pub mod db;
pub mod routes;
pub mod services;
pub mod state;
