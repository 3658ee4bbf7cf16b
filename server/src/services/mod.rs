//! Domain services used by the HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own persistence concerns behind traits so route handlers
//! stay focused on request validation and auth plumbing.

pub mod records;
pub mod session;
