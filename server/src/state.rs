//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds the record store and the session lookup as trait objects so the
//! same router runs against Postgres in production and memory in tests.

use std::sync::Arc;

use sqlx::PgPool;

use crate::services::records::{MemoryRecordStore, PgRecordStore, RecordStore};
use crate::services::session::{MemorySessionStore, PgSessionStore, SessionStore};

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; all inner fields are Arc-wrapped.
#[derive(Clone)]
pub struct AppState {
    pub records: Arc<dyn RecordStore>,
    pub sessions: Arc<dyn SessionStore>,
}

impl AppState {
    #[must_use]
    pub fn new(records: Arc<dyn RecordStore>, sessions: Arc<dyn SessionStore>) -> Self {
        Self { records, sessions }
    }

    /// State backed by a migrated Postgres pool.
    #[must_use]
    pub fn postgres(pool: PgPool) -> Self {
        Self::new(Arc::new(PgRecordStore::new(pool.clone())), Arc::new(PgSessionStore::new(pool)))
    }

    /// State backed by process memory. Returns the session store so callers
    /// can register tokens.
    #[must_use]
    pub fn in_memory() -> (Self, Arc<MemorySessionStore>) {
        let sessions = Arc::new(MemorySessionStore::new());
        let state = Self::new(Arc::new(MemoryRecordStore::new()), sessions.clone());
        (state, sessions)
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
