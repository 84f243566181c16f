//! Facade Comprehensive Test Suite - Test Harness and Modules
//!
//! Scenario tests that drive several facades through one `Connection`, the
//! way an application would.

use std::sync::Arc;

use typedkv::{Connection, FacadeConfig, MemoryStore};

pub mod config_file;
pub mod job_queue;
pub mod key_lifecycle;
pub mod leaderboard;
pub mod profiles;
pub mod tagging;

// ============================================================================
// Test Harness Utilities
// ============================================================================

/// Connection over a fresh store, plus the store for direct inspection
pub fn connect() -> (MemoryStore, Connection) {
    connect_with(FacadeConfig::new().with_scan_count(5))
}

/// Connection over a fresh store with an explicit configuration
pub fn connect_with(config: FacadeConfig) -> (MemoryStore, Connection) {
    let store = MemoryStore::new();
    let conn = Connection::with_config(Arc::new(store.clone()), config)
        .expect("test config must be valid");
    (store, conn)
}
