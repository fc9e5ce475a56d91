//! Shopping List State Management
//!
//! This module holds the application state handed to every handler: the
//! item store and the server configuration.

use super::store::Store;
use crate::config::ServerConfig;
use chrono::Utc;
use std::sync::Arc;

// =============================================================================
// Application State
// =============================================================================

/// Shared application state that can be safely passed between threads
pub type SharedState = Arc<AppState>;

/// Core application state containing the shopping list
#[derive(Debug)]
pub struct AppState {
    /// In-memory storage for items. Locks internally.
    pub store: Store,

    /// Settings the handlers need at request time (bind address for URLs)
    pub config: ServerConfig,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(ServerConfig::default())
    }
}

impl AppState {
    /// Creates the state for a fresh process, seeding the starter items when
    /// the configuration asks for them.
    pub fn new(config: ServerConfig) -> Self {
        let store = if config.seed_items {
            Store::seeded(Utc::now())
        } else {
            Store::new()
        };

        tracing::debug!(items = store.len(), "Initialized shopping list");

        Self::with_store(store, config)
    }

    /// Creates the state around an existing store
    pub fn with_store(store: Store, config: ServerConfig) -> Self {
        Self { store, config }
    }
}
