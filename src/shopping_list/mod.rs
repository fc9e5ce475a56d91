//! Shopping List Domain Module
//!
//! This module contains all shopping list business logic, including:
//! - Domain models (Item, request payloads, response envelope)
//! - Request validation and the extractors that run it
//! - The in-memory item store and application state
//! - REST API handlers

pub mod handlers;
pub mod helpers;
pub mod models;
pub mod state;
pub mod store;
pub mod validation;

// Re-export commonly used types for convenience
pub use handlers::routes;
pub use state::{AppState, SharedState};
pub use store::{Store, StoreError};
