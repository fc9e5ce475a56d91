//! Shopping List Library
//!
//! This library provides an in-memory shopping list served over a small
//! JSON HTTP API: list items, fetch one, create one and toggle its
//! purchased status.

// Domain modules
pub mod shopping_list;

// Infrastructure
pub mod config;
pub mod error;
pub mod router;
