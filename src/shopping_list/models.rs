//! Shopping List Domain Models
//!
//! This module contains the data structures of the shopping list domain:
//! the stored [`Item`], the raw request payloads accepted by the API and the
//! validated values produced from them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use super::helpers::iso_millis;

// =============================================================================
// Constants
// =============================================================================

/// Base path of every shopping list route
pub const COLLECTION_PATH: &str = "/shoppinglist";
/// Shortest accepted item description, in characters
pub const DESCRIPTION_MIN_LEN: usize = 3;
/// Longest accepted item description, in characters
pub const DESCRIPTION_MAX_LEN: usize = 50;

// =============================================================================
// Stored Models
// =============================================================================

/// A single shopping list entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Item {
    /// Store-assigned identifier, a stringified counter value
    pub id: String,

    /// What to buy
    pub description: String,

    /// Whether the item has been bought
    pub purchased: bool,

    /// Client-supplied creation timestamp
    #[serde(with = "iso_millis")]
    pub added: DateTime<Utc>,
}

/// Response envelope for the list endpoint: `{ "_embedded": [...] }`
#[derive(Debug, Serialize, Deserialize)]
pub struct EmbeddedList<T> {
    #[serde(rename = "_embedded")]
    pub embedded: Vec<T>,
}

impl<T> From<Vec<T>> for EmbeddedList<T> {
    fn from(embedded: Vec<T>) -> Self {
        Self { embedded }
    }
}

// =============================================================================
// Request Payloads
// =============================================================================

/// A timestamp as it may appear on the wire: an ISO-8601 string or
/// milliseconds since the Unix epoch, as a number or a numeric string.
///
/// Anything else lands in `Invalid` so the validator can report it under
/// the `added` key.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum TimestampInput {
    Millis(f64),
    Text(String),
    Invalid(Value),
}

/// An item id as it may appear in a payload. Items are served with string
/// ids, so numeric strings are accepted alongside plain numbers.
///
/// Anything else lands in `Invalid` so the validator can report it under
/// the `id` key.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum IdInput {
    Number(Number),
    Text(String),
    Invalid(Value),
}

/// Body of `POST /shoppinglist`
///
/// Fields are optional here so that a missing field is reported by the
/// validator with its key rather than as an opaque decoding failure.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewItemPayload {
    pub description: Option<String>,
    pub added: Option<TimestampInput>,
}

/// Body of `POST /shoppinglist/purchased` and `POST /shoppinglist/unpurchased`:
/// a full item as previously returned by the API.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ItemPayload {
    pub id: Option<IdInput>,
    pub description: Option<String>,
    pub added: Option<TimestampInput>,
    pub purchased: Option<bool>,
}

// =============================================================================
// Validated Values
// =============================================================================

/// A creation request that passed validation
#[derive(Debug, Clone, PartialEq)]
pub struct NewItem {
    pub description: String,
    pub added: DateTime<Utc>,
}

/// A status-toggle request that passed validation
#[derive(Debug, Clone, PartialEq)]
pub struct ItemRef {
    /// Canonical string form of the referenced id
    pub id: String,
    pub description: String,
    pub added: DateTime<Utc>,
    pub purchased: bool,
}
