//! Shopping List Helpers
//!
//! Small pure functions shared by the handlers and models: timestamp
//! formatting and `Location` header construction.

use axum::http::{header::HOST, HeaderMap};

/// Serde adapter writing timestamps as ISO-8601 UTC with millisecond
/// precision, e.g. `2024-05-01T09:30:00.000Z`.
pub mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

/// Builds the absolute URL of a newly created item.
///
/// The authority comes from the request's `Host` header, falling back to
/// `default_authority` (the configured bind address) when it is absent or
/// not valid UTF-8.
///
/// Example: `http://localhost:3000/shoppinglist/3`.
pub fn item_location(
    headers: &HeaderMap,
    default_authority: &str,
    collection_path: &str,
    id: &str,
) -> String {
    let authority = headers
        .get(HOST)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .unwrap_or(default_authority);

    format!(
        "http://{}{}/{}",
        authority,
        collection_path.trim_end_matches('/'),
        id
    )
}
