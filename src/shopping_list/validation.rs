//! Request validation
//!
//! Raw payloads are decoded into the structs in [`super::models`] and then
//! checked field by field. The [`ValidatedJson`] and [`ItemId`] extractors
//! run these checks before a handler body executes, so handlers only ever
//! see validated values.

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
    Json,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};

use super::models::{
    IdInput, ItemPayload, ItemRef, NewItem, NewItemPayload, TimestampInput, DESCRIPTION_MAX_LEN,
    DESCRIPTION_MIN_LEN,
};
use crate::error::AppError;

/// Which part of the request failed validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationSource {
    Payload,
    Params,
}

/// A request that does not match the expected shape
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    /// Serialized as `validation.source` in the 400 body
    pub location: ValidationSource,
    /// Offending field names; empty when the body could not be decoded at all
    pub keys: Vec<String>,
    pub message: String,
}

impl ValidationError {
    /// A body or path segment that could not be decoded into the expected type
    pub fn malformed(location: ValidationSource, message: impl Into<String>) -> Self {
        Self {
            location,
            keys: Vec::new(),
            message: message.into(),
        }
    }

    /// An `{id}` path segment that is not a number
    pub fn non_numeric_id() -> Self {
        Self {
            location: ValidationSource::Params,
            keys: vec!["id".to_string()],
            message: "\"id\" must be a number".to_string(),
        }
    }
}

/// Accumulates per-field failures for one request
struct Violations {
    location: ValidationSource,
    failures: Vec<(&'static str, String)>,
}

impl Violations {
    fn new(location: ValidationSource) -> Self {
        Self {
            location,
            failures: Vec::new(),
        }
    }

    fn add(&mut self, key: &'static str, reason: impl Into<String>) {
        self.failures.push((key, reason.into()));
    }

    /// Unwraps a field check, recording the failure under `key`
    fn check<T>(&mut self, key: &'static str, result: Result<T, String>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(reason) => {
                self.add(key, reason);
                None
            }
        }
    }

    fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    fn into_error(self) -> ValidationError {
        let message = self
            .failures
            .iter()
            .map(|(key, reason)| format!("\"{key}\" {reason}"))
            .collect::<Vec<_>>()
            .join("; ");

        ValidationError {
            location: self.location,
            keys: self.failures.into_iter().map(|(k, _)| k.to_string()).collect(),
            message,
        }
    }
}

/// Converts a decoded payload into its validated form
pub trait Validate {
    type Output;

    fn validate(self) -> Result<Self::Output, ValidationError>;
}

impl Validate for NewItemPayload {
    type Output = NewItem;

    fn validate(self) -> Result<NewItem, ValidationError> {
        let mut violations = Violations::new(ValidationSource::Payload);

        let description = violations.check("description", validate_description(self.description));
        let added = violations.check("added", validate_added(self.added));

        match (description, added) {
            (Some(description), Some(added)) if violations.is_clean() => {
                Ok(NewItem { description, added })
            }
            _ => Err(violations.into_error()),
        }
    }
}

impl Validate for ItemPayload {
    type Output = ItemRef;

    fn validate(self) -> Result<ItemRef, ValidationError> {
        let mut violations = Violations::new(ValidationSource::Payload);

        let description = violations.check("description", validate_description(self.description));
        let added = violations.check("added", validate_added(self.added));
        let id = violations.check("id", validate_payload_id(self.id));
        let purchased = violations.check("purchased", self.purchased.ok_or_else(required));

        match (id, description, added, purchased) {
            (Some(id), Some(description), Some(added), Some(purchased))
                if violations.is_clean() =>
            {
                Ok(ItemRef {
                    id,
                    description,
                    added,
                    purchased,
                })
            }
            _ => Err(violations.into_error()),
        }
    }
}

fn required() -> String {
    "is required".to_string()
}

/// Checks the description length, counted in characters
pub fn validate_description(description: Option<String>) -> Result<String, String> {
    let description = description.ok_or_else(required)?;
    let len = description.chars().count();

    if len < DESCRIPTION_MIN_LEN {
        return Err(format!("length must be at least {DESCRIPTION_MIN_LEN} characters long"));
    }
    if len > DESCRIPTION_MAX_LEN {
        return Err(format!(
            "length must be less than or equal to {DESCRIPTION_MAX_LEN} characters long"
        ));
    }
    Ok(description)
}

fn validate_added(added: Option<TimestampInput>) -> Result<DateTime<Utc>, String> {
    parse_timestamp(&added.ok_or_else(required)?)
        .ok_or_else(|| "must be a number of milliseconds or valid date string".to_string())
}

/// Interprets epoch milliseconds (a number or a numeric string) or an
/// ISO-8601 string: full timestamp, timestamp without offset read as UTC,
/// or bare date at midnight UTC.
pub fn parse_timestamp(input: &TimestampInput) -> Option<DateTime<Utc>> {
    match input {
        TimestampInput::Millis(millis) => from_epoch_millis(*millis),
        TimestampInput::Text(text) => {
            let text = text.trim();
            if let Ok(millis) = text.parse::<f64>() {
                return from_epoch_millis(millis);
            }
            if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
                return Some(dt.with_timezone(&Utc));
            }
            if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
                return Some(naive.and_utc());
            }
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .map(|naive| naive.and_utc())
        }
        TimestampInput::Invalid(_) => None,
    }
}

// Fractional milliseconds are truncated; out-of-range values yield `None`.
fn from_epoch_millis(millis: f64) -> Option<DateTime<Utc>> {
    if !millis.is_finite() || millis.abs() > i64::MAX as f64 {
        return None;
    }
    DateTime::from_timestamp_millis(millis.trunc() as i64)
}

fn validate_payload_id(id: Option<IdInput>) -> Result<String, String> {
    let canonical = match id.ok_or_else(required)? {
        IdInput::Number(n) => Some(canonical_number(&n)),
        IdInput::Text(text) => parse_item_id(&text),
        IdInput::Invalid(_) => None,
    };
    canonical.ok_or_else(|| "must be a number".to_string())
}

/// Canonical lookup key for a numeric id: `"007"`, `"7.0"` and `7` all
/// become `"7"`. Negative or fractional values keep their numeric form
/// (`"-1"`, `"1.5"`) and simply match no item. `None` if `raw` is not a
/// finite number.
pub fn parse_item_id(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if let Ok(n) = raw.parse::<u64>() {
        return Some(n.to_string());
    }
    raw.parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .map(canonical_float)
}

fn canonical_number(n: &serde_json::Number) -> String {
    match n.as_u64() {
        Some(n) => n.to_string(),
        None => n.as_f64().map(canonical_float).unwrap_or_else(|| n.to_string()),
    }
}

fn canonical_float(n: f64) -> String {
    if n.fract() == 0.0 && (0.0..=u64::MAX as f64).contains(&n) {
        (n as u64).to_string()
    } else {
        n.to_string()
    }
}

// =============================================================================
// Extractors
// =============================================================================

/// JSON body extractor that decodes `T` and validates it.
///
/// Rejects with a 400 [`AppError::Validation`] on malformed JSON, a wrong
/// content type, unknown fields or a failed field check.
pub struct ValidatedJson<T: Validate>(pub T::Output);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(payload) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| {
                ValidationError::malformed(ValidationSource::Payload, rejection.body_text())
            })?;

        Ok(Self(payload.validate()?))
    }
}

/// The `{id}` path segment of an item route, canonicalized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemId(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for ItemId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                ValidationError::malformed(ValidationSource::Params, rejection.body_text())
            })?;

        parse_item_id(&raw)
            .map(ItemId)
            .ok_or_else(|| ValidationError::non_numeric_id().into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn new_item_payload(value: serde_json::Value) -> NewItemPayload {
        serde_json::from_value(value).unwrap()
    }

    fn item_payload(value: serde_json::Value) -> ItemPayload {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn accepts_valid_new_item() {
        let item = new_item_payload(json!({
            "description": "Buy milk",
            "added": "2024-02-03T04:05:06.789Z"
        }))
        .validate()
        .unwrap();

        assert_eq!(item.description, "Buy milk");
        let second = Utc.with_ymd_and_hms(2024, 2, 3, 4, 5, 6).unwrap();
        assert_eq!(item.added.timestamp(), second.timestamp());
        assert_eq!(item.added.timestamp_subsec_millis(), 789);
    }

    #[test]
    fn description_length_bounds_are_inclusive() {
        for len in [3, 50] {
            let description = "x".repeat(len);
            assert_eq!(validate_description(Some(description.clone())), Ok(description));
        }
        assert!(validate_description(Some("ab".into())).is_err());
        assert!(validate_description(Some("x".repeat(51))).is_err());
        // Counted in characters, not bytes.
        assert!(validate_description(Some("äöü".into())).is_ok());
    }

    #[test]
    fn reports_every_failing_key() {
        let err = new_item_payload(json!({ "description": "no" }))
            .validate()
            .unwrap_err();

        assert_eq!(err.location, ValidationSource::Payload);
        assert_eq!(err.keys, vec!["description", "added"]);
        assert!(err.message.contains("\"added\" is required"));
    }

    #[test]
    fn error_displays_its_message() {
        let err = ValidationError::non_numeric_id();

        assert_eq!(err.to_string(), "\"id\" must be a number");
        assert_eq!(err.location, ValidationSource::Params);
        assert_eq!(err.keys, vec!["id"]);
    }

    #[test]
    fn unknown_fields_are_rejected_at_decoding() {
        let decoded = serde_json::from_value::<NewItemPayload>(json!({
            "description": "Buy milk",
            "added": "2024-01-01",
            "id": "9"
        }));
        assert!(decoded.is_err());
    }

    #[test]
    fn timestamps_accept_dates_and_epoch_millis() {
        let midnight = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

        assert_eq!(
            parse_timestamp(&TimestampInput::Text("2024-01-01".into())),
            Some(midnight)
        );
        assert_eq!(
            parse_timestamp(&TimestampInput::Text("2024-01-01T00:00:00".into())),
            Some(midnight)
        );
        assert_eq!(
            parse_timestamp(&TimestampInput::Millis(midnight.timestamp_millis() as f64)),
            Some(midnight)
        );
        assert_eq!(parse_timestamp(&TimestampInput::Text("yesterday".into())), None);
    }

    #[test]
    fn timestamps_accept_float_and_string_millis() {
        let midnight = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

        let item = new_item_payload(json!({ "description": "Buy milk", "added": 1.7e12 }))
            .validate()
            .unwrap();
        assert_eq!(item.added.timestamp_millis(), 1_700_000_000_000);

        assert_eq!(
            parse_timestamp(&TimestampInput::Text("1704067200000".into())),
            Some(midnight)
        );
        assert_eq!(
            parse_timestamp(&TimestampInput::Millis(1704067200000.9)),
            Some(midnight)
        );
        assert_eq!(parse_timestamp(&TimestampInput::Millis(f64::MAX)), None);
    }

    #[test]
    fn wrongly_typed_added_is_reported_under_its_key() {
        let err = new_item_payload(json!({ "description": "Buy milk", "added": true }))
            .validate()
            .unwrap_err();

        assert_eq!(err.keys, vec!["added"]);
    }

    #[test]
    fn item_payload_accepts_string_or_numeric_id() {
        let base = json!({
            "description": "Buy Hairspray",
            "added": "2024-01-01T10:00:00.000Z",
            "purchased": true
        });

        let mut with_string = base.clone();
        with_string["id"] = json!("2");
        assert_eq!(item_payload(with_string).validate().unwrap().id, "2");

        let mut with_number = base.clone();
        with_number["id"] = json!(2);
        assert_eq!(item_payload(with_number).validate().unwrap().id, "2");

        let mut with_float = base.clone();
        with_float["id"] = json!(2.0);
        assert_eq!(item_payload(with_float).validate().unwrap().id, "2");

        let mut with_negative = base.clone();
        with_negative["id"] = json!(-1);
        assert_eq!(item_payload(with_negative).validate().unwrap().id, "-1");

        let mut with_word = base.clone();
        with_word["id"] = json!("two");
        let err = item_payload(with_word).validate().unwrap_err();
        assert_eq!(err.keys, vec!["id"]);

        let mut with_object = base;
        with_object["id"] = json!({ "value": 2 });
        let err = item_payload(with_object).validate().unwrap_err();
        assert_eq!(err.keys, vec!["id"]);
        assert_eq!(err.message, "\"id\" must be a number");
    }

    #[test]
    fn item_payload_requires_purchased_flag() {
        let err = item_payload(json!({
            "id": 1,
            "description": "Buy Beer!",
            "added": "2024-01-01"
        }))
        .validate()
        .unwrap_err();

        assert_eq!(err.keys, vec!["purchased"]);
    }

    #[test]
    fn item_ids_are_canonicalized() {
        assert_eq!(parse_item_id("007"), Some("7".to_string()));
        assert_eq!(parse_item_id("12"), Some("12".to_string()));
        assert_eq!(parse_item_id("1.0"), Some("1".to_string()));
        assert_eq!(parse_item_id("-1"), Some("-1".to_string()));
        assert_eq!(parse_item_id("1.5"), Some("1.5".to_string()));
        assert_eq!(parse_item_id("abc"), None);
        assert_eq!(parse_item_id("inf"), None);
    }
}
