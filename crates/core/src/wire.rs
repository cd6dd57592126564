//! JSON wire schema with dual field naming.
//!
//! Different server versions name fields either in Go's exported style
//! (`ID`, `FirstName`, `CreatedAt`) or in snake_case (`id`, `first_name`,
//! `created_at`). Each entity declares its fields as [`Field`] pairs and
//! decodes through [`WireReader`], which resolves a field in two passes:
//! the capitalized name first, then the snake_case name. A JSON `null` counts
//! as absent in both passes.
//!
//! Scalars are coerced leniently: ids and integers may arrive as numbers or
//! numeric strings, prices as numbers or decimal strings, timestamps as
//! RFC 3339, naive ISO-8601 date-times (taken as UTC) or bare dates.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;
use serde_json::{Map, Value};

/// Errors produced while decoding an entity from JSON.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum WireError {
    /// The payload is not a JSON object.
    #[error("{entity} payload is not a JSON object")]
    NotAnObject {
        /// Entity being decoded.
        entity: &'static str,
    },
    /// A required field is absent under both names.
    #[error("{entity} is missing field `{field}`")]
    MissingField {
        /// Entity being decoded.
        entity: &'static str,
        /// snake_case name of the field.
        field: &'static str,
    },
    /// A field is present but cannot be coerced to its type.
    #[error("{entity} field `{field}` is invalid: {reason}")]
    InvalidField {
        /// Entity being decoded.
        entity: &'static str,
        /// snake_case name of the field.
        field: &'static str,
        /// What went wrong.
        reason: String,
    },
}

/// Field naming convention for encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WireNaming {
    /// `first_name`, `created_at`. What this client sends.
    #[default]
    SnakeCase,
    /// `FirstName`, `CreatedAt`.
    Capitalized,
}

/// A field's two accepted names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub snake: &'static str,
    pub capitalized: &'static str,
}

impl Field {
    #[must_use]
    pub const fn new(snake: &'static str, capitalized: &'static str) -> Self {
        Self { snake, capitalized }
    }

    /// The name used under `naming`.
    #[must_use]
    pub const fn name(self, naming: WireNaming) -> &'static str {
        match naming {
            WireNaming::SnakeCase => self.snake,
            WireNaming::Capitalized => self.capitalized,
        }
    }
}

/// An entity with an explicit JSON wire schema.
pub trait WireRecord: Sized {
    /// Decode from either naming convention.
    ///
    /// # Errors
    ///
    /// Returns [`WireError`] if the payload is not an object, a required
    /// field is missing, or a field cannot be coerced.
    fn from_wire(value: &Value) -> Result<Self, WireError>;

    /// Encode using the given naming convention.
    fn to_wire(&self, naming: WireNaming) -> Value;
}

/// Two-pass field reader over a JSON object.
#[derive(Debug, Clone, Copy)]
pub struct WireReader<'a> {
    entity: &'static str,
    map: &'a Map<String, Value>,
}

impl<'a> WireReader<'a> {
    /// Wrap `value`, which must be a JSON object.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::NotAnObject`] for any other JSON value.
    pub fn new(entity: &'static str, value: &'a Value) -> Result<Self, WireError> {
        value
            .as_object()
            .map(|map| Self { entity, map })
            .ok_or(WireError::NotAnObject { entity })
    }

    /// Resolve a field: capitalized name first, then snake_case.
    #[must_use]
    pub fn lookup(&self, field: Field) -> Option<&'a Value> {
        let present = |name: &str| self.map.get(name).filter(|v| !v.is_null());
        present(field.capitalized).or_else(|| present(field.snake))
    }

    fn required(&self, field: Field) -> Result<&'a Value, WireError> {
        self.lookup(field).ok_or(WireError::MissingField {
            entity: self.entity,
            field: field.snake,
        })
    }

    fn invalid(&self, field: Field, reason: impl Into<String>) -> WireError {
        WireError::InvalidField {
            entity: self.entity,
            field: field.snake,
            reason: reason.into(),
        }
    }

    /// # Errors
    ///
    /// Missing or non-integer field.
    pub fn required_i64(&self, field: Field) -> Result<i64, WireError> {
        let value = self.required(field)?;
        coerce_i64(value).ok_or_else(|| self.invalid(field, format!("expected integer, got {value}")))
    }

    /// # Errors
    ///
    /// Missing or non-integer field.
    pub fn required_id<I: From<i64>>(&self, field: Field) -> Result<I, WireError> {
        self.required_i64(field).map(I::from)
    }

    /// # Errors
    ///
    /// Missing or non-string field.
    pub fn required_string(&self, field: Field) -> Result<String, WireError> {
        let value = self.required(field)?;
        coerce_string(value).ok_or_else(|| self.invalid(field, format!("expected string, got {value}")))
    }

    /// # Errors
    ///
    /// Present but not a string.
    pub fn optional_string(&self, field: Field) -> Result<Option<String>, WireError> {
        self.lookup(field)
            .map(|value| {
                coerce_string(value)
                    .ok_or_else(|| self.invalid(field, format!("expected string, got {value}")))
            })
            .transpose()
    }

    /// # Errors
    ///
    /// Missing or non-decimal field.
    pub fn required_decimal(&self, field: Field) -> Result<Decimal, WireError> {
        let value = self.required(field)?;
        coerce_decimal(value).ok_or_else(|| self.invalid(field, format!("expected decimal, got {value}")))
    }

    /// # Errors
    ///
    /// Missing or non-boolean field.
    pub fn required_bool(&self, field: Field) -> Result<bool, WireError> {
        let value = self.required(field)?;
        coerce_bool(value).ok_or_else(|| self.invalid(field, format!("expected boolean, got {value}")))
    }

    /// # Errors
    ///
    /// Missing field or unparseable timestamp.
    pub fn required_timestamp(&self, field: Field) -> Result<DateTime<Utc>, WireError> {
        let value = self.required(field)?;
        coerce_timestamp(value)
            .ok_or_else(|| self.invalid(field, format!("expected ISO-8601 timestamp, got {value}")))
    }

    /// # Errors
    ///
    /// Present but unparseable timestamp.
    pub fn optional_timestamp(&self, field: Field) -> Result<Option<DateTime<Utc>>, WireError> {
        self.lookup(field)
            .map(|value| {
                coerce_timestamp(value).ok_or_else(|| {
                    self.invalid(field, format!("expected ISO-8601 timestamp, got {value}"))
                })
            })
            .transpose()
    }
}

/// Builds a JSON object under one naming convention.
#[derive(Debug, Clone, Default)]
pub struct WireWriter {
    naming: WireNaming,
    map: Map<String, Value>,
}

impl WireWriter {
    #[must_use]
    pub fn new(naming: WireNaming) -> Self {
        Self {
            naming,
            map: Map::new(),
        }
    }

    /// Set `field` to `value`.
    #[must_use]
    pub fn put(mut self, field: Field, value: impl Into<Value>) -> Self {
        self.map.insert(field.name(self.naming).to_owned(), value.into());
        self
    }

    /// Set `field` only when `value` is `Some`.
    #[must_use]
    pub fn put_opt<V: Into<Value>>(self, field: Field, value: Option<V>) -> Self {
        match value {
            Some(value) => self.put(field, value),
            None => self,
        }
    }

    #[must_use]
    pub fn finish(self) -> Value {
        Value::Object(self.map)
    }

}

/// Encode a decimal as a JSON number carrying every digit of `amount`.
#[must_use]
pub fn decimal_value(amount: Decimal) -> Value {
    let text = amount.to_string();
    serde_json::Number::from_str(&text).map_or(Value::String(text), Value::Number)
}

/// Encode a timestamp as RFC 3339 in UTC.
#[must_use]
pub fn timestamp_value(at: DateTime<Utc>) -> Value {
    Value::String(at.to_rfc3339_opts(SecondsFormat::AutoSi, true))
}

/// Parse an id or integer that may be a number or a numeric string.
#[must_use]
pub fn coerce_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0)
                .and_then(|f| format!("{f:.0}").parse().ok())
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn coerce_string(value: &Value) -> Option<String> {
    value.as_str().map(str::to_owned)
}

fn coerce_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => Decimal::from_str(&n.to_string())
            .or_else(|_| Decimal::from_scientific(&n.to_string()))
            .ok(),
        Value::String(s) => Decimal::from_str(s.trim()).ok(),
        _ => None,
    }
}

fn coerce_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_i64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn coerce_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    let raw = value.as_str()?.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Some(at.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    const NAME: Field = Field::new("first_name", "FirstName");

    #[test]
    fn test_lookup_prefers_capitalized_then_snake() {
        let both = json!({"FirstName": "Ada", "first_name": "Grace"});
        let reader = WireReader::new("user", &both).unwrap();
        assert_eq!(reader.required_string(NAME).unwrap(), "Ada");

        let snake_only = json!({"first_name": "Grace"});
        let reader = WireReader::new("user", &snake_only).unwrap();
        assert_eq!(reader.required_string(NAME).unwrap(), "Grace");
    }

    #[test]
    fn test_null_capitalized_falls_through_to_snake() {
        let value = json!({"FirstName": null, "first_name": "Grace"});
        let reader = WireReader::new("user", &value).unwrap();
        assert_eq!(reader.required_string(NAME).unwrap(), "Grace");
    }

    #[test]
    fn test_missing_field_names_snake_case() {
        let value = json!({});
        let reader = WireReader::new("user", &value).unwrap();
        assert_eq!(
            reader.required_string(NAME),
            Err(WireError::MissingField {
                entity: "user",
                field: "first_name"
            })
        );
        assert_eq!(reader.optional_string(NAME), Ok(None));
    }

    #[test]
    fn test_non_object_payload() {
        assert!(matches!(
            WireReader::new("product", &json!([1, 2])),
            Err(WireError::NotAnObject { entity: "product" })
        ));
    }

    #[test]
    fn test_integer_coercion() {
        assert_eq!(coerce_i64(&json!(7)), Some(7));
        assert_eq!(coerce_i64(&json!("7")), Some(7));
        assert_eq!(coerce_i64(&json!(7.0)), Some(7));
        assert_eq!(coerce_i64(&json!(7.5)), None);
        assert_eq!(coerce_i64(&json!(true)), None);
    }

    #[test]
    fn test_decimal_coercion() {
        assert_eq!(coerce_decimal(&json!(19.99)), Decimal::from_str("19.99").ok());
        assert_eq!(coerce_decimal(&json!("19.99")), Decimal::from_str("19.99").ok());
        assert_eq!(coerce_decimal(&json!(3)), Some(Decimal::from(3)));
        assert_eq!(coerce_decimal(&json!("abc")), None);
    }

    #[test]
    fn test_bool_coercion() {
        assert_eq!(coerce_bool(&json!(true)), Some(true));
        assert_eq!(coerce_bool(&json!("FALSE")), Some(false));
        assert_eq!(coerce_bool(&json!(1)), Some(true));
        assert_eq!(coerce_bool(&json!("yes")), None);
    }

    #[test]
    fn test_timestamp_formats() {
        let expected = "2024-03-01T10:30:00Z".parse::<DateTime<Utc>>().unwrap();
        assert_eq!(coerce_timestamp(&json!("2024-03-01T10:30:00Z")), Some(expected));
        assert_eq!(coerce_timestamp(&json!("2024-03-01T12:30:00+02:00")), Some(expected));
        assert_eq!(coerce_timestamp(&json!("2024-03-01T10:30:00")), Some(expected));
        assert_eq!(
            coerce_timestamp(&json!("2024-03-01")),
            "2024-03-01T00:00:00Z".parse::<DateTime<Utc>>().ok()
        );
        assert_eq!(coerce_timestamp(&json!("yesterday")), None);
    }

    #[test]
    fn test_writer_uses_requested_naming() {
        let snake = WireWriter::new(WireNaming::SnakeCase).put(NAME, "Ada").finish();
        assert_eq!(snake, json!({"first_name": "Ada"}));

        let capitalized = WireWriter::new(WireNaming::Capitalized)
            .put(NAME, "Ada")
            .put_opt::<String>(Field::new("last_name", "LastName"), None)
            .finish();
        assert_eq!(capitalized, json!({"FirstName": "Ada"}));
    }

    #[test]
    fn test_decimal_value_round_trips_through_coercion() {
        let price = Decimal::from_str("1234.56").unwrap();
        assert_eq!(coerce_decimal(&decimal_value(price)), Some(price));
    }

    #[test]
    fn test_decimal_value_keeps_every_digit() {
        let price = Decimal::from_str("1234567890.123456789").unwrap();
        let value = decimal_value(price);
        assert!(value.is_number());
        assert_eq!(value.to_string(), "1234567890.123456789");
        assert_eq!(coerce_decimal(&value), Some(price));
    }
}
