//! Field value types and format validation

use chrono::{DateTime, SecondsFormat, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use uuid::Uuid;

/// A polymorphic field value that can hold different types
///
/// Cells, form inputs, and pending edits all move values around as
/// `FieldValue` so the table and drawer stay agnostic of the concrete
/// record schema.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum FieldValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Uuid(Uuid),
    DateTime(DateTime<Utc>),
    Null,
}

impl FieldValue {
    /// Get the value as a string if possible
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get the value as an integer if possible
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Get the value as a boolean if possible
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Get the value as a UUID if possible
    pub fn as_uuid(&self) -> Option<Uuid> {
        match self {
            FieldValue::Uuid(u) => Some(*u),
            _ => None,
        }
    }

    /// Check if the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Order two values for column sorting
    ///
    /// Numbers compare numerically, timestamps chronologically, nulls
    /// sort first; mixed variants fall back to their string forms.
    pub fn compare(&self, other: &FieldValue) -> std::cmp::Ordering {
        use std::cmp::Ordering;

        match (self, other) {
            (FieldValue::Integer(x), FieldValue::Integer(y)) => x.cmp(y),
            (FieldValue::Float(x), FieldValue::Float(y)) => {
                x.partial_cmp(y).unwrap_or(Ordering::Equal)
            }
            (FieldValue::Integer(x), FieldValue::Float(y)) => {
                (*x as f64).partial_cmp(y).unwrap_or(Ordering::Equal)
            }
            (FieldValue::Float(x), FieldValue::Integer(y)) => {
                x.partial_cmp(&(*y as f64)).unwrap_or(Ordering::Equal)
            }
            (FieldValue::DateTime(x), FieldValue::DateTime(y)) => x.cmp(y),
            (FieldValue::Boolean(x), FieldValue::Boolean(y)) => x.cmp(y),
            (FieldValue::Null, FieldValue::Null) => Ordering::Equal,
            (FieldValue::Null, _) => Ordering::Less,
            (_, FieldValue::Null) => Ordering::Greater,
            _ => self.coerce_string().cmp(&other.coerce_string()),
        }
    }

    /// Coerce the value to its string form
    ///
    /// Select inputs are seeded with the record's current value coerced
    /// to a string; cells without a custom renderer display this form.
    /// Null coerces to the empty string.
    pub fn coerce_string(&self) -> String {
        match self {
            FieldValue::String(s) => s.clone(),
            FieldValue::Integer(i) => i.to_string(),
            FieldValue::Float(f) => f.to_string(),
            FieldValue::Boolean(b) => b.to_string(),
            FieldValue::Uuid(u) => u.to_string(),
            FieldValue::DateTime(dt) => dt.to_rfc3339_opts(SecondsFormat::Secs, true),
            FieldValue::Null => String::new(),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::String(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::String(s)
    }
}

impl From<Uuid> for FieldValue {
    fn from(u: Uuid) -> Self {
        FieldValue::Uuid(u)
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        FieldValue::Integer(i)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Boolean(b)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(dt: DateTime<Utc>) -> Self {
        FieldValue::DateTime(dt)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(FieldValue::Null)
    }
}

/// A selectable option for dropdown cells and select form fields
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Field format validators for boundary validation
#[derive(Debug, Clone)]
pub enum FieldFormat {
    Uuid,
    Url,
    Custom(Regex),
}

impl FieldFormat {
    /// Validate a field value against this format
    pub fn validate(&self, value: &FieldValue) -> bool {
        let string_value = match value.as_str() {
            Some(s) => s,
            None => return false,
        };

        match self {
            FieldFormat::Uuid => Uuid::parse_str(string_value).is_ok(),
            FieldFormat::Url => Self::is_valid_url(string_value),
            FieldFormat::Custom(regex) => regex.is_match(string_value),
        }
    }

    fn is_valid_url(url: &str) -> bool {
        static URL_REGEX: OnceLock<Regex> = OnceLock::new();
        let regex = URL_REGEX.get_or_init(|| Regex::new(r"^https?://[^\s/$.?#].[^\s]*$").unwrap());
        regex.is_match(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_value_string() {
        let value = FieldValue::String("test".to_string());
        assert_eq!(value.as_str(), Some("test"));
        assert_eq!(value.as_integer(), None);
        assert!(!value.is_null());
    }

    #[test]
    fn test_field_value_null() {
        let value = FieldValue::Null;
        assert!(value.is_null());
        assert_eq!(value.as_str(), None);
        assert_eq!(value.coerce_string(), "");
    }

    #[test]
    fn test_coerce_string() {
        assert_eq!(FieldValue::Integer(42).coerce_string(), "42");
        assert_eq!(FieldValue::Boolean(true).coerce_string(), "true");

        let id = Uuid::new_v4();
        assert_eq!(FieldValue::Uuid(id).coerce_string(), id.to_string());
    }

    #[test]
    fn test_from_option() {
        let some: FieldValue = Some("x").into();
        assert_eq!(some, FieldValue::String("x".to_string()));

        let none: FieldValue = Option::<String>::None.into();
        assert!(none.is_null());
    }

    #[test]
    fn test_uuid_format() {
        let format = FieldFormat::Uuid;
        let valid = Uuid::new_v4().to_string();

        assert!(format.validate(&FieldValue::String(valid)));
        assert!(!format.validate(&FieldValue::String("not-a-uuid".to_string())));
    }

    #[test]
    fn test_url_format() {
        let format = FieldFormat::Url;

        assert!(format.validate(&FieldValue::String("https://example.com".to_string())));
        assert!(format.validate(&FieldValue::String(
            "http://cdn.example.com/img.png?v=1".to_string()
        )));
        assert!(!format.validate(&FieldValue::String("not a url".to_string())));
    }

    #[test]
    fn test_custom_format() {
        let format = FieldFormat::Custom(Regex::new(r"^[A-Z]{3}\d{3}$").unwrap());

        assert!(format.validate(&FieldValue::String("ABC123".to_string())));
        assert!(!format.validate(&FieldValue::String("abc123".to_string())));
    }

    #[test]
    fn test_format_rejects_non_string() {
        let format = FieldFormat::Url;
        assert!(!format.validate(&FieldValue::Integer(42)));
        assert!(!format.validate(&FieldValue::Null));
    }

    #[test]
    fn test_compare_orders_numbers_and_nulls() {
        use std::cmp::Ordering;

        assert_eq!(
            FieldValue::Integer(2).compare(&FieldValue::Integer(10)),
            Ordering::Less
        );
        assert_eq!(
            FieldValue::Null.compare(&FieldValue::String("a".into())),
            Ordering::Less
        );
        assert_eq!(
            FieldValue::String("b".into()).compare(&FieldValue::String("a".into())),
            Ordering::Greater
        );
    }

    #[test]
    fn test_serde_roundtrip() {
        for original in [
            FieldValue::String("hello".to_string()),
            FieldValue::Integer(7),
            FieldValue::Boolean(false),
            FieldValue::Null,
        ] {
            let json = serde_json::to_string(&original).expect("serialize should succeed");
            let restored: FieldValue =
                serde_json::from_str(&json).expect("deserialize should succeed");
            assert_eq!(original, restored);
        }
    }
}
