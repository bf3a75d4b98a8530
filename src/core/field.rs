//! Field value types and literal coercion

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use uuid::Uuid;

/// A polymorphic field value that can hold different types
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
    pub fn as_string(&self) -> Option<&str> {
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

    /// The declared type this value belongs to, `None` for null
    pub fn field_type(&self) -> Option<FieldType> {
        match self {
            FieldValue::String(_) => Some(FieldType::String),
            FieldValue::Integer(_) => Some(FieldType::Integer),
            FieldValue::Float(_) => Some(FieldType::Float),
            FieldValue::Boolean(_) => Some(FieldType::Boolean),
            FieldValue::Uuid(_) => Some(FieldType::Uuid),
            FieldValue::DateTime(_) => Some(FieldType::DateTime),
            FieldValue::Null => None,
        }
    }

    /// String representation used by the lexical operators
    ///
    /// Numbers print without a trailing `.0`, timestamps as RFC 3339 and
    /// UUIDs hyphenated lowercase. Null has no text form.
    pub fn to_text(&self) -> Option<String> {
        match self {
            FieldValue::String(s) => Some(s.clone()),
            FieldValue::Integer(i) => Some(i.to_string()),
            FieldValue::Float(f) => Some(f.to_string()),
            FieldValue::Boolean(b) => Some(b.to_string()),
            FieldValue::Uuid(u) => Some(u.to_string()),
            FieldValue::DateTime(dt) => Some(dt.to_rfc3339()),
            FieldValue::Null => None,
        }
    }

    /// Natural ordering between two values of the same type
    ///
    /// Integers and floats compare numerically with each other. Any other
    /// pairing, including null on either side, is not comparable.
    pub fn compare(&self, other: &FieldValue) -> Option<Ordering> {
        match (self, other) {
            (FieldValue::String(a), FieldValue::String(b)) => Some(a.cmp(b)),
            (FieldValue::Integer(a), FieldValue::Integer(b)) => Some(a.cmp(b)),
            (FieldValue::Float(a), FieldValue::Float(b)) => a.partial_cmp(b),
            (FieldValue::Integer(a), FieldValue::Float(b)) => (*a as f64).partial_cmp(b),
            (FieldValue::Float(a), FieldValue::Integer(b)) => a.partial_cmp(&(*b as f64)),
            (FieldValue::Boolean(a), FieldValue::Boolean(b)) => Some(a.cmp(b)),
            (FieldValue::Uuid(a), FieldValue::Uuid(b)) => Some(a.cmp(b)),
            (FieldValue::DateTime(a), FieldValue::DateTime(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::String(s) => write!(f, "\"{}\"", s),
            FieldValue::Null => write!(f, "null"),
            other => write!(f, "{}", other.to_text().unwrap_or_default()),
        }
    }
}

/// Declared type of a scalar entity field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    String,
    Integer,
    Float,
    Boolean,
    Uuid,
    DateTime,
}

impl FieldType {
    /// Whether the relational operators (`<`, `<=`, `>`, `>=`) apply
    pub fn is_orderable(self) -> bool {
        matches!(
            self,
            FieldType::Integer | FieldType::Float | FieldType::DateTime
        )
    }

    pub fn is_textual(self) -> bool {
        matches!(self, FieldType::String)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Integer => "integer",
            FieldType::Float => "float",
            FieldType::Boolean => "boolean",
            FieldType::Uuid => "uuid",
            FieldType::DateTime => "datetime",
        }
    }

    /// Coerce a wire literal into a value of this type
    ///
    /// Leading and trailing whitespace is ignored for every type but
    /// `String`. Timestamps accept RFC 3339 or a plain `YYYY-MM-DD` date,
    /// which is read as midnight UTC.
    pub fn parse(self, literal: &str) -> Option<FieldValue> {
        let trimmed = literal.trim();
        match self {
            FieldType::String => Some(FieldValue::String(literal.to_string())),
            FieldType::Integer => trimmed.parse().ok().map(FieldValue::Integer),
            FieldType::Float => trimmed
                .parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .map(FieldValue::Float),
            FieldType::Boolean => match trimmed.to_ascii_lowercase().as_str() {
                "true" => Some(FieldValue::Boolean(true)),
                "false" => Some(FieldValue::Boolean(false)),
                _ => None,
            },
            FieldType::Uuid => Uuid::parse_str(trimmed).ok().map(FieldValue::Uuid),
            FieldType::DateTime => parse_timestamp(trimmed).map(FieldValue::DateTime),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn parse_timestamp(literal: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(literal) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(literal, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Rust types that can back a reflectable scalar field
pub trait ScalarField {
    const FIELD_TYPE: FieldType;

    fn to_field_value(&self) -> FieldValue;
}

impl ScalarField for String {
    const FIELD_TYPE: FieldType = FieldType::String;

    fn to_field_value(&self) -> FieldValue {
        FieldValue::String(self.clone())
    }
}

impl ScalarField for i64 {
    const FIELD_TYPE: FieldType = FieldType::Integer;

    fn to_field_value(&self) -> FieldValue {
        FieldValue::Integer(*self)
    }
}

impl ScalarField for i32 {
    const FIELD_TYPE: FieldType = FieldType::Integer;

    fn to_field_value(&self) -> FieldValue {
        FieldValue::Integer(i64::from(*self))
    }
}

impl ScalarField for u32 {
    const FIELD_TYPE: FieldType = FieldType::Integer;

    fn to_field_value(&self) -> FieldValue {
        FieldValue::Integer(i64::from(*self))
    }
}

impl ScalarField for f64 {
    const FIELD_TYPE: FieldType = FieldType::Float;

    fn to_field_value(&self) -> FieldValue {
        FieldValue::Float(*self)
    }
}

impl ScalarField for bool {
    const FIELD_TYPE: FieldType = FieldType::Boolean;

    fn to_field_value(&self) -> FieldValue {
        FieldValue::Boolean(*self)
    }
}

impl ScalarField for Uuid {
    const FIELD_TYPE: FieldType = FieldType::Uuid;

    fn to_field_value(&self) -> FieldValue {
        FieldValue::Uuid(*self)
    }
}

impl ScalarField for DateTime<Utc> {
    const FIELD_TYPE: FieldType = FieldType::DateTime;

    fn to_field_value(&self) -> FieldValue {
        FieldValue::DateTime(*self)
    }
}

impl<T: ScalarField> ScalarField for Option<T> {
    const FIELD_TYPE: FieldType = T::FIELD_TYPE;

    fn to_field_value(&self) -> FieldValue {
        match self {
            Some(value) => value.to_field_value(),
            None => FieldValue::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_field_value_string() {
        let value = FieldValue::String("test".to_string());
        assert_eq!(value.as_string(), Some("test"));
        assert_eq!(value.as_integer(), None);
        assert!(!value.is_null());
    }

    #[test]
    fn test_field_value_null() {
        let value = FieldValue::Null;
        assert!(value.is_null());
        assert_eq!(value.to_text(), None);
        assert_eq!(value.field_type(), None);
    }

    #[test]
    fn test_to_text_numbers() {
        assert_eq!(FieldValue::Integer(42).to_text().as_deref(), Some("42"));
        assert_eq!(
            FieldValue::Float(600000.0).to_text().as_deref(),
            Some("600000")
        );
        assert_eq!(FieldValue::Float(2.5).to_text().as_deref(), Some("2.5"));
        assert_eq!(FieldValue::Boolean(true).to_text().as_deref(), Some("true"));
    }

    #[test]
    fn test_compare_same_type() {
        let a = FieldValue::Integer(1);
        let b = FieldValue::Integer(2);
        assert_eq!(a.compare(&b), Some(Ordering::Less));

        let a = FieldValue::String("b".into());
        let b = FieldValue::String("a".into());
        assert_eq!(a.compare(&b), Some(Ordering::Greater));
    }

    #[test]
    fn test_compare_mixed_numbers() {
        let a = FieldValue::Integer(3);
        let b = FieldValue::Float(2.5);
        assert_eq!(a.compare(&b), Some(Ordering::Greater));
        assert_eq!(b.compare(&a), Some(Ordering::Less));
    }

    #[test]
    fn test_compare_incompatible() {
        assert_eq!(
            FieldValue::Integer(1).compare(&FieldValue::String("1".into())),
            None
        );
        assert_eq!(FieldValue::Null.compare(&FieldValue::Null), None);
    }

    #[test]
    fn test_parse_numbers() {
        assert_eq!(
            FieldType::Integer.parse(" 500000 "),
            Some(FieldValue::Integer(500000))
        );
        assert_eq!(FieldType::Integer.parse("5.5"), None);
        assert_eq!(
            FieldType::Float.parse("500000"),
            Some(FieldValue::Float(500000.0))
        );
        assert_eq!(FieldType::Float.parse("cheap"), None);
        assert_eq!(FieldType::Float.parse("NaN"), None);
    }

    #[test]
    fn test_parse_timestamps() {
        let midnight = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        assert_eq!(
            FieldType::DateTime.parse("2024-03-01"),
            Some(FieldValue::DateTime(midnight))
        );
        assert_eq!(
            FieldType::DateTime.parse("2024-03-01T00:00:00Z"),
            Some(FieldValue::DateTime(midnight))
        );
        assert_eq!(FieldType::DateTime.parse("yesterday"), None);
    }

    #[test]
    fn test_parse_string_keeps_whitespace() {
        assert_eq!(
            FieldType::String.parse(" Park "),
            Some(FieldValue::String(" Park ".into()))
        );
    }

    #[test]
    fn test_orderable_types() {
        assert!(FieldType::Integer.is_orderable());
        assert!(FieldType::Float.is_orderable());
        assert!(FieldType::DateTime.is_orderable());
        assert!(!FieldType::String.is_orderable());
        assert!(!FieldType::Boolean.is_orderable());
        assert!(!FieldType::Uuid.is_orderable());
    }

    #[test]
    fn test_scalar_field_option() {
        let none: Option<String> = None;
        assert_eq!(none.to_field_value(), FieldValue::Null);
        assert_eq!(<Option<i64> as ScalarField>::FIELD_TYPE, FieldType::Integer);
    }

    #[test]
    fn test_serde_roundtrip_integer() {
        let original = FieldValue::Integer(42);
        let json = serde_json::to_string(&original).expect("serialize should succeed");
        let restored: FieldValue =
            serde_json::from_str(&json).expect("deserialize should succeed");
        assert_eq!(original, restored);
    }
}
