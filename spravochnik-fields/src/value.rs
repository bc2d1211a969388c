//! Native cell values.

use std::cmp::Ordering;
use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::error::{FieldsError, Result};

/// Text shown for a null value, including a null foreign reference.
pub const NULL_DISPLAY: &str = "None";

/// The value of one field of one record, in its native semantic type.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Value {
    #[default]
    Null,
    Integer(i64),
    Text(String),
    Date(NaiveDate),
    Decimal(Decimal),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Integer(_) => "integer",
            Value::Text(_) => "text",
            Value::Date(_) => "date",
            Value::Decimal(_) => "decimal",
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Value::Decimal(d) => Some(*d),
            _ => None,
        }
    }

    // Setter helpers: consume the value, naming the field on mismatch.

    pub fn into_text(self, field: &str) -> Result<String> {
        match self {
            Value::Text(s) => Ok(s),
            other => Err(FieldsError::type_mismatch(field, "text", other.type_name())),
        }
    }

    pub fn into_integer(self, field: &str) -> Result<i64> {
        match self {
            Value::Integer(i) => Ok(i),
            other => Err(FieldsError::type_mismatch(field, "integer", other.type_name())),
        }
    }

    /// Integer or null, as stored by identity and reference fields.
    pub fn into_optional_integer(self, field: &str) -> Result<Option<i64>> {
        match self {
            Value::Null => Ok(None),
            Value::Integer(i) => Ok(Some(i)),
            other => Err(FieldsError::type_mismatch(field, "integer or null", other.type_name())),
        }
    }

    pub fn into_date(self, field: &str) -> Result<NaiveDate> {
        match self {
            Value::Date(d) => Ok(d),
            other => Err(FieldsError::type_mismatch(field, "date", other.type_name())),
        }
    }

    pub fn into_decimal(self, field: &str) -> Result<Decimal> {
        match self {
            Value::Decimal(d) => Ok(d),
            other => Err(FieldsError::type_mismatch(field, "decimal", other.type_name())),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Integer(_) => 1,
            Value::Decimal(_) => 2,
            Value::Date(_) => 3,
            Value::Text(_) => 4,
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Type-aware total order: null first, then by native comparison within a type.
///
/// Values of different types only meet when a column holds nulls, so the
/// cross-type rank exists to keep the order total.
impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a.cmp(b),
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            (Value::Date(a), Value::Date(b)) => a.cmp(b),
            (Value::Decimal(a), Value::Decimal(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str(NULL_DISPLAY),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Text(s) => f.write_str(s),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::Decimal(d) => write!(f, "{d}"),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<NaiveDate> for Value {
    fn from(value: NaiveDate) -> Self {
        Value::Date(value)
    }
}

impl From<Decimal> for Value {
    fn from(value: Decimal) -> Self {
        Value::Decimal(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_uses_canonical_forms() {
        assert_eq!(Value::Null.to_string(), "None");
        assert_eq!(Value::from(99).to_string(), "99");
        assert_eq!(
            Value::from(NaiveDate::from_ymd_opt(2007, 8, 8).unwrap()).to_string(),
            "2007-08-08"
        );
        assert_eq!(Value::from(Decimal::new(10010, 2)).to_string(), "100.10");
        assert_eq!(Value::from("text").to_string(), "text");
    }

    #[test]
    fn option_maps_none_to_null() {
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some(3)), Value::Integer(3));
    }

    #[test]
    fn ordering_is_type_aware() {
        // Numeric, not lexical
        assert!(Value::from(9) < Value::from(10));
        assert!(Value::from(Decimal::new(95, 1)) < Value::from(Decimal::new(10, 0)));
        assert!(
            Value::from(NaiveDate::from_ymd_opt(1999, 12, 31).unwrap())
                < Value::from(NaiveDate::from_ymd_opt(2000, 1, 1).unwrap())
        );
        assert!(Value::Null < Value::from(0));
        assert!(Value::Null < Value::from(""));
        assert_eq!(Value::Null.cmp(&Value::Null), Ordering::Equal);
    }

    #[test]
    fn into_helpers_report_mismatch() {
        assert_eq!(Value::from("a").into_text("name").unwrap(), "a");
        assert_eq!(Value::Null.into_optional_integer("id").unwrap(), None);
        let err = Value::from(1).into_text("name").unwrap_err();
        assert!(matches!(
            err,
            FieldsError::TypeMismatch {
                expected: "text",
                found: "integer",
                ..
            }
        ));
        assert!(Value::from("x").into_decimal("budget").is_err());
        assert!(Value::Null.into_date("birth_date").is_err());
    }
}
