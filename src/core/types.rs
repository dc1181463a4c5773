use serde::{Serialize, Serializer};

/// A value held by a single field of a query row.
///
/// Values are dynamically typed: the driver decides what each column
/// contains and the record stores whatever it was handed. Each variant can
/// be compared, ordered, and serialized.
#[derive(Debug, Clone, PartialEq, PartialOrd)]
pub enum Value {
    /// A 64-bit signed integer value.
    Integer(i64),

    /// A 64-bit floating point number.
    Float(f64),

    /// A UTF-8 text string.
    Text(String),

    /// A boolean value (true/false).
    Boolean(bool),

    /// Represents a NULL value (absence of data).
    Null,
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(fl) => write!(f, "{}", fl),
            Value::Text(s) => write!(f, "{}", s),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Null => write!(f, "NULL"),
        }
    }
}

impl Serialize for Value {
    /// Serializes as the plain scalar, not as a tagged enum.
    ///
    /// Non-finite floats have no JSON representation and serialize as null.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Integer(i) => serializer.serialize_i64(*i),
            Value::Float(fl) if fl.is_finite() => serializer.serialize_f64(*fl),
            Value::Float(_) => serializer.serialize_none(),
            Value::Text(s) => serializer.serialize_str(s),
            Value::Boolean(b) => serializer.serialize_bool(*b),
            Value::Null => serializer.serialize_none(),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Value::Integer(7).to_string(), "7");
        assert_eq!(Value::Text("abc".to_string()).to_string(), "abc");
        assert_eq!(Value::Boolean(false).to_string(), "false");
        assert_eq!(Value::Null.to_string(), "NULL");
    }

    #[test]
    fn test_serialize_scalars() {
        assert_eq!(serde_json::to_string(&Value::Integer(1)).unwrap(), "1");
        assert_eq!(serde_json::to_string(&Value::Float(2.5)).unwrap(), "2.5");
        assert_eq!(
            serde_json::to_string(&Value::Text("hi".to_string())).unwrap(),
            "\"hi\""
        );
        assert_eq!(serde_json::to_string(&Value::Boolean(true)).unwrap(), "true");
        assert_eq!(serde_json::to_string(&Value::Null).unwrap(), "null");
    }

    #[test]
    fn test_serialize_non_finite_float() {
        assert_eq!(serde_json::to_string(&Value::Float(f64::NAN)).unwrap(), "null");
    }

    #[test]
    fn test_from_conversions() {
        assert_eq!(Value::from(3), Value::Integer(3));
        assert_eq!(Value::from("x"), Value::Text("x".to_string()));
        assert_eq!(Value::from(true), Value::Boolean(true));
    }
}
