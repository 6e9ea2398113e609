use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// A single dataset cell
///
/// Columns are dynamically typed, so every cell carries its own tag. Coercion
/// into the text or numeric feature paths happens explicitly through
/// [`Value::as_text`] and [`Value::as_number`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Text(String),
    #[default]
    Missing,
}

impl Value {
    #[inline]
    #[must_use]
    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    #[inline]
    #[must_use]
    pub fn is_number(&self) -> bool {
        matches!(self, Value::Number(_))
    }

    /// Text form of the cell. Missing cells coerce to an empty string.
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            Value::Text(s) => Cow::Borrowed(s.as_str()),
            Value::Number(n) => Cow::Owned(n.to_string()),
            Value::Missing => Cow::Borrowed(""),
        }
    }

    /// Numeric form of the cell, `None` for missing or unparseable values.
    /// Non-finite numbers count as missing.
    pub fn as_number(&self) -> Option<f64> {
        let n = match self {
            Value::Number(n) => *n,
            Value::Text(s) => s.trim().parse::<f64>().ok()?,
            Value::Missing => return None,
        };
        n.is_finite().then_some(n)
    }

    /// Convert a JSON cell into a tagged value
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Missing,
            serde_json::Value::Bool(b) => Value::Text(b.to_string()),
            serde_json::Value::Number(n) => n.as_f64().map(Value::Number).unwrap_or(Value::Missing),
            serde_json::Value::String(s) => Value::Text(s.clone()),
            other => Value::Text(other.to_string()),
        }
    }

    /// Parse a raw CSV cell: blank is missing, a finite number is numeric,
    /// anything else is kept as text
    pub fn from_csv_cell(cell: &str) -> Self {
        let trimmed = cell.trim();
        if trimmed.is_empty() {
            return Value::Missing;
        }
        match trimmed.parse::<f64>() {
            Ok(n) if n.is_finite() => Value::Number(n),
            _ => Value::Text(cell.to_string()),
        }
    }

    /// JSON form used when rendering result tables
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Number(n) => serde_json::Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Text(s) => serde_json::Value::String(s.clone()),
            Value::Missing => serde_json::Value::Null,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Missing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_coercion() {
        assert_eq!(Value::from("Heat").as_text(), "Heat");
        assert_eq!(Value::from(2010.0).as_text(), "2010");
        assert_eq!(Value::from(7.5).as_text(), "7.5");
        assert_eq!(Value::Missing.as_text(), "");
    }

    #[test]
    fn test_number_coercion() {
        assert_eq!(Value::from(3.0).as_number(), Some(3.0));
        assert_eq!(Value::from(" 4.25 ").as_number(), Some(4.25));
        assert_eq!(Value::from("n/a").as_number(), None);
        assert_eq!(Value::from("NaN").as_number(), None);
        assert_eq!(Value::Missing.as_number(), None);
    }

    #[test]
    fn test_json_mapping() {
        assert_eq!(Value::from_json(&json!(null)), Value::Missing);
        assert_eq!(Value::from_json(&json!(12)), Value::Number(12.0));
        assert_eq!(Value::from_json(&json!("x")), Value::Text("x".to_string()));
        assert_eq!(Value::from_json(&json!(true)), Value::Text("true".to_string()));
        assert_eq!(Value::from_json(&json!(["a", "b"])), Value::Text("[\"a\",\"b\"]".to_string()));
    }

    #[test]
    fn test_to_json() {
        assert_eq!(Value::Number(1.5).to_json(), json!(1.5));
        assert_eq!(Value::Missing.to_json(), json!(null));
        assert_eq!(Value::from("a").to_json(), json!("a"));
    }
}
