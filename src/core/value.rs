use crate::core::FieldId;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Current value of every field, in the key order of the initial snapshot.
pub type FieldValues = IndexMap<FieldId, Value>;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    None,
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<String>),
}

impl Value {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::None => true,
            Self::Text(v) => v.is_empty(),
            Self::List(v) => v.is_empty(),
            _ => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v.as_str()),
            _ => None,
        }
    }

    /// Numbers, or text that parses as one after trimming.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(v) => v.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            _ => None,
        }
    }

    /// Length used by the length-bound rules: characters for text, items for lists.
    pub fn len(&self) -> Option<usize> {
        match self {
            Self::Text(v) => Some(v.chars().count()),
            Self::List(v) => Some(v.len()),
            _ => None,
        }
    }

    /// Missing and empty values collapse to the empty string before rules see them.
    pub fn normalized(value: Option<&Value>) -> Value {
        match value {
            None | Some(Value::None) => Value::Text(String::new()),
            Some(other) => other.clone(),
        }
    }

    pub fn to_text(&self) -> String {
        match self {
            Self::None => String::new(),
            Self::Bool(b) => b.to_string(),
            Self::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    n.to_string()
                }
            }
            Self::Text(v) => v.clone(),
            Self::List(v) => v.join(", "),
        }
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

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<Vec<String>> for Value {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::None, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::Value;

    #[test]
    fn normalization_collapses_missing_and_null_to_empty_text() {
        assert_eq!(Value::normalized(None), Value::text(""));
        assert_eq!(Value::normalized(Some(&Value::None)), Value::text(""));
        assert_eq!(Value::normalized(Some(&Value::text(""))), Value::text(""));
        assert_eq!(Value::normalized(Some(&Value::Bool(false))), Value::Bool(false));
    }

    #[test]
    fn text_numbers_parse_for_numeric_rules() {
        assert_eq!(Value::text(" 42 ").as_number(), Some(42.0));
        assert_eq!(Value::text("forty").as_number(), None);
        assert_eq!(Value::Number(1.5).as_number(), Some(1.5));
        assert_eq!(Value::Bool(true).as_number(), None);
    }

    #[test]
    fn deserializes_untagged_json() {
        let values: Vec<Value> =
            serde_json::from_str(r#"[null, true, 3, "hi", ["a", "b"]]"#).expect("values");
        assert_eq!(
            values,
            vec![
                Value::None,
                Value::Bool(true),
                Value::Number(3.0),
                Value::text("hi"),
                Value::List(vec!["a".to_string(), "b".to_string()]),
            ]
        );
    }

    #[test]
    fn whole_numbers_render_without_fraction() {
        assert_eq!(Value::Number(7.0).to_text(), "7");
        assert_eq!(Value::Number(7.25).to_text(), "7.25");
    }
}
