use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// The conversion capability of a payload type, resolved once when a
/// [`ReactiveValue`](crate::ReactiveValue) is constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Integer,
    Real,
    Boolean,
    Text,
    /// No built-in conversion. Text and JSON go through caller supplied functions.
    Custom,
}

impl ValueKind {
    /// Whether values of this kind are JSON primitives as-is.
    pub const fn is_json_primitive(self) -> bool {
        !matches!(self, ValueKind::Custom)
    }
}

impl Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Integer => "integer",
            ValueKind::Real => "real",
            ValueKind::Boolean => "boolean",
            ValueKind::Text => "text",
            ValueKind::Custom => "custom",
        };
        f.write_str(name)
    }
}

/// A JSON value that needs no custom serialization.
///
/// # Examples
/// ```
/// use reactivate::JsonPrimitive;
///
/// let p = JsonPrimitive::try_from(serde_json::json!(42)).unwrap();
/// assert_eq!(JsonPrimitive::Integer(42), p);
///
/// assert!(JsonPrimitive::try_from(serde_json::json!([1, 2])).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JsonPrimitive {
    Integer(i64),
    Real(f64),
    Boolean(bool),
    Text(String),
}

impl JsonPrimitive {
    pub const fn kind(&self) -> ValueKind {
        match self {
            JsonPrimitive::Integer(_) => ValueKind::Integer,
            JsonPrimitive::Real(_) => ValueKind::Real,
            JsonPrimitive::Boolean(_) => ValueKind::Boolean,
            JsonPrimitive::Text(_) => ValueKind::Text,
        }
    }
}

/// Returns `true` iff `value` is an integer, a real number, a boolean or a string.
///
/// # Examples
/// ```
/// use reactivate::is_primitive_json_value;
/// use serde_json::json;
///
/// assert!(is_primitive_json_value(&json!("hi")));
/// assert!(is_primitive_json_value(&json!(1.5)));
/// assert!(!is_primitive_json_value(&json!(null)));
/// assert!(!is_primitive_json_value(&json!({ "a": 1 })));
/// ```
pub fn is_primitive_json_value(value: &Value) -> bool {
    matches!(value, Value::Number(_) | Value::Bool(_) | Value::String(_))
}

impl TryFrom<Value> for JsonPrimitive {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Bool(b) => Ok(JsonPrimitive::Boolean(b)),
            Value::String(s) => Ok(JsonPrimitive::Text(s)),
            Value::Number(ref n) => match n.as_i64() {
                Some(i) => Ok(JsonPrimitive::Integer(i)),
                None => match n.as_f64() {
                    Some(f) => Ok(JsonPrimitive::Real(f)),
                    None => Err(Error::UnsupportedJsonValue(value)),
                },
            },
            other => Err(Error::UnsupportedJsonValue(other)),
        }
    }
}

impl From<JsonPrimitive> for Value {
    fn from(primitive: JsonPrimitive) -> Self {
        match primitive {
            JsonPrimitive::Integer(i) => Value::from(i),
            // NaN and infinities have no JSON representation
            JsonPrimitive::Real(f) => serde_json::Number::from_f64(f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            JsonPrimitive::Boolean(b) => Value::Bool(b),
            JsonPrimitive::Text(s) => Value::String(s),
        }
    }
}

impl From<i64> for JsonPrimitive {
    fn from(value: i64) -> Self {
        JsonPrimitive::Integer(value)
    }
}

impl From<f64> for JsonPrimitive {
    fn from(value: f64) -> Self {
        JsonPrimitive::Real(value)
    }
}

impl From<bool> for JsonPrimitive {
    fn from(value: bool) -> Self {
        JsonPrimitive::Boolean(value)
    }
}

impl From<String> for JsonPrimitive {
    fn from(value: String) -> Self {
        JsonPrimitive::Text(value)
    }
}

impl From<&str> for JsonPrimitive {
    fn from(value: &str) -> Self {
        JsonPrimitive::Text(value.to_owned())
    }
}

/// Payload types with built-in text and JSON conversions.
///
/// Implemented for every std integer type, `f32`, `f64`, `bool` and `String`.
pub trait Primitive: Clone + PartialEq + 'static {
    const KIND: ValueKind;

    /// Parses `text` into a value.
    /// `Ok(None)` means the text was tolerated but carries no value.
    fn parse_text(text: &str) -> Result<Option<Self>>;

    fn format_text(&self) -> String;

    fn to_json(&self) -> JsonPrimitive;

    /// `None` if `value` cannot be represented in `Self`.
    fn from_json(value: &JsonPrimitive) -> Option<Self>;
}

const TRUE_TOKENS: [&str; 3] = ["true", "1", "yes"];
const FALSE_TOKENS: [&str; 3] = ["false", "0", "no"];

impl Primitive for bool {
    const KIND: ValueKind = ValueKind::Boolean;

    fn parse_text(text: &str) -> Result<Option<Self>> {
        let token = text.to_ascii_lowercase();
        if TRUE_TOKENS.contains(&token.as_str()) {
            Ok(Some(true))
        } else if FALSE_TOKENS.contains(&token.as_str()) {
            Ok(Some(false))
        } else {
            Ok(None)
        }
    }

    fn format_text(&self) -> String {
        self.to_string()
    }

    fn to_json(&self) -> JsonPrimitive {
        JsonPrimitive::Boolean(*self)
    }

    fn from_json(value: &JsonPrimitive) -> Option<Self> {
        match value {
            JsonPrimitive::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

impl Primitive for String {
    const KIND: ValueKind = ValueKind::Text;

    fn parse_text(text: &str) -> Result<Option<Self>> {
        Ok(Some(text.to_owned()))
    }

    fn format_text(&self) -> String {
        self.clone()
    }

    fn to_json(&self) -> JsonPrimitive {
        JsonPrimitive::Text(self.clone())
    }

    fn from_json(value: &JsonPrimitive) -> Option<Self> {
        match value {
            JsonPrimitive::Text(s) => Some(s.clone()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case("true", Some(true))]
    #[case("TRUE", Some(true))]
    #[case("Yes", Some(true))]
    #[case("1", Some(true))]
    #[case("false", Some(false))]
    #[case("No", Some(false))]
    #[case("0", Some(false))]
    #[case("maybe", None)]
    #[case("", None)]
    fn bool_tokens(#[case] text: &str, #[case] expected: Option<bool>) {
        assert_eq!(expected, bool::parse_text(text).unwrap());
    }

    #[test]
    fn integer_parse_failure_keeps_source() {
        let err = i32::parse_text("4x2").unwrap_err();
        match err {
            Error::Parse { text, kind, source } => {
                assert_eq!("4x2", text);
                assert_eq!(ValueKind::Integer, kind);
                assert!(source.downcast_ref::<std::num::ParseIntError>().is_some());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn real_parse_failure_keeps_source() {
        let err = f64::parse_text("pi").unwrap_err();
        assert!(matches!(err, Error::Parse { kind: ValueKind::Real, .. }));
    }

    #[test]
    fn unsigned_out_of_i64_range_becomes_real() {
        assert_eq!(JsonPrimitive::Real(u64::MAX as f64), u64::MAX.to_json());
        assert_eq!(JsonPrimitive::Integer(7), 7u64.to_json());
    }

    #[test]
    fn integer_from_json_checks_range() {
        assert_eq!(Some(200u8), u8::from_json(&JsonPrimitive::Integer(200)));
        assert_eq!(None, u8::from_json(&JsonPrimitive::Integer(300)));
        assert_eq!(None, i32::from_json(&JsonPrimitive::Real(1.5)));
    }

    #[test]
    fn real_accepts_json_integers() {
        assert_eq!(Some(3.0), f64::from_json(&JsonPrimitive::Integer(3)));
        assert_eq!(None, f64::from_json(&JsonPrimitive::Text("3".into())));
    }

    #[test]
    fn json_value_conversions() {
        assert_eq!(
            JsonPrimitive::Real(2.5),
            JsonPrimitive::try_from(json!(2.5)).unwrap()
        );
        assert_eq!(
            JsonPrimitive::Text("hi".into()),
            JsonPrimitive::try_from(json!("hi")).unwrap()
        );
        assert!(matches!(
            JsonPrimitive::try_from(json!(null)),
            Err(Error::UnsupportedJsonValue(Value::Null))
        ));

        assert_eq!(json!(true), Value::from(JsonPrimitive::Boolean(true)));
        assert_eq!(Value::Null, Value::from(JsonPrimitive::Real(f64::NAN)));
    }

    #[test]
    fn json_primitive_serializes_untagged() {
        let values = vec![
            JsonPrimitive::Integer(1),
            JsonPrimitive::Real(0.5),
            JsonPrimitive::Boolean(false),
            JsonPrimitive::Text("x".into()),
        ];
        let text = serde_json::to_string(&values).unwrap();
        assert_eq!(r#"[1,0.5,false,"x"]"#, text);

        let parsed: Vec<JsonPrimitive> = serde_json::from_str(&text).unwrap();
        assert_eq!(values, parsed);
    }
}
