//! Query parameters and their query-string serialization.
//!
//! # Design
//! Parameters are an ordered list of scalar values so serialization is
//! deterministic: insertion order is output order, `Null` renders as an
//! empty value (`key=`) rather than being dropped, and an empty list renders
//! as nothing at all. Keys and values are escaped with the same rules as
//! JavaScript's `encodeURIComponent`.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::{Number, Value};

use crate::error::PalError;

/// Everything except the unreserved marks of `encodeURIComponent`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// A single scalar parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryValue {
    String(String),
    Number(Number),
    Bool(bool),
    Null,
}

impl QueryValue {
    /// Text form of the value before escaping.
    pub fn as_text(&self) -> String {
        match self {
            QueryValue::String(s) => s.clone(),
            QueryValue::Number(n) => number_text(n),
            QueryValue::Bool(b) => b.to_string(),
            QueryValue::Null => String::new(),
        }
    }
}

/// Integral floats print without a fractional part (`2.0` → `2`).
fn number_text(n: &Number) -> String {
    if n.is_i64() || n.is_u64() {
        return n.to_string();
    }
    match n.as_f64() {
        Some(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e21 => format!("{f:.0}"),
        _ => n.to_string(),
    }
}

impl From<&str> for QueryValue {
    fn from(v: &str) -> Self {
        QueryValue::String(v.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(v: String) -> Self {
        QueryValue::String(v)
    }
}

impl From<bool> for QueryValue {
    fn from(v: bool) -> Self {
        QueryValue::Bool(v)
    }
}

impl From<i64> for QueryValue {
    fn from(v: i64) -> Self {
        QueryValue::Number(v.into())
    }
}

impl From<i32> for QueryValue {
    fn from(v: i32) -> Self {
        QueryValue::Number(v.into())
    }
}

impl From<u64> for QueryValue {
    fn from(v: u64) -> Self {
        QueryValue::Number(v.into())
    }
}

impl From<f64> for QueryValue {
    fn from(v: f64) -> Self {
        Number::from_f64(v).map_or(QueryValue::Null, QueryValue::Number)
    }
}

impl<T: Into<QueryValue>> From<Option<T>> for QueryValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(QueryValue::Null, Into::into)
    }
}

impl TryFrom<&Value> for QueryValue {
    type Error = PalError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::Null => Ok(QueryValue::Null),
            Value::Bool(b) => Ok(QueryValue::Bool(*b)),
            Value::Number(n) => Ok(QueryValue::Number(n.clone())),
            Value::String(s) => Ok(QueryValue::String(s.clone())),
            Value::Array(_) | Value::Object(_) => Err(PalError::invalid(
                "Query parameter values must be strings, numbers, booleans or null",
            )),
        }
    }
}

/// Ordered query parameters with unique keys.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParams {
    items: Vec<(String, QueryValue)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Builder form of `insert`.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Set `key`. An existing key keeps its position and takes the new value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<QueryValue>) {
        let key = key.into();
        let value = value.into();
        match self.items.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.items.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&QueryValue> {
        self.items.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &QueryValue)> {
        self.items.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Convert a JSON object of scalars, keeping the object's key order.
    pub fn from_json(value: &Value) -> Result<Self, PalError> {
        let object = value
            .as_object()
            .ok_or_else(|| PalError::invalid("Query parameters must be a JSON object"))?;
        object
            .iter()
            .map(|(k, v)| QueryValue::try_from(v).map(|v| (k.clone(), v)))
            .collect()
    }

    /// The parameters as a JSON object, for methods that send them as a body.
    pub fn to_json(&self) -> Value {
        let object = self
            .items
            .iter()
            .map(|(k, v)| {
                let v = match v {
                    QueryValue::String(s) => Value::String(s.clone()),
                    QueryValue::Number(n) => Value::Number(n.clone()),
                    QueryValue::Bool(b) => Value::Bool(*b),
                    QueryValue::Null => Value::Null,
                };
                (k.clone(), v)
            })
            .collect();
        Value::Object(object)
    }

    /// Render as `?k=v&k2=v2`, or an empty string when there are no entries.
    pub fn to_query_string(&self) -> String {
        if self.items.is_empty() {
            return String::new();
        }
        let pairs: Vec<String> = self
            .items
            .iter()
            .map(|(k, v)| format!("{}={}", encode_component(k), encode_component(&v.as_text())))
            .collect();
        format!("?{}", pairs.join("&"))
    }
}

impl<K: Into<String>, V: Into<QueryValue>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut params = QueryParams::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}

/// Escape one key or value the way `encodeURIComponent` does.
pub fn encode_component(input: &str) -> String {
    utf8_percent_encode(input, URI_COMPONENT).to_string()
}
