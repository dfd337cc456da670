//! Loosely typed values exchanged with the host
//!
//! The host hands style payloads over as string-keyed maps whose values may
//! be of any type. [`StyleValue`] models that payload; [`StyleMap`] is the
//! map itself. JSON conversions let a JSON-speaking host use the same codec.

use crate::color::Color;
use std::collections::BTreeMap;

/// Untyped string-keyed mapping used at the host boundary
pub type StyleMap = BTreeMap<String, StyleValue>;

/// A single loosely typed transport value
#[derive(Debug, Clone, PartialEq)]
pub enum StyleValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    /// Native color handed over without any encoding
    Color(Color),
    List(Vec<StyleValue>),
    Map(StyleMap),
}

impl StyleValue {
    /// Short type name, used in diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            StyleValue::Null => "null",
            StyleValue::Bool(_) => "bool",
            StyleValue::Int(_) => "int",
            StyleValue::Float(_) => "float",
            StyleValue::String(_) => "string",
            StyleValue::Color(_) => "color",
            StyleValue::List(_) => "list",
            StyleValue::Map(_) => "map",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, StyleValue::Null)
    }

    /// Numeric view of the value; ints widen to `f64`
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            StyleValue::Int(i) => Some(*i as f64),
            StyleValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Convert to JSON
    ///
    /// Native colors have no JSON form, so they leave as `#AARRGGBB`
    /// strings, which decode back to the same color. Non-finite floats
    /// become `null`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            StyleValue::Null => serde_json::Value::Null,
            StyleValue::Bool(b) => serde_json::Value::Bool(*b),
            StyleValue::Int(i) => serde_json::Value::from(*i),
            StyleValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            StyleValue::String(s) => serde_json::Value::String(s.clone()),
            StyleValue::Color(c) => serde_json::Value::String(c.to_hex_argb()),
            StyleValue::List(items) => {
                serde_json::Value::Array(items.iter().map(StyleValue::to_json).collect())
            }
            StyleValue::Map(map) => serde_json::Value::Object(map_to_json(map)),
        }
    }
}

impl From<&serde_json::Value> for StyleValue {
    fn from(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => StyleValue::Null,
            serde_json::Value::Bool(b) => StyleValue::Bool(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => StyleValue::Int(i),
                // u64 beyond i64 range and all fractional numbers land here
                None => n.as_f64().map(StyleValue::Float).unwrap_or(StyleValue::Null),
            },
            serde_json::Value::String(s) => StyleValue::String(s.clone()),
            serde_json::Value::Array(items) => {
                StyleValue::List(items.iter().map(StyleValue::from).collect())
            }
            serde_json::Value::Object(map) => StyleValue::Map(map_from_json(map)),
        }
    }
}

impl From<serde_json::Value> for StyleValue {
    fn from(value: serde_json::Value) -> Self {
        StyleValue::from(&value)
    }
}

impl From<bool> for StyleValue {
    fn from(b: bool) -> Self {
        StyleValue::Bool(b)
    }
}

impl From<i64> for StyleValue {
    fn from(i: i64) -> Self {
        StyleValue::Int(i)
    }
}

impl From<i32> for StyleValue {
    fn from(i: i32) -> Self {
        StyleValue::Int(i64::from(i))
    }
}

impl From<f64> for StyleValue {
    fn from(f: f64) -> Self {
        StyleValue::Float(f)
    }
}

impl From<&str> for StyleValue {
    fn from(s: &str) -> Self {
        StyleValue::String(s.to_string())
    }
}

impl From<String> for StyleValue {
    fn from(s: String) -> Self {
        StyleValue::String(s)
    }
}

impl From<Color> for StyleValue {
    fn from(c: Color) -> Self {
        StyleValue::Color(c)
    }
}

impl<T: Into<StyleValue>> From<Option<T>> for StyleValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(StyleValue::Null)
    }
}

/// Convert a JSON object into a [`StyleMap`]
pub fn map_from_json(object: &serde_json::Map<String, serde_json::Value>) -> StyleMap {
    object
        .iter()
        .map(|(key, value)| (key.clone(), StyleValue::from(value)))
        .collect()
}

/// Convert a [`StyleMap`] into a JSON object
pub fn map_to_json(map: &StyleMap) -> serde_json::Map<String, serde_json::Value> {
    map.iter()
        .map(|(key, value)| (key.clone(), value.to_json()))
        .collect()
}
