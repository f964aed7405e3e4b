//! Event parameter values and maps
//!
//! Parameters travel as a closed set of scalar (and nested) values. Every value
//! has a canonical string rendering, which is what size limits are measured
//! against and what ends up in log lines.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Parameter map attached to events, breadcrumbs and error context.
///
/// Keys are unique; iteration order is not guaranteed.
pub type ParamMap = HashMap<String, ParamValue>;

/// A single parameter value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<ParamValue>),
    Map(ParamMap),
}

impl ParamValue {
    /// Canonical string rendering of the value
    pub fn render(&self) -> String {
        self.to_string()
    }

    /// Length of the canonical rendering, in characters
    pub fn rendered_len(&self) -> usize {
        self.render().chars().count()
    }

    /// Borrow the value as a string slice when it is a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Null => f.write_str("null"),
            ParamValue::Bool(b) => write!(f, "{}", b),
            ParamValue::Int(i) => write!(f, "{}", i),
            ParamValue::Float(x) => write!(f, "{}", x),
            ParamValue::String(s) => f.write_str(s),
            ParamValue::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            ParamValue::Map(map) => {
                // Sorted so nested renderings don't depend on hash order
                let mut keys: Vec<&String> = map.keys().collect();
                keys.sort();
                f.write_str("{")?;
                for (i, key) in keys.into_iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", key, map[key])?;
                }
                f.write_str("}")
            }
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::String(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::String(value)
    }
}

impl From<&String> for ParamValue {
    fn from(value: &String) -> Self {
        ParamValue::String(value.clone())
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Float(value)
    }
}

impl From<f32> for ParamValue {
    fn from(value: f32) -> Self {
        ParamValue::Float(f64::from(value))
    }
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for ParamValue {
                fn from(value: $t) -> Self {
                    ParamValue::Int(i64::from(value))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl<T: Into<ParamValue>> From<Option<T>> for ParamValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(ParamValue::Null, Into::into)
    }
}

impl<T: Into<ParamValue>> From<Vec<T>> for ParamValue {
    fn from(values: Vec<T>) -> Self {
        ParamValue::List(values.into_iter().map(Into::into).collect())
    }
}

impl From<ParamMap> for ParamValue {
    fn from(map: ParamMap) -> Self {
        ParamValue::Map(map)
    }
}

impl From<serde_json::Value> for ParamValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => ParamValue::Null,
            serde_json::Value::Bool(b) => ParamValue::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => ParamValue::Int(i),
                // u64 beyond i64::MAX and real floats both land here
                None => ParamValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => ParamValue::String(s),
            serde_json::Value::Array(items) => {
                ParamValue::List(items.into_iter().map(ParamValue::from).collect())
            }
            serde_json::Value::Object(obj) => ParamValue::Map(
                obj.into_iter()
                    .map(|(k, v)| (k, ParamValue::from(v)))
                    .collect(),
            ),
        }
    }
}

/// Convert a JSON object into a parameter map. Non-object values yield `None`.
pub fn params_from_json(value: serde_json::Value) -> Option<ParamMap> {
    match value {
        serde_json::Value::Object(obj) => Some(
            obj.into_iter()
                .map(|(k, v)| (k, ParamValue::from(v)))
                .collect(),
        ),
        _ => None,
    }
}

/// Build a [`ParamMap`] from key/value pairs
///
/// ```
/// use hkanalytics::params;
///
/// let map = params! { "item" => "sku1", "quantity" => 2 };
/// assert_eq!(map.len(), 2);
/// ```
#[macro_export]
macro_rules! params {
    () => {
        $crate::ParamMap::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut map = $crate::ParamMap::new();
        $(
            map.insert(::std::string::String::from($key), $crate::ParamValue::from($value));
        )+
        map
    }};
}

/// Overlay `overlay` onto a copy of `base`; on key collision the overlay wins.
pub fn merge(base: &ParamMap, overlay: &ParamMap) -> ParamMap {
    let mut merged = base.clone();
    merge_into(&mut merged, overlay);
    merged
}

/// In-place form of [`merge`].
pub fn merge_into(base: &mut ParamMap, overlay: &ParamMap) {
    for (key, value) in overlay {
        base.insert(key.clone(), value.clone());
    }
}

/// Render data entries as `k1=v1, k2=v2` in map iteration order.
pub fn render_pairs(data: &ParamMap) -> String {
    data.iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join(", ")
}
