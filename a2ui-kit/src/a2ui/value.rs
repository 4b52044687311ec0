//! A2UI Value Types
//!
//! Component properties are "dynamic values": a JSON literal, a binding to a
//! data model path, or a function call descriptor.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Legacy literal wrapper keys, e.g. `{"literalString": "Hello"}`.
const LEGACY_LITERAL_KEYS: [&str; 4] = [
    "literalString",
    "literalNumber",
    "literalBoolean",
    "literalArray",
];

/// A property value that can be a literal, a data-bound path, or a function call.
///
/// # Examples
///
/// ```json
/// "Hello World"
/// {"literalString": "Hello World"}
/// {"path": "/user/name"}
/// {"call": "formatDate", "args": {"value": {"path": "/now"}}}
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum DynamicValue {
    /// A literal JSON value, returned as-is
    Literal(Value),
    /// A path reference to the data model, absolute or relative
    Path(String),
    /// A client-side function call
    FunctionCall(FunctionCall),
}

/// A function call descriptor: `{"call": name, "args": {...}, "returnType": ...}`.
///
/// Evaluation is not implemented; resolving one yields the descriptor itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionCall {
    pub call: String,
    #[serde(default)]
    pub args: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_type: Option<String>,
}

impl DynamicValue {
    /// Create a literal value
    pub fn literal(value: impl Into<Value>) -> Self {
        DynamicValue::Literal(value.into())
    }

    /// Create a path reference
    pub fn path(p: impl Into<String>) -> Self {
        DynamicValue::Path(p.into())
    }

    /// Classify a raw property value.
    pub fn from_json(raw: &Value) -> Self {
        let Value::Object(map) = raw else {
            return DynamicValue::Literal(raw.clone());
        };

        if let Some(Value::String(path)) = map.get("path") {
            return DynamicValue::Path(path.clone());
        }

        if let Some(literal) = LEGACY_LITERAL_KEYS.iter().find_map(|key| map.get(*key)) {
            return DynamicValue::Literal(literal.clone());
        }

        if matches!(map.get("call"), Some(Value::String(_))) {
            if let Ok(call) = serde_json::from_value::<FunctionCall>(raw.clone()) {
                return DynamicValue::FunctionCall(call);
            }
        }

        DynamicValue::Literal(raw.clone())
    }

    /// Serialize back to the wire form
    pub fn to_json(&self) -> Value {
        match self {
            DynamicValue::Literal(value) => value.clone(),
            DynamicValue::Path(path) => serde_json::json!({ "path": path }),
            DynamicValue::FunctionCall(call) => {
                serde_json::to_value(call).unwrap_or(Value::Null)
            }
        }
    }

    /// Check if this is a literal value
    pub fn is_literal(&self) -> bool {
        matches!(self, DynamicValue::Literal(_))
    }

    /// Check if this is a path reference
    pub fn is_path(&self) -> bool {
        matches!(self, DynamicValue::Path(_))
    }

    /// Get the path if this is a path reference
    pub fn as_path(&self) -> Option<&str> {
        match self {
            DynamicValue::Path(path) => Some(path),
            _ => None,
        }
    }

    /// Get the literal if this is a literal value
    pub fn as_literal(&self) -> Option<&Value> {
        match self {
            DynamicValue::Literal(value) => Some(value),
            _ => None,
        }
    }
}

impl Default for DynamicValue {
    fn default() -> Self {
        DynamicValue::Literal(Value::Null)
    }
}

impl From<Value> for DynamicValue {
    fn from(raw: Value) -> Self {
        DynamicValue::from_json(&raw)
    }
}

impl Serialize for DynamicValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for DynamicValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(|raw| DynamicValue::from_json(&raw))
    }
}

/// Coerce a resolved value to a display string.
///
/// Strings pass through, numbers and booleans are formatted, null is empty.
pub fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => Some(String::new()),
        _ => None,
    }
}
