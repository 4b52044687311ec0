//! A2UI Property Schemas
//!
//! A small schema language for component properties. The same schema is used
//! to check incoming properties and to publish the capability manifest, where
//! shared shapes become `$ref`s into `common_types.json`. Values are checked
//! against a shared shape by evaluating its published definition.

use std::fmt;

use indexmap::IndexMap;
use serde_json::{Map, Value, json};

/// Document that holds the shared definitions.
pub const COMMON_TYPES_DOCUMENT: &str = "common_types.json";

/// Shared property shapes, published by reference instead of inlined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommonType {
    ComponentId,
    ChildList,
    DataBinding,
    DynamicValue,
    DynamicString,
    DynamicNumber,
    DynamicBoolean,
    DynamicStringList,
    FunctionCall,
    LogicExpression,
    CheckRule,
    Checkable,
    Action,
    Weight,
}

impl CommonType {
    pub const ALL: [CommonType; 14] = [
        CommonType::ComponentId,
        CommonType::ChildList,
        CommonType::DataBinding,
        CommonType::DynamicValue,
        CommonType::DynamicString,
        CommonType::DynamicNumber,
        CommonType::DynamicBoolean,
        CommonType::DynamicStringList,
        CommonType::FunctionCall,
        CommonType::LogicExpression,
        CommonType::CheckRule,
        CommonType::Checkable,
        CommonType::Action,
        CommonType::Weight,
    ];

    /// Definition name under `$defs`
    pub fn name(self) -> &'static str {
        match self {
            CommonType::ComponentId => "ComponentId",
            CommonType::ChildList => "ChildList",
            CommonType::DataBinding => "DataBinding",
            CommonType::DynamicValue => "DynamicValue",
            CommonType::DynamicString => "DynamicString",
            CommonType::DynamicNumber => "DynamicNumber",
            CommonType::DynamicBoolean => "DynamicBoolean",
            CommonType::DynamicStringList => "DynamicStringList",
            CommonType::FunctionCall => "FunctionCall",
            CommonType::LogicExpression => "LogicExpression",
            CommonType::CheckRule => "CheckRule",
            CommonType::Checkable => "Checkable",
            CommonType::Action => "Action",
            CommonType::Weight => "Weight",
        }
    }

    /// e.g. `common_types.json#/$defs/DynamicString`
    pub fn reference(self) -> String {
        format!("{}#/$defs/{}", COMMON_TYPES_DOCUMENT, self.name())
    }

    /// Look up a type by its definition name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|common| common.name() == name)
    }

    /// Whether `value` conforms to this type's published [`definition`](Self::definition).
    pub fn accepts(self, value: &Value) -> bool {
        conforms(&self.definition(), value)
    }

    /// JSON Schema definition published in the shared document
    pub fn definition(self) -> Value {
        let binding = json!({"$ref": "#/$defs/DataBinding"});
        let call = json!({"$ref": "#/$defs/FunctionCall"});
        match self {
            CommonType::ComponentId => json!({
                "type": "string",
                "description": "The unique identifier for a component."
            }),
            CommonType::ChildList => json!({"oneOf": [
                {
                    "type": "array",
                    "items": {"$ref": "#/$defs/ComponentId"},
                    "description": "A static list of child component IDs."
                },
                child_template("A template for generating a dynamic list of children."),
                {
                    "type": "object",
                    "description": "Legacy static list of child component IDs.",
                    "properties": {"explicitList": {
                        "type": "array",
                        "items": {"$ref": "#/$defs/ComponentId"}
                    }},
                    "required": ["explicitList"]
                },
                {
                    "type": "object",
                    "description": "Legacy wrapper around a child template.",
                    "properties": {"template": child_template("The wrapped template.")},
                    "required": ["template"]
                }
            ]}),
            CommonType::DataBinding => json!({
                "type": "object",
                "properties": {"path": {
                    "type": "string",
                    "description": "A JSON Pointer path to a value in the data model."
                }},
                "required": ["path"]
            }),
            CommonType::DynamicValue => json!({"oneOf": [
                {"type": "string"}, {"type": "number"}, {"type": "boolean"}, binding, call,
                legacy_literal("literalString", json!({"type": "string"})),
                legacy_literal("literalNumber", json!({"type": "number"})),
                legacy_literal("literalBoolean", json!({"type": "boolean"})),
                legacy_literal("literalArray", json!({"type": "array", "items": {"type": "string"}}))
            ]}),
            CommonType::DynamicString => json!({"oneOf": [
                {"type": "string"}, binding, call,
                legacy_literal("literalString", json!({"type": "string"}))
            ]}),
            CommonType::DynamicNumber => json!({"oneOf": [
                {"type": "number"}, binding, call,
                legacy_literal("literalNumber", json!({"type": "number"}))
            ]}),
            CommonType::DynamicBoolean => json!({"oneOf": [
                {"type": "boolean"}, binding, {"$ref": "#/$defs/LogicExpression"},
                legacy_literal("literalBoolean", json!({"type": "boolean"}))
            ]}),
            CommonType::DynamicStringList => json!({"oneOf": [
                {"type": "array", "items": {"type": "string"}}, binding, call,
                legacy_literal("literalArray", json!({"type": "array", "items": {"type": "string"}}))
            ]}),
            CommonType::FunctionCall => json!({
                "type": "object",
                "properties": {
                    "call": {"type": "string", "description": "The name of the function to call."},
                    "args": {"type": "object", "description": "Arguments passed to the function."},
                    "returnType": {
                        "type": "string",
                        "enum": ["string", "number", "boolean", "array", "object", "any", "void"],
                        "default": "boolean"
                    }
                },
                "required": ["call"]
            }),
            CommonType::LogicExpression => json!({"oneOf": [
                {"type": "object", "properties": {"and": {"type": "array", "minItems": 1, "items": {"$ref": "#/$defs/LogicExpression"}}}, "required": ["and"]},
                {"type": "object", "properties": {"or": {"type": "array", "minItems": 1, "items": {"$ref": "#/$defs/LogicExpression"}}}, "required": ["or"]},
                {"type": "object", "properties": {"not": {"$ref": "#/$defs/LogicExpression"}}, "required": ["not"]},
                call,
                {"type": "object", "properties": {"true": {"const": true}}, "required": ["true"]},
                {"type": "object", "properties": {"false": {"const": false}}, "required": ["false"]}
            ]}),
            CommonType::CheckRule => json!({"allOf": [
                {"$ref": "#/$defs/LogicExpression"},
                {
                    "type": "object",
                    "properties": {"message": {
                        "type": "string",
                        "description": "The error message to display if the check fails."
                    }},
                    "required": ["message"]
                }
            ]}),
            CommonType::Checkable => json!({
                "type": "object",
                "properties": {"checks": {
                    "type": "array",
                    "items": {"$ref": "#/$defs/CheckRule"},
                    "description": "A list of checks to perform."
                }}
            }),
            CommonType::Action => json!({"oneOf": [
                {
                    "type": "object",
                    "description": "Triggers a server-side event.",
                    "properties": {"event": {
                        "type": "object",
                        "properties": {
                            "name": {"type": "string"},
                            "context": {"type": "object", "additionalProperties": {"$ref": "#/$defs/DynamicValue"}}
                        },
                        "required": ["name"]
                    }},
                    "required": ["event"]
                },
                {
                    "type": "object",
                    "description": "Executes a local client-side function.",
                    "properties": {"functionCall": call},
                    "required": ["functionCall"]
                },
                {
                    "type": "object",
                    "description": "Legacy server-side event named at the top level.",
                    "properties": {"name": {"type": "string"}},
                    "required": ["name"]
                }
            ]}),
            CommonType::Weight => json!({
                "type": "number",
                "description": "The relative weight of this component within a Row or Column."
            }),
        }
    }
}

/// `{"<key>": <literal>}`, the pre-0.9 way of writing a literal value.
fn legacy_literal(key: &str, literal: Value) -> Value {
    let mut properties = Map::new();
    properties.insert(key.to_string(), literal);
    json!({
        "type": "object",
        "description": "Legacy literal wrapper.",
        "properties": properties,
        "required": [key]
    })
}

/// `{componentId, path}`, or `dataBinding` in place of `path` for legacy streams.
fn child_template(description: &str) -> Value {
    json!({
        "type": "object",
        "description": description,
        "properties": {
            "componentId": {"$ref": "#/$defs/ComponentId"},
            "path": {"type": "string"},
            "dataBinding": {"type": "string"}
        },
        "required": ["componentId"],
        "oneOf": [{"required": ["path"]}, {"required": ["dataBinding"]}]
    })
}

/// Evaluate a JSON Schema node against `value`.
///
/// Covers the keywords the shared definitions use. A `$ref` resolves to a
/// [`CommonType`] definition, either local (`#/$defs/..`) or into
/// [`COMMON_TYPES_DOCUMENT`]. Annotations are ignored.
pub fn conforms(schema: &Value, value: &Value) -> bool {
    match schema {
        Value::Bool(accept) => *accept,
        Value::Object(node) => node
            .iter()
            .all(|(keyword, argument)| keyword_holds(node, keyword, argument, value)),
        _ => true,
    }
}

fn keyword_holds(node: &Map<String, Value>, keyword: &str, argument: &Value, value: &Value) -> bool {
    let branches = || argument.as_array().into_iter().flatten();
    match keyword {
        "$ref" => argument
            .as_str()
            .and_then(resolve_reference)
            .is_some_and(|common| common.accepts(value)),
        "type" => argument.as_str() == Some(kind_of(value)),
        "const" => value == argument,
        "enum" => argument.as_array().is_some_and(|allowed| allowed.contains(value)),
        "required" => value.as_object().is_none_or(|map| {
            branches()
                .filter_map(Value::as_str)
                .all(|key| map.contains_key(key))
        }),
        "properties" => match (value.as_object(), argument.as_object()) {
            (Some(map), Some(properties)) => properties
                .iter()
                .all(|(key, schema)| map.get(key).is_none_or(|child| conforms(schema, child))),
            _ => true,
        },
        "additionalProperties" => value.as_object().is_none_or(|map| {
            let declared = node.get("properties").and_then(Value::as_object);
            map.iter()
                .filter(|(key, _)| !declared.is_some_and(|declared| declared.contains_key(*key)))
                .all(|(_, child)| conforms(argument, child))
        }),
        "items" => value
            .as_array()
            .is_none_or(|items| items.iter().all(|item| conforms(argument, item))),
        "minItems" => match (value.as_array(), argument.as_u64()) {
            (Some(items), Some(min)) => items.len() as u64 >= min,
            _ => true,
        },
        "allOf" => branches().all(|branch| conforms(branch, value)),
        "anyOf" => branches().any(|branch| conforms(branch, value)),
        "oneOf" => branches().filter(|branch| conforms(branch, value)).count() == 1,
        "not" => !conforms(argument, value),
        _ => true,
    }
}

fn resolve_reference(reference: &str) -> Option<CommonType> {
    let local = reference.strip_prefix(COMMON_TYPES_DOCUMENT).unwrap_or(reference);
    CommonType::from_name(local.strip_prefix("#/$defs/")?)
}

/// A problem found while checking a value against a [`Schema`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaIssue {
    /// JSON Pointer to the offending value, relative to the checked value
    pub path: String,
    pub message: String,
}

impl fmt::Display for SchemaIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = if self.path.is_empty() { "/" } else { &self.path };
        write!(f, "{}: {}", path, self.message)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SchemaKind {
    Any,
    String,
    Number,
    Boolean,
    /// A string restricted to the listed values
    Enum(Vec<String>),
    Array(Box<Schema>),
    Object(IndexMap<String, Schema>),
    /// A shared shape, published as a `$ref`
    Common(CommonType),
    AnyOf(Vec<Schema>),
}

/// A property schema with optional description.
///
/// ```rust
/// use a2ui_kit::a2ui::{CommonType, Schema};
///
/// let label = Schema::common(CommonType::DynamicString).describe("The button label.");
/// assert_eq!(label.to_json()["$ref"], "common_types.json#/$defs/DynamicString");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub kind: SchemaKind,
    pub description: Option<String>,
    pub optional: bool,
}

impl Schema {
    fn of(kind: SchemaKind) -> Self {
        Schema {
            kind,
            description: None,
            optional: false,
        }
    }

    pub fn any() -> Self {
        Self::of(SchemaKind::Any)
    }

    pub fn string() -> Self {
        Self::of(SchemaKind::String)
    }

    pub fn number() -> Self {
        Self::of(SchemaKind::Number)
    }

    pub fn boolean() -> Self {
        Self::of(SchemaKind::Boolean)
    }

    pub fn enumeration<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::of(SchemaKind::Enum(values.into_iter().map(Into::into).collect()))
    }

    pub fn array(items: Schema) -> Self {
        Self::of(SchemaKind::Array(Box::new(items)))
    }

    pub fn object<I, S>(properties: I) -> Self
    where
        I: IntoIterator<Item = (S, Schema)>,
        S: Into<String>,
    {
        Self::of(SchemaKind::Object(
            properties.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        ))
    }

    pub fn common(common: CommonType) -> Self {
        Self::of(SchemaKind::Common(common))
    }

    pub fn any_of(options: Vec<Schema>) -> Self {
        Self::of(SchemaKind::AnyOf(options))
    }

    /// Attach a human-readable description
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Mark as not required in its parent object
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Serialize as a JSON Schema node
    pub fn to_json(&self) -> Value {
        let mut node = match &self.kind {
            SchemaKind::Any => Map::new(),
            SchemaKind::String => typed("string"),
            SchemaKind::Number => typed("number"),
            SchemaKind::Boolean => typed("boolean"),
            SchemaKind::Enum(values) => {
                let mut node = typed("string");
                node.insert("enum".into(), json!(values));
                node
            }
            SchemaKind::Array(items) => {
                let mut node = typed("array");
                node.insert("items".into(), items.to_json());
                node
            }
            SchemaKind::Object(properties) => object_node(properties, None),
            SchemaKind::Common(common) => {
                let mut node = Map::new();
                node.insert("$ref".into(), Value::String(common.reference()));
                node
            }
            SchemaKind::AnyOf(options) => {
                let mut node = Map::new();
                node.insert(
                    "anyOf".into(),
                    Value::Array(options.iter().map(Schema::to_json).collect()),
                );
                node
            }
        };
        if let Some(description) = &self.description {
            node.insert("description".into(), Value::String(description.clone()));
        }
        Value::Object(node)
    }

    /// Check `value` against this schema.
    ///
    /// Unknown object keys are allowed.
    pub fn validate(&self, value: &Value) -> Vec<SchemaIssue> {
        let mut issues = Vec::new();
        self.check(value, "", &mut issues);
        issues
    }

    fn check(&self, value: &Value, path: &str, issues: &mut Vec<SchemaIssue>) {
        let message = match &self.kind {
            SchemaKind::Any => None,
            SchemaKind::String => (!value.is_string()).then(|| expected("string", value)),
            SchemaKind::Number => (!value.is_number()).then(|| expected("number", value)),
            SchemaKind::Boolean => (!value.is_boolean()).then(|| expected("boolean", value)),
            SchemaKind::Enum(allowed) => match value.as_str() {
                Some(s) if allowed.iter().any(|a| a == s) => None,
                _ => Some(format!("expected one of {:?}, got {}", allowed, value)),
            },
            SchemaKind::Array(items) => match value.as_array() {
                Some(elements) => {
                    for (index, element) in elements.iter().enumerate() {
                        items.check(element, &format!("{}/{}", path, index), issues);
                    }
                    None
                }
                None => Some(expected("array", value)),
            },
            SchemaKind::Object(properties) => match value.as_object() {
                Some(map) => {
                    check_properties(properties, map, path, issues);
                    None
                }
                None => Some(expected("object", value)),
            },
            SchemaKind::Common(common) => (!common.accepts(value))
                .then(|| format!("expected {}, got {}", common.name(), value)),
            SchemaKind::AnyOf(options) => (!options
                .iter()
                .any(|option| option.validate(value).is_empty()))
            .then(|| format!("{} matches none of the allowed shapes", value)),
        };

        if let Some(message) = message {
            issues.push(SchemaIssue {
                path: path.to_string(),
                message,
            });
        }
    }
}

fn expected(kind: &str, value: &Value) -> String {
    format!("expected {}, got {}", kind, kind_of(value))
}

/// Check `map` against a property table: required keys present, known keys valid.
pub(crate) fn check_properties(
    properties: &IndexMap<String, Schema>,
    map: &Map<String, Value>,
    path: &str,
    issues: &mut Vec<SchemaIssue>,
) {
    for (name, schema) in properties {
        let child_path = format!("{}/{}", path, name);
        match map.get(name) {
            Some(child) => schema.check(child, &child_path, issues),
            None if !schema.optional => issues.push(SchemaIssue {
                path: child_path,
                message: "missing required property".to_string(),
            }),
            None => {}
        }
    }
}

/// An object schema node; `constant` adds a `component` const property first.
pub(crate) fn object_node(
    properties: &IndexMap<String, Schema>,
    constant: Option<(&str, &str)>,
) -> Map<String, Value> {
    let mut props = Map::new();
    let mut required = Vec::new();
    if let Some((key, value)) = constant {
        props.insert(key.to_string(), json!({ "const": value }));
        required.push(Value::String(key.to_string()));
    }
    for (name, schema) in properties {
        props.insert(name.clone(), schema.to_json());
        if !schema.optional {
            required.push(Value::String(name.clone()));
        }
    }

    let mut node = typed("object");
    node.insert("properties".into(), Value::Object(props));
    if !required.is_empty() {
        node.insert("required".into(), Value::Array(required));
    }
    node
}

fn typed(kind: &str) -> Map<String, Value> {
    let mut node = Map::new();
    node.insert("type".into(), Value::String(kind.to_string()));
    node
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
