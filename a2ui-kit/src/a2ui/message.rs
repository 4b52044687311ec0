//! A2UI Protocol Message Types
//!
//! Wire types for the A2UI message stream. Every message is an object with
//! exactly one key naming its kind.
//!
//! The current protocol uses `createSurface`, `updateComponents`,
//! `updateDataModel`, `deleteSurface` and `blockInput`. The earlier revision's
//! `beginRendering`, `surfaceUpdate` and `dataModelUpdate` are still accepted.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::error::Result;

/// Reads a number, treating any other JSON type as absent.
fn lenient_f64<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Option<f64>, D::Error> {
    let val = Option::<Value>::deserialize(d)?.and_then(|v| v.as_f64());
    Ok(val)
}

/// Keeps an explicit `null` as `Some(Value::Null)`; only absence is `None`.
fn present_value<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Option<Value>, D::Error> {
    Value::deserialize(d).map(Some)
}

fn default_path() -> String {
    "/".to_string()
}

/// Top-level A2UI message enum.
///
/// Each variant corresponds to one of the A2UI protocol message types, keyed
/// by its single top-level property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum A2uiMessage {
    /// Create a new surface bound to a catalog
    CreateSurface(CreateSurface),

    /// Add or update components of a surface
    UpdateComponents(UpdateComponents),

    /// Write (or delete) one value of a surface's data model
    UpdateDataModel(UpdateDataModel),

    /// Delete a surface
    DeleteSurface(DeleteSurface),

    /// Block user input. Accepted but not acted upon.
    BlockInput(BlockInput),

    /// Legacy: initialize a surface and name its root
    BeginRendering(BeginRendering),

    /// Legacy: add or update components in the tree
    SurfaceUpdate(SurfaceUpdate),

    /// Legacy: update the data model with typed contents
    DataModelUpdate(DataModelUpdate),

    /// User action event (sent from client to server)
    UserAction(UserAction),
}

impl A2uiMessage {
    /// Parse one message, ignoring a top-level `"version"` tag.
    pub fn from_value(mut value: Value) -> Result<Self> {
        if let Value::Object(map) = &mut value {
            map.remove("version");
        }
        Ok(serde_json::from_value(value)?)
    }

    /// The surface this message targets
    pub fn surface_id(&self) -> Option<&str> {
        match self {
            A2uiMessage::CreateSurface(m) => Some(&m.surface_id),
            A2uiMessage::UpdateComponents(m) => Some(&m.surface_id),
            A2uiMessage::UpdateDataModel(m) => Some(&m.surface_id),
            A2uiMessage::DeleteSurface(m) => Some(&m.surface_id),
            A2uiMessage::BlockInput(m) => m.surface_id.as_deref(),
            A2uiMessage::BeginRendering(m) => Some(&m.surface_id),
            A2uiMessage::SurfaceUpdate(m) => Some(&m.surface_id),
            A2uiMessage::DataModelUpdate(m) => Some(&m.surface_id),
            A2uiMessage::UserAction(m) => Some(&m.surface_id),
        }
    }

    /// The wire name of this message kind
    pub fn kind(&self) -> &'static str {
        match self {
            A2uiMessage::CreateSurface(_) => "createSurface",
            A2uiMessage::UpdateComponents(_) => "updateComponents",
            A2uiMessage::UpdateDataModel(_) => "updateDataModel",
            A2uiMessage::DeleteSurface(_) => "deleteSurface",
            A2uiMessage::BlockInput(_) => "blockInput",
            A2uiMessage::BeginRendering(_) => "beginRendering",
            A2uiMessage::SurfaceUpdate(_) => "surfaceUpdate",
            A2uiMessage::DataModelUpdate(_) => "dataModelUpdate",
            A2uiMessage::UserAction(_) => "userAction",
        }
    }
}

/// Create a new surface.
///
/// # Example JSON
///
/// ```text
/// {"createSurface": {"surfaceId": "main", "catalogId": "https://...", "theme": {"primaryColor": "#00f"}}}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSurface {
    pub surface_id: String,

    /// Catalog the surface's components come from
    pub catalog_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<Value>,
}

/// Add or update components in a surface.
///
/// # Example JSON
///
/// ```text
/// {
///   "updateComponents": {
///     "surfaceId": "main",
///     "components": [
///       {"id": "root", "component": "Column", "children": ["title"]},
///       {"id": "title", "component": "Text", "text": {"path": "/title"}}
///     ]
///   }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateComponents {
    pub surface_id: String,
    pub components: Vec<ComponentUpdate>,
}

/// One entry of `updateComponents`: id, optional type, and flat properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentUpdate {
    pub id: String,

    /// Component type; required when the id is new
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,

    /// Every other key is a component property
    #[serde(flatten)]
    pub properties: Map<String, Value>,
}

/// Write a value into a surface's data model.
///
/// An absent `value` deletes the key at `path`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDataModel {
    pub surface_id: String,

    /// Target path (default "/")
    #[serde(default = "default_path")]
    pub path: String,

    #[serde(
        default,
        deserialize_with = "present_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub value: Option<Value>,
}

/// Delete a surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteSurface {
    /// Surface ID to delete
    pub surface_id: String,
}

/// Block user input on a surface
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surface_id: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ============================================================================
// Legacy messages
// ============================================================================

/// Legacy: initialize a new UI surface.
///
/// # Example JSON
///
/// ```text
/// {
///   "beginRendering": {
///     "surfaceId": "main",
///     "root": "root-column",
///     "styles": {
///       "primaryColor": "#007BFF",
///       "font": "Roboto"
///     }
///   }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeginRendering {
    /// Unique identifier for this surface
    pub surface_id: String,

    /// ID of the root component
    pub root: String,

    /// Optional style configuration
    #[serde(default)]
    pub styles: Option<SurfaceStyles>,
}

/// Style configuration for a surface
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurfaceStyles {
    /// Primary color (hex format)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_color: Option<String>,

    /// Font family name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<String>,

    /// Additional custom styles
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SurfaceStyles {
    /// The styles as a theme object
    pub fn to_theme(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|_| Value::Object(Map::new()))
    }
}

/// Legacy: add or update components in the surface.
///
/// # Example JSON
///
/// ```text
/// {
///   "surfaceUpdate": {
///     "surfaceId": "main",
///     "components": [
///       {
///         "id": "root",
///         "component": {
///           "Column": {
///             "children": {"explicitList": ["header", "content"]}
///           }
///         }
///       }
///     ]
///   }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurfaceUpdate {
    /// Target surface ID
    pub surface_id: String,

    /// Components to add or update
    pub components: Vec<ComponentDefinition>,
}

/// A single legacy component definition in the adjacency list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentDefinition {
    /// Unique component ID
    pub id: String,

    /// Optional flex weight for Row/Column layouts
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,

    /// `{Type: properties}` with exactly one key
    pub component: Map<String, Value>,
}

impl ComponentDefinition {
    /// Unwrap into the flat `updateComponents` form.
    ///
    /// Returns `None` if the wrapper has no type key.
    pub fn to_component_update(&self) -> Option<ComponentUpdate> {
        let (component_type, properties) = self.component.iter().next()?;
        let mut properties = properties.as_object().cloned().unwrap_or_default();
        if let Some(weight) = self.weight {
            properties.insert("weight".to_string(), Value::from(weight));
        }
        Some(ComponentUpdate {
            id: self.id.clone(),
            component: Some(component_type.clone()),
            properties,
        })
    }
}

/// Legacy: update the data model.
///
/// # Example JSON
///
/// ```text
/// {
///   "dataModelUpdate": {
///     "surfaceId": "main",
///     "path": "/",
///     "contents": [
///       {"key": "products", "valueMap": [...]}
///     ]
///   }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataModelUpdate {
    /// Target surface ID
    pub surface_id: String,

    /// Base path for updates (default "/")
    #[serde(default = "default_path")]
    pub path: String,

    /// Data updates
    pub contents: Vec<DataContent>,
}

/// A single data content item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataContent {
    /// Key name
    pub key: String,

    /// Value (one of the typed variants)
    #[serde(flatten)]
    pub value: DataValue,
}

/// Data value types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DataValue {
    /// String value
    ValueString(String),
    /// Number value
    ValueNumber(f64),
    /// Boolean value
    ValueBoolean(bool),
    /// Nested map (object)
    ValueMap(Vec<DataContent>),
    /// Array of values
    ValueArray(Vec<DataValue>),
}

impl DataValue {
    /// Convert to a plain JSON value
    pub fn to_json(&self) -> Value {
        match self {
            DataValue::ValueString(s) => Value::String(s.clone()),
            DataValue::ValueNumber(n) => Value::from(*n),
            DataValue::ValueBoolean(b) => Value::Bool(*b),
            DataValue::ValueMap(entries) => Value::Object(contents_to_map(entries)),
            DataValue::ValueArray(items) => {
                Value::Array(items.iter().map(DataValue::to_json).collect())
            }
        }
    }
}

/// Fold typed contents into a JSON object, later keys winning.
pub fn contents_to_map(contents: &[DataContent]) -> Map<String, Value> {
    contents
        .iter()
        .map(|content| (content.key.clone(), content.value.to_json()))
        .collect()
}

// ============================================================================
// Client to server
// ============================================================================

/// User action event (sent from client to server).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAction {
    /// Action name (e.g., "addToCart", "submit")
    pub name: String,

    /// Source surface ID
    pub surface_id: String,

    /// Source component ID
    pub source_component_id: String,

    /// RFC 3339 time the action was raised
    pub timestamp: String,

    /// Context values (resolved from data model)
    #[serde(default)]
    pub context: Map<String, Value>,
}

impl UserAction {
    /// Create an action stamped with the current time
    pub fn new(
        name: impl Into<String>,
        surface_id: impl Into<String>,
        source_component_id: impl Into<String>,
        context: Map<String, Value>,
    ) -> Self {
        UserAction {
            name: name.into(),
            surface_id: surface_id.into(),
            source_component_id: source_component_id.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            context,
        }
    }

    /// The action payload handed to action listeners
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Wrap for the wire: `{"userAction": {...}}`
    pub fn to_message(&self) -> Value {
        serde_json::json!({ "userAction": self.to_json() })
    }
}
