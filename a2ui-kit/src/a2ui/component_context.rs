//! A2UI Component Context
//!
//! What a rendering layer needs to render one node: the component, a data
//! context scoped to the node's position, and the surface's action channel.

use std::rc::Rc;

use serde_json::{Map, Value};

use super::component::ComponentModel;
use super::data_context::DataContext;
use super::data_model::Subscription;
use super::message::UserAction;
use super::surface::SurfaceModel;
use super::value::DynamicValue;

/// A child reference produced by [`ComponentContext::children`].
///
/// Template children carry a data context nested at their array item.
#[derive(Debug, Clone)]
pub struct ChildRef {
    pub component_id: String,
    pub data_context: DataContext,
}

/// A component bound to a data context and its surface.
#[derive(Debug, Clone)]
pub struct ComponentContext {
    component: Rc<ComponentModel>,
    data_context: DataContext,
    surface: Rc<SurfaceModel>,
}

impl ComponentContext {
    pub(crate) fn new(
        component: Rc<ComponentModel>,
        data_context: DataContext,
        surface: Rc<SurfaceModel>,
    ) -> Self {
        ComponentContext {
            component,
            data_context,
            surface,
        }
    }

    pub fn id(&self) -> &str {
        self.component.id()
    }

    pub fn component(&self) -> &Rc<ComponentModel> {
        &self.component
    }

    pub fn data_context(&self) -> &DataContext {
        &self.data_context
    }

    pub fn surface(&self) -> &Rc<SurfaceModel> {
        &self.surface
    }

    /// Resolve a property against this component's data context
    pub fn resolve(&self, property: &str) -> Option<Value> {
        let raw = self.component.property(property)?;
        self.data_context.resolve(&raw)
    }

    pub fn resolve_string(&self, property: &str) -> String {
        self.component
            .property(property)
            .map(|raw| self.data_context.resolve_string(&raw))
            .unwrap_or_default()
    }

    pub fn resolve_number(&self, property: &str) -> f64 {
        self.component
            .property(property)
            .map(|raw| self.data_context.resolve_number(&raw))
            .unwrap_or(0.0)
    }

    pub fn resolve_bool(&self, property: &str) -> bool {
        self.component
            .property(property)
            .is_some_and(|raw| self.data_context.resolve_bool(&raw))
    }

    /// Track a property's value; missing properties yield a static `None`.
    pub fn subscribe(&self, property: &str) -> Subscription {
        match self.component.property(property) {
            Some(raw) => self
                .data_context
                .subscribe_dynamic_value(&DynamicValue::from_json(&raw)),
            None => Subscription::fixed(None),
        }
    }

    /// Absolute data path a property is bound to, if it is a path binding.
    ///
    /// Input components write user edits to this path.
    pub fn bind_path(&self, property: &str) -> Option<String> {
        let raw = self.component.property(property)?;
        DynamicValue::from_json(&raw)
            .as_path()
            .map(|path| self.data_context.resolve_path(path))
    }

    /// Write a user edit through a property's binding.
    ///
    /// Returns `false` if the property is not bound to a path.
    pub fn write(&self, property: &str, value: Value) -> bool {
        match self.bind_path(property) {
            Some(path) => {
                self.data_context.set(&path, value);
                true
            }
            None => false,
        }
    }

    /// Expand a child list property.
    ///
    /// Accepts a single id, an array of ids, `{"explicitList": [...]}`, or a template
    /// `{"componentId", "path"}` (legacy: `{"template": {"componentId", "dataBinding"}}`)
    /// which yields one child per item of the bound array.
    pub fn children(&self, property: &str) -> Vec<ChildRef> {
        let Some(raw) = self.component.property(property) else {
            return Vec::new();
        };

        if let Some(ids) = explicit_ids(&raw) {
            return ids
                .into_iter()
                .map(|component_id| ChildRef {
                    component_id,
                    data_context: self.data_context.clone(),
                })
                .collect();
        }

        let template = raw.get("template").unwrap_or(&raw);
        let component_id = template.get("componentId").and_then(Value::as_str);
        let binding = template
            .get("path")
            .or_else(|| template.get("dataBinding"))
            .and_then(Value::as_str);
        let (Some(component_id), Some(binding)) = (component_id, binding) else {
            ::log::warn!(
                "[A2UI] Component {} has an unrecognized '{}' child list",
                self.id(),
                property
            );
            return Vec::new();
        };

        let items_path = self.data_context.resolve_path(binding);
        let count = self
            .data_context
            .data_model()
            .with_value(&items_path, |items| {
                items.and_then(Value::as_array).map_or(0, Vec::len)
            });
        let base = items_path.trim_end_matches('/');

        (0..count)
            .map(|index| ChildRef {
                component_id: component_id.to_string(),
                data_context: self.data_context.nested(&format!("{}/{}", base, index)),
            })
            .collect()
    }

    /// Contexts for the children that are already registered on the surface.
    pub fn child_contexts(&self, property: &str) -> Vec<ComponentContext> {
        self.children(property)
            .into_iter()
            .filter_map(|child| {
                let component = self.surface.components().get(&child.component_id)?;
                Some(ComponentContext::new(
                    component,
                    child.data_context,
                    Rc::clone(&self.surface),
                ))
            })
            .collect()
    }

    /// Build the outbound action for an action property.
    ///
    /// Supports `{"event": {"name", "context": {key: value}}}` and the legacy
    /// `{"name", "context": [{"key", "value"}]}`. Context values are resolved
    /// against this component's data context.
    pub fn build_action(&self, property: &str) -> Option<UserAction> {
        let raw = self.component.property(property)?;
        let definition = raw.get("event").unwrap_or(&raw);
        let name = definition.get("name")?.as_str()?;

        let mut context = Map::new();
        match definition.get("context") {
            Some(Value::Object(entries)) => {
                for (key, value) in entries {
                    context.insert(key.clone(), self.resolve_or_null(value));
                }
            }
            Some(Value::Array(items)) => {
                for item in items {
                    let Some(key) = item.get("key").and_then(Value::as_str) else {
                        continue;
                    };
                    let value = item.get("value").map_or(Value::Null, |v| self.resolve_or_null(v));
                    context.insert(key.to_string(), value);
                }
            }
            _ => {}
        }

        Some(UserAction::new(name, self.surface.id(), self.id(), context))
    }

    /// Hand an arbitrary action payload to the surface's action listeners
    pub async fn dispatch_action(&self, action: Value) {
        self.surface.dispatch_action(action).await;
    }

    /// Build and dispatch the action declared by `property`.
    ///
    /// Returns `false` if the property is not an action.
    pub async fn trigger_action(&self, property: &str) -> bool {
        let Some(action) = self.build_action(property) else {
            return false;
        };
        self.dispatch_action(action.to_json()).await;
        true
    }

    fn resolve_or_null(&self, raw: &Value) -> Value {
        self.data_context.resolve(raw).unwrap_or(Value::Null)
    }
}

fn explicit_ids(raw: &Value) -> Option<Vec<String>> {
    let list = match raw {
        Value::String(id) => return Some(vec![id.clone()]),
        Value::Array(list) => list,
        Value::Object(map) => map.get("explicitList")?.as_array()?,
        _ => return None,
    };
    Some(
        list.iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
    )
}
