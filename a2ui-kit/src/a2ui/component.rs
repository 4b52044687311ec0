//! A2UI Component Registry
//!
//! Per-surface component declarations. A component is created once per id
//! and afterwards only has its properties merged by later updates.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use serde_json::{Map, Value};

use super::error::{A2uiError, Result};
use super::listeners::{Listeners, SubscriptionHandle, subscribe};

/// Callback fired after a component's properties change.
pub type ComponentUpdateListener = dyn Fn(&ComponentModel);

/// Callback fired when a component is registered.
pub type ComponentCreatedListener = dyn Fn(&Rc<ComponentModel>);

/// Accessibility attributes, read from the `accessibility` property.
///
/// Both fields are dynamic values and still need resolving.
#[derive(Debug, Clone, PartialEq)]
pub struct Accessibility {
    pub label: Option<Value>,
    pub description: Option<Value>,
}

/// One declared component: id, catalog type, and raw properties.
pub struct ComponentModel {
    id: String,
    component_type: String,
    properties: RefCell<Map<String, Value>>,
    listeners: Rc<Listeners<ComponentUpdateListener>>,
}

impl ComponentModel {
    pub fn new(id: impl Into<String>, component_type: impl Into<String>, properties: Map<String, Value>) -> Self {
        ComponentModel {
            id: id.into(),
            component_type: component_type.into(),
            properties: RefCell::new(properties),
            listeners: Rc::new(Listeners::new()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// The catalog component type, e.g. `"Button"`
    pub fn component_type(&self) -> &str {
        &self.component_type
    }

    /// Get a copy of a single raw property
    pub fn property(&self, name: &str) -> Option<Value> {
        self.properties.borrow().get(name).cloned()
    }

    /// Get a copy of all raw properties
    pub fn properties(&self) -> Map<String, Value> {
        self.properties.borrow().clone()
    }

    pub fn accessibility(&self) -> Option<Accessibility> {
        let properties = self.properties.borrow();
        let accessibility = properties.get("accessibility")?.as_object()?;
        Some(Accessibility {
            label: accessibility.get("label").cloned(),
            description: accessibility.get("description").cloned(),
        })
    }

    /// Shallow-merge `partial` into the properties, then notify listeners.
    pub fn update(&self, partial: Map<String, Value>) {
        {
            let mut properties = self.properties.borrow_mut();
            for (key, value) in partial {
                properties.insert(key, value);
            }
        }
        for listener in self.listeners.snapshot() {
            listener(self);
        }
    }

    pub fn add_update_listener(&self, listener: impl Fn(&ComponentModel) + 'static) -> SubscriptionHandle {
        let listener: Rc<ComponentUpdateListener> = Rc::new(listener);
        subscribe(&self.listeners, listener)
    }
}

impl fmt::Debug for ComponentModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentModel")
            .field("id", &self.id)
            .field("type", &self.component_type)
            .field("properties", &self.properties.borrow())
            .finish()
    }
}

/// The components of one surface, in creation order.
#[derive(Default)]
pub struct ComponentsModel {
    components: RefCell<IndexMap<String, Rc<ComponentModel>>>,
    created_listeners: Rc<Listeners<ComponentCreatedListener>>,
}

impl ComponentsModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new component.
    ///
    /// Fails with [`A2uiError::DuplicateComponent`] if `id` is taken; callers
    /// must look up before creating.
    pub fn create_component(
        &self,
        id: &str,
        component_type: &str,
        properties: Map<String, Value>,
    ) -> Result<Rc<ComponentModel>> {
        let component = {
            let mut components = self.components.borrow_mut();
            if components.contains_key(id) {
                return Err(A2uiError::DuplicateComponent { id: id.to_string() });
            }
            let component = Rc::new(ComponentModel::new(id, component_type, properties));
            components.insert(id.to_string(), Rc::clone(&component));
            component
        };

        for listener in self.created_listeners.snapshot() {
            listener(&component);
        }
        Ok(component)
    }

    pub fn get(&self, id: &str) -> Option<Rc<ComponentModel>> {
        self.components.borrow().get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.components.borrow().contains_key(id)
    }

    /// Component ids in creation order
    pub fn ids(&self) -> Vec<String> {
        self.components.borrow().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.components.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.borrow().is_empty()
    }

    pub fn on_component_created(
        &self,
        listener: impl Fn(&Rc<ComponentModel>) + 'static,
    ) -> SubscriptionHandle {
        let listener: Rc<ComponentCreatedListener> = Rc::new(listener);
        subscribe(&self.created_listeners, listener)
    }
}

impl fmt::Debug for ComponentsModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentsModel")
            .field("ids", &self.ids())
            .finish()
    }
}
