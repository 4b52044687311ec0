//! A2UI Catalogs
//!
//! A catalog is a named set of component APIs. Catalogs are plain values
//! handed to the processor; there is no global registry.

use indexmap::IndexMap;
use serde_json::{Map, Value};

use super::schema::{Schema, SchemaIssue, check_properties};

/// The public API of one component type: its name and property schemas.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentApi {
    name: String,
    description: Option<String>,
    properties: IndexMap<String, Schema>,
}

impl ComponentApi {
    pub fn new(name: impl Into<String>) -> Self {
        ComponentApi {
            name: name.into(),
            description: None,
            properties: IndexMap::new(),
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Declare a property
    pub fn property(mut self, name: impl Into<String>, schema: Schema) -> Self {
        self.properties.insert(name.into(), schema);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn properties(&self) -> &IndexMap<String, Schema> {
        &self.properties
    }

    /// Check a component's properties (without `id`/`component`).
    pub fn validate(&self, properties: &Map<String, Value>) -> Vec<SchemaIssue> {
        let mut issues = Vec::new();
        check_properties(&self.properties, properties, "", &mut issues);
        issues
    }
}

/// A named set of component APIs, in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    id: String,
    components: IndexMap<String, ComponentApi>,
}

impl Catalog {
    /// An empty catalog. Components of any type are still accepted on its
    /// surfaces, just not validated.
    pub fn new(id: impl Into<String>) -> Self {
        Catalog {
            id: id.into(),
            components: IndexMap::new(),
        }
    }

    /// Builder form of [`add_component`](Self::add_component)
    pub fn with_component(mut self, api: ComponentApi) -> Self {
        self.add_component(api);
        self
    }

    /// Register a component API, replacing one with the same name
    pub fn add_component(&mut self, api: ComponentApi) {
        self.components.insert(api.name.clone(), api);
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn get(&self, name: &str) -> Option<&ComponentApi> {
        self.components.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.components.contains_key(name)
    }

    pub fn components(&self) -> impl Iterator<Item = &ComponentApi> {
        self.components.values()
    }

    pub fn component_names(&self) -> impl Iterator<Item = &str> {
        self.components.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}
