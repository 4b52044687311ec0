//! A2UI Client Capabilities
//!
//! Derives the manifest a client sends to advertise what it can render.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use super::catalog::{Catalog, ComponentApi};
use super::schema::{COMMON_TYPES_DOCUMENT, CommonType, object_node};

/// Envelope definition every component shares, in the common types document.
pub const COMPONENT_COMMON_REF: &str = "common_types.json#/$defs/ComponentCommon";

/// Per-catalog envelope definition.
pub const CATALOG_COMPONENT_COMMON_REF: &str = "#/$defs/CatalogComponentCommon";

/// What a client can render.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientCapabilities {
    /// Ids of every catalog the client knows
    pub supported_catalog_ids: Vec<String>,

    /// Full schemas for catalogs the server may not know
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inline_catalogs: Vec<InlineCatalog>,
}

/// A catalog published with its component schemas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineCatalog {
    pub catalog_id: String,
    pub components: IndexMap<String, Value>,
}

impl ClientCapabilities {
    /// Build from the supported catalogs and the ones to inline.
    pub fn new<'a>(
        supported: impl IntoIterator<Item = &'a Catalog>,
        inline: impl IntoIterator<Item = &'a Catalog>,
    ) -> Self {
        ClientCapabilities {
            supported_catalog_ids: supported.into_iter().map(|c| c.id().to_string()).collect(),
            inline_catalogs: inline.into_iter().map(InlineCatalog::from_catalog).collect(),
        }
    }

    /// Wrap for request metadata: `{"a2uiClientCapabilities": {...}}`
    pub fn to_metadata(&self) -> Value {
        json!({ "a2uiClientCapabilities": self })
    }
}

impl InlineCatalog {
    pub fn from_catalog(catalog: &Catalog) -> Self {
        InlineCatalog {
            catalog_id: catalog.id().to_string(),
            components: catalog
                .components()
                .map(|api| (api.name().to_string(), component_schema(api)))
                .collect(),
        }
    }
}

/// Schema node for one component.
///
/// An intersection of the shared envelope, the catalog envelope, and an
/// object whose `component` is the constant component name.
pub fn component_schema(api: &ComponentApi) -> Value {
    let properties = object_node(api.properties(), Some(("component", api.name())));

    let mut node = Map::new();
    node.insert("type".into(), json!("object"));
    if let Some(description) = api.description() {
        node.insert("description".into(), json!(description));
    }
    node.insert(
        "allOf".into(),
        json!([
            { "$ref": COMPONENT_COMMON_REF },
            { "$ref": CATALOG_COMPONENT_COMMON_REF },
            Value::Object(properties),
        ]),
    );
    Value::Object(node)
}

/// The shared definitions document referenced by every manifest.
pub fn common_types_document() -> Value {
    let mut defs: Map<String, Value> = CommonType::ALL
        .iter()
        .map(|common| (common.name().to_string(), common.definition()))
        .collect();
    defs.insert(
        "ComponentCommon".to_string(),
        json!({
            "type": "object",
            "properties": {
                "id": {"$ref": "#/$defs/ComponentId"},
                "accessibility": {
                    "type": "object",
                    "properties": {
                        "label": {"$ref": "#/$defs/DynamicString"},
                        "description": {"$ref": "#/$defs/DynamicString"}
                    }
                }
            },
            "required": ["id"]
        }),
    );

    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "$id": COMMON_TYPES_DOCUMENT,
        "$defs": defs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::a2ui::schema::{Schema, conforms};
    use crate::a2ui::standard_catalog::{STANDARD_CATALOG_ID, standard_catalog};

    #[test]
    fn test_component_envelope() {
        let api = ComponentApi::new("Text")
            .property("text", Schema::common(CommonType::DynamicString).describe("The text."));
        let node = component_schema(&api);

        assert_eq!(node["type"], "object");
        let all_of = node["allOf"].as_array().unwrap();
        assert_eq!(all_of.len(), 3);
        assert_eq!(all_of[0], json!({"$ref": "common_types.json#/$defs/ComponentCommon"}));
        assert_eq!(all_of[1], json!({"$ref": "#/$defs/CatalogComponentCommon"}));
        assert_eq!(all_of[2]["type"], "object");
        assert_eq!(all_of[2]["properties"]["component"], json!({"const": "Text"}));
        assert_eq!(all_of[2]["required"], json!(["component", "text"]));
        assert_eq!(
            all_of[2]["properties"]["text"],
            json!({"$ref": "common_types.json#/$defs/DynamicString", "description": "The text."})
        );
    }

    #[test]
    fn test_standard_catalog_manifest_references() {
        let catalog = standard_catalog();
        let capabilities = ClientCapabilities::new([&catalog], [&catalog]);
        assert_eq!(capabilities.supported_catalog_ids, vec![STANDARD_CATALOG_ID.to_string()]);

        let components = &capabilities.inline_catalogs[0].components;
        assert_eq!(components.len(), 18);
        let prop = |component: &str, name: &str| {
            components[component]["allOf"][2]["properties"][name]["$ref"].clone()
        };
        assert_eq!(prop("Image", "url"), "common_types.json#/$defs/DynamicString");
        assert_eq!(prop("Button", "action"), "common_types.json#/$defs/Action");
        assert_eq!(prop("List", "children"), "common_types.json#/$defs/ChildList");
    }

    #[test]
    fn test_serialized_shape() {
        let catalog = Catalog::new("cat");
        let inline: [&Catalog; 0] = [];
        let capabilities = ClientCapabilities::new([&catalog], inline);
        assert_eq!(
            capabilities.to_metadata(),
            json!({"a2uiClientCapabilities": {"supportedCatalogIds": ["cat"]}})
        );
    }

    #[test]
    fn test_common_types_document_lists_every_definition() {
        let document = common_types_document();
        let defs = document["$defs"].as_object().unwrap();
        for common in CommonType::ALL {
            assert!(defs.contains_key(common.name()), "missing {}", common.name());
        }
        assert!(defs.contains_key("ComponentCommon"));
    }

    #[test]
    fn test_published_definitions_decide_validation() {
        let document = common_types_document();
        let samples = [
            json!("text"),
            json!(3),
            json!(true),
            json!(["a", "b"]),
            json!({"path": "/x"}),
            json!({"call": "now"}),
            json!({"literalString": "hi"}),
            json!({"literalBoolean": true}),
            json!({"explicitList": ["a"]}),
            json!({"template": {"componentId": "row", "dataBinding": "/items"}}),
            json!({"componentId": "row", "path": "/items"}),
            json!({"and": [{"true": true}]}),
            json!({"call": "required", "message": "Needed"}),
            json!({"checks": [{"call": "required", "message": "Needed"}]}),
            json!({"event": {"name": "go"}}),
            json!({"name": "legacy"}),
            json!(null),
        ];

        for common in CommonType::ALL {
            let published = &document["$defs"][common.name()];
            for sample in &samples {
                assert_eq!(
                    conforms(published, sample),
                    common.accepts(sample),
                    "{} disagrees on {}",
                    common.name(),
                    sample
                );
                let issues = Schema::common(common).validate(sample);
                assert_eq!(issues.is_empty(), conforms(published, sample));
            }
        }
    }
}
