//! A2UI Message Processor
//!
//! Processes incoming A2UI messages and updates the surfaces, their
//! component registries and their data models.

use std::rc::Rc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{
    capabilities::ClientCapabilities,
    catalog::Catalog,
    data_model::{join_pointer, parse_pointer},
    error::{A2uiError, Result},
    listeners::SubscriptionHandle,
    message::*,
    repair::repair_json,
    standard_catalog::standard_catalog,
    surface::SurfaceModel,
    surface_group::{SurfaceGroupModel, SurfaceLifecycleListener},
};

/// Processor settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProcessorConfig {
    /// Catalog for surfaces opened by legacy messages, which carry no
    /// catalog id. Defaults to the first configured catalog.
    pub legacy_catalog_id: Option<String>,

    /// Check incoming component properties against the catalog and log
    /// what does not match. Components are applied either way.
    pub validate_components: bool,

    /// Run [`repair_json`] over payloads given to
    /// [`process_json`](A2uiMessageProcessor::process_json).
    pub repair_json: bool,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        ProcessorConfig {
            legacy_catalog_id: None,
            validate_components: true,
            repair_json: true,
        }
    }
}

/// Event emitted when a surface is created
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceCreatedEvent {
    pub surface_id: String,
}

/// Event emitted when components of a surface are created or updated
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceUpdatedEvent {
    pub surface_id: String,
    pub updated_components: Vec<String>,
}

/// Event emitted when a surface is deleted
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceDeletedEvent {
    pub surface_id: String,
}

/// Event emitted when data model is updated
#[derive(Debug, Clone, PartialEq)]
pub struct DataModelUpdatedEvent {
    pub surface_id: String,
    pub updated_paths: Vec<String>,
}

/// Events that can be emitted by the processor
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessorEvent {
    SurfaceCreated(SurfaceCreatedEvent),
    SurfaceUpdated(SurfaceUpdatedEvent),
    SurfaceDeleted(SurfaceDeletedEvent),
    DataModelUpdated(DataModelUpdatedEvent),
}

impl ProcessorEvent {
    pub fn surface_id(&self) -> &str {
        match self {
            ProcessorEvent::SurfaceCreated(e) => &e.surface_id,
            ProcessorEvent::SurfaceUpdated(e) => &e.surface_id,
            ProcessorEvent::SurfaceDeleted(e) => &e.surface_id,
            ProcessorEvent::DataModelUpdated(e) => &e.surface_id,
        }
    }
}

/// The A2UI message processor.
///
/// Routes each message to its surface in arrival order. Problems with a
/// single message (unknown surface or catalog, duplicate creation, a
/// component without a type) are logged and that message is dropped; the
/// stream is never halted.
///
/// # Example
///
/// ```rust,ignore
/// let processor = A2uiMessageProcessor::with_standard_catalog();
///
/// let json = r#"[
///     {"createSurface": {"surfaceId": "main", "catalogId": "https://a2ui.org/specification/v0_9/standard_catalog.json"}},
///     {"updateComponents": {"surfaceId": "main", "components": [{"id": "root", "component": "Text", "text": "Hi"}]}}
/// ]"#;
/// for event in processor.process_json(json)? {
///     match event {
///         ProcessorEvent::SurfaceCreated(e) => {
///             println!("Surface created: {}", e.surface_id);
///         }
///         // ...
///     }
/// }
/// ```
#[derive(Debug)]
pub struct A2uiMessageProcessor {
    catalogs: Vec<Rc<Catalog>>,
    config: ProcessorConfig,
    group: SurfaceGroupModel,
}

impl A2uiMessageProcessor {
    /// Create a processor accepting surfaces for the given catalogs
    pub fn new(catalogs: impl IntoIterator<Item = Catalog>) -> Self {
        Self::with_config(catalogs, ProcessorConfig::default())
    }

    pub fn with_config(catalogs: impl IntoIterator<Item = Catalog>, config: ProcessorConfig) -> Self {
        A2uiMessageProcessor {
            catalogs: catalogs.into_iter().map(Rc::new).collect(),
            config,
            group: SurfaceGroupModel::new(),
        }
    }

    /// Create a new processor with the standard component catalog
    pub fn with_standard_catalog() -> Self {
        Self::new([standard_catalog()])
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    pub fn catalogs(&self) -> &[Rc<Catalog>] {
        &self.catalogs
    }

    pub fn catalog(&self, catalog_id: &str) -> Option<&Rc<Catalog>> {
        self.catalogs.iter().find(|catalog| catalog.id() == catalog_id)
    }

    /// The surfaces this processor maintains
    pub fn group(&self) -> &SurfaceGroupModel {
        &self.group
    }

    pub fn get_surface_model(&self, surface_id: &str) -> Option<Rc<SurfaceModel>> {
        self.group.get_surface(surface_id)
    }

    pub fn surface_ids(&self) -> Vec<String> {
        self.group.surface_ids()
    }

    pub fn add_lifecycle_listener(
        &self,
        listener: impl SurfaceLifecycleListener + 'static,
    ) -> SubscriptionHandle {
        self.group.add_lifecycle_listener(listener)
    }

    /// Register an async listener for actions raised on any surface
    pub fn add_action_listener<F, Fut>(&self, listener: F) -> SubscriptionHandle
    where
        F: Fn(Value) -> Fut + 'static,
        Fut: Future<Output = anyhow::Result<()>> + 'static,
    {
        self.group.add_action_listener(listener)
    }

    /// Manifest advertising every configured catalog, inlining the schemas
    /// of `inline_catalogs`.
    pub fn get_client_capabilities<'a>(
        &'a self,
        inline_catalogs: impl IntoIterator<Item = &'a Catalog>,
    ) -> ClientCapabilities {
        ClientCapabilities::new(self.catalogs.iter().map(Rc::as_ref), inline_catalogs)
    }

    /// Process a single A2UI message
    ///
    /// Returns a list of events that occurred as a result of processing.
    pub fn process_message(&self, message: A2uiMessage) -> Vec<ProcessorEvent> {
        match message {
            A2uiMessage::CreateSurface(msg) => self.process_create_surface(msg),
            A2uiMessage::UpdateComponents(msg) => self.process_update_components(msg),
            A2uiMessage::UpdateDataModel(msg) => self.process_update_data_model(msg),
            A2uiMessage::DeleteSurface(msg) => self.process_delete_surface(msg),
            A2uiMessage::BlockInput(msg) => {
                ::log::debug!(
                    "[A2UI] blockInput for {} accepted, input blocking is not modeled",
                    msg.surface_id.as_deref().unwrap_or("all surfaces")
                );
                vec![]
            }
            A2uiMessage::BeginRendering(msg) => self.process_begin_rendering(msg),
            A2uiMessage::SurfaceUpdate(msg) => self.process_surface_update(msg),
            A2uiMessage::DataModelUpdate(msg) => self.process_data_model_update(msg),
            A2uiMessage::UserAction(msg) => {
                ::log::warn!(
                    "[A2UI] Ignoring inbound userAction {} from surface {}",
                    msg.name,
                    msg.surface_id
                );
                vec![]
            }
        }
    }

    /// Process messages in order
    pub fn process_messages(
        &self,
        messages: impl IntoIterator<Item = A2uiMessage>,
    ) -> Vec<ProcessorEvent> {
        messages
            .into_iter()
            .flat_map(|message| self.process_message(message))
            .collect()
    }

    /// Parse and process a JSON payload holding one message or an array.
    ///
    /// Array elements that are not valid messages are skipped with a
    /// warning so the rest of the batch still applies. Fails only when the
    /// payload as a whole is not usable.
    pub fn process_json(&self, json: &str) -> Result<Vec<ProcessorEvent>> {
        let repaired;
        let json = if self.config.repair_json {
            repaired = repair_json(json);
            repaired.as_str()
        } else {
            json
        };

        match serde_json::from_str::<Value>(json)? {
            Value::Array(items) => {
                let mut events = Vec::new();
                for (i, item) in items.into_iter().enumerate() {
                    match A2uiMessage::from_value(item) {
                        Ok(message) => events.extend(self.process_message(message)),
                        Err(err) => {
                            ::log::warn!("[A2UI] Skipping message[{}]: {}", i, err);
                        }
                    }
                }
                Ok(events)
            }
            value @ Value::Object(_) => Ok(self.process_message(A2uiMessage::from_value(value)?)),
            other => Err(A2uiError::InvalidMessage(format!(
                "expected a message object or an array of messages, got {}",
                other
            ))),
        }
    }

    /// Process newline-delimited messages, one JSON object per line.
    ///
    /// Blank lines are ignored and malformed lines are skipped.
    pub fn process_jsonl(&self, jsonl: &str) -> Vec<ProcessorEvent> {
        let mut events = Vec::new();
        for (i, line) in jsonl.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let message = serde_json::from_str::<Value>(line)
                .map_err(A2uiError::from)
                .and_then(A2uiMessage::from_value);
            match message {
                Ok(message) => events.extend(self.process_message(message)),
                Err(err) => ::log::warn!("[A2UI] Skipping line {}: {}", i + 1, err),
            }
        }
        events
    }

    fn find_catalog(&self, catalog_id: &str) -> Result<Rc<Catalog>> {
        self.catalog(catalog_id)
            .cloned()
            .ok_or_else(|| A2uiError::UnknownCatalog(catalog_id.to_string()))
    }

    fn find_surface(&self, surface_id: &str) -> Result<Rc<SurfaceModel>> {
        self.group
            .get_surface(surface_id)
            .ok_or_else(|| A2uiError::UnknownSurface(surface_id.to_string()))
    }

    fn legacy_catalog(&self) -> Result<Rc<Catalog>> {
        match &self.config.legacy_catalog_id {
            Some(catalog_id) => self.find_catalog(catalog_id),
            None => self
                .catalogs
                .first()
                .cloned()
                .ok_or_else(|| A2uiError::UnknownCatalog("(none configured)".to_string())),
        }
    }

    fn process_create_surface(&self, msg: CreateSurface) -> Vec<ProcessorEvent> {
        let catalog = match self.find_catalog(&msg.catalog_id) {
            Ok(catalog) => catalog,
            Err(err) => {
                ::log::warn!("[A2UI] {}, dropping createSurface for {}", err, msg.surface_id);
                return vec![];
            }
        };

        let surface = Rc::new(SurfaceModel::new(msg.surface_id.clone(), catalog, msg.theme));
        if !self.group.add_surface(surface) {
            return vec![];
        }
        vec![ProcessorEvent::SurfaceCreated(SurfaceCreatedEvent {
            surface_id: msg.surface_id,
        })]
    }

    fn process_update_components(&self, msg: UpdateComponents) -> Vec<ProcessorEvent> {
        match self.find_surface(&msg.surface_id) {
            Ok(surface) => self.apply_components(&surface, msg.components),
            Err(err) => {
                ::log::warn!("[A2UI] {}, dropping updateComponents", err);
                vec![]
            }
        }
    }

    fn process_update_data_model(&self, msg: UpdateDataModel) -> Vec<ProcessorEvent> {
        let surface = match self.find_surface(&msg.surface_id) {
            Ok(surface) => surface,
            Err(err) => {
                ::log::warn!("[A2UI] {}, dropping updateDataModel", err);
                return vec![];
            }
        };

        surface.data_model().write(&msg.path, msg.value);
        vec![ProcessorEvent::DataModelUpdated(DataModelUpdatedEvent {
            surface_id: msg.surface_id,
            updated_paths: vec![msg.path],
        })]
    }

    fn process_delete_surface(&self, msg: DeleteSurface) -> Vec<ProcessorEvent> {
        if self.group.delete_surface(&msg.surface_id).is_none() {
            ::log::warn!("[A2UI] Surface not found: {}, dropping deleteSurface", msg.surface_id);
            return vec![];
        }
        vec![ProcessorEvent::SurfaceDeleted(SurfaceDeletedEvent {
            surface_id: msg.surface_id,
        })]
    }

    fn process_begin_rendering(&self, msg: BeginRendering) -> Vec<ProcessorEvent> {
        let mut events = Vec::new();
        let Some(surface) = self.legacy_surface(&msg.surface_id, &mut events) else {
            return events;
        };

        surface.set_root(msg.root);
        if let Some(styles) = &msg.styles {
            surface.set_theme(styles.to_theme());
        }
        events
    }

    fn process_surface_update(&self, msg: SurfaceUpdate) -> Vec<ProcessorEvent> {
        let mut events = Vec::new();
        let Some(surface) = self.legacy_surface(&msg.surface_id, &mut events) else {
            return events;
        };

        let updates = msg
            .components
            .iter()
            .filter_map(|definition| {
                let update = definition.to_component_update();
                if update.is_none() {
                    ::log::warn!("[A2UI] Component {} has an empty wrapper, skipping", definition.id);
                }
                update
            })
            .collect();
        events.extend(self.apply_components(&surface, updates));
        events
    }

    fn process_data_model_update(&self, msg: DataModelUpdate) -> Vec<ProcessorEvent> {
        let mut events = Vec::new();
        let Some(surface) = self.legacy_surface(&msg.surface_id, &mut events) else {
            return events;
        };

        let base = parse_pointer(&msg.path);
        let mut updated_paths = Vec::with_capacity(msg.contents.len());
        for content in &msg.contents {
            let mut segments = base.clone();
            segments.push(content.key.clone());
            let path = join_pointer(&segments);
            surface.data_model().set(&path, content.value.to_json());
            updated_paths.push(path);
        }

        events.push(ProcessorEvent::DataModelUpdated(DataModelUpdatedEvent {
            surface_id: msg.surface_id,
            updated_paths,
        }));
        events
    }

    /// The surface a legacy message targets, created on first use.
    fn legacy_surface(
        &self,
        surface_id: &str,
        events: &mut Vec<ProcessorEvent>,
    ) -> Option<Rc<SurfaceModel>> {
        if let Some(surface) = self.group.get_surface(surface_id) {
            return Some(surface);
        }

        let catalog = match self.legacy_catalog() {
            Ok(catalog) => catalog,
            Err(err) => {
                ::log::warn!("[A2UI] {}, cannot open legacy surface {}", err, surface_id);
                return None;
            }
        };

        let surface = Rc::new(SurfaceModel::new(surface_id, catalog, None));
        self.group.add_surface(Rc::clone(&surface));
        events.push(ProcessorEvent::SurfaceCreated(SurfaceCreatedEvent {
            surface_id: surface_id.to_string(),
        }));
        Some(surface)
    }

    /// Create or merge each component, in order.
    fn apply_components(
        &self,
        surface: &SurfaceModel,
        updates: Vec<ComponentUpdate>,
    ) -> Vec<ProcessorEvent> {
        let mut updated_components = Vec::with_capacity(updates.len());

        for ComponentUpdate {
            id,
            component,
            properties,
        } in updates
        {
            match surface.components().get(&id) {
                Some(existing) => {
                    if let Some(requested) = component
                        .as_deref()
                        .filter(|requested| *requested != existing.component_type())
                    {
                        ::log::warn!(
                            "[A2UI] Component {} is a {}, ignoring type change to {}",
                            id,
                            existing.component_type(),
                            requested
                        );
                    }
                    existing.update(properties);
                    self.check_component(surface, &id, existing.component_type(), &existing.properties());
                }
                None => {
                    let Some(component_type) = component else {
                        ::log::warn!("[A2UI] Component {} has no type, skipping", id);
                        continue;
                    };
                    self.check_component(surface, &id, &component_type, &properties);
                    if let Err(err) =
                        surface
                            .components()
                            .create_component(&id, &component_type, properties)
                    {
                        ::log::warn!("[A2UI] {}", err);
                        continue;
                    }
                }
            }
            updated_components.push(id);
        }

        if updated_components.is_empty() {
            return vec![];
        }
        vec![ProcessorEvent::SurfaceUpdated(SurfaceUpdatedEvent {
            surface_id: surface.id().to_string(),
            updated_components,
        })]
    }

    /// Log how a component's properties deviate from its catalog entry.
    fn check_component(
        &self,
        surface: &SurfaceModel,
        id: &str,
        component_type: &str,
        properties: &Map<String, Value>,
    ) {
        if !self.config.validate_components {
            return;
        }

        let Some(api) = surface.catalog().get(component_type) else {
            if !surface.catalog().is_empty() {
                ::log::warn!(
                    "[A2UI] Component type {} (component {}) is not in catalog {}",
                    component_type,
                    id,
                    surface.catalog().id()
                );
            }
            return;
        };

        for issue in api.validate(properties) {
            ::log::warn!("[A2UI] Component {} ({}): {}", id, component_type, issue);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::a2ui::standard_catalog::STANDARD_CATALOG_ID;
    use serde_json::json;
    use std::cell::RefCell;

    fn processor() -> A2uiMessageProcessor {
        A2uiMessageProcessor::new([Catalog::new("cat")])
    }

    fn message(value: Value) -> A2uiMessage {
        A2uiMessage::from_value(value).unwrap()
    }

    fn create(processor: &A2uiMessageProcessor, surface_id: &str) -> Vec<ProcessorEvent> {
        processor.process_message(message(
            json!({"createSurface": {"surfaceId": surface_id, "catalogId": "cat"}}),
        ))
    }

    #[test]
    fn test_process_create_surface() {
        let processor = processor();
        let events = create(&processor, "main");

        assert_eq!(
            events,
            vec![ProcessorEvent::SurfaceCreated(SurfaceCreatedEvent {
                surface_id: "main".to_string()
            })]
        );
        let surface = processor.get_surface_model("main").unwrap();
        assert_eq!(surface.catalog().id(), "cat");
        assert!(surface.components().is_empty());
    }

    #[test]
    fn test_unknown_catalog_is_dropped() {
        let processor = processor();
        let events = processor.process_message(message(
            json!({"createSurface": {"surfaceId": "main", "catalogId": "other"}}),
        ));
        assert!(events.is_empty());
        assert!(processor.get_surface_model("main").is_none());
    }

    #[test]
    fn test_duplicate_create_keeps_first_surface() {
        let processor = processor();
        processor.process_message(message(json!({
            "createSurface": {"surfaceId": "main", "catalogId": "cat", "theme": {"primaryColor": "#111"}}
        })));
        let first = processor.get_surface_model("main").unwrap();

        let events = processor.process_message(message(json!({
            "createSurface": {"surfaceId": "main", "catalogId": "cat", "theme": {"primaryColor": "#222"}}
        })));

        assert!(events.is_empty());
        let current = processor.get_surface_model("main").unwrap();
        assert!(Rc::ptr_eq(&first, &current));
        assert_eq!(current.theme()["primaryColor"], "#111");
    }

    #[test]
    fn test_process_update_components() {
        let processor = processor();
        create(&processor, "main");

        let events = processor.process_message(message(json!({
            "updateComponents": {"surfaceId": "main", "components": [
                {"id": "root", "component": "Column", "children": ["title"]},
                {"id": "title", "component": "Text", "text": "Hello"}
            ]}
        })));

        match &events[..] {
            [ProcessorEvent::SurfaceUpdated(e)] => {
                assert_eq!(e.surface_id, "main");
                assert_eq!(e.updated_components, vec!["root", "title"]);
            }
            other => panic!("Expected SurfaceUpdated, got {:?}", other),
        }

        let surface = processor.get_surface_model("main").unwrap();
        let title = surface.components().get("title").unwrap();
        assert_eq!(title.component_type(), "Text");
        assert_eq!(title.property("text"), Some(json!("Hello")));
        assert_eq!(surface.root_component_id().as_deref(), Some("root"));
    }

    #[test]
    fn test_update_merges_and_keeps_type() {
        let processor = processor();
        create(&processor, "main");
        processor.process_message(message(json!({
            "updateComponents": {"surfaceId": "main", "components": [
                {"id": "title", "component": "Text", "text": "Hello", "variant": "h1"}
            ]}
        })));
        processor.process_message(message(json!({
            "updateComponents": {"surfaceId": "main", "components": [
                {"id": "title", "component": "Button", "text": "Bye"}
            ]}
        })));

        let surface = processor.get_surface_model("main").unwrap();
        let title = surface.components().get("title").unwrap();
        assert_eq!(title.component_type(), "Text");
        assert_eq!(title.property("text"), Some(json!("Bye")));
        assert_eq!(title.property("variant"), Some(json!("h1")));
    }

    #[test]
    fn test_new_component_without_type_is_skipped() {
        let processor = processor();
        create(&processor, "main");
        let events = processor.process_message(message(json!({
            "updateComponents": {"surfaceId": "main", "components": [
                {"id": "orphan", "text": "no type"},
                {"id": "ok", "component": "Text", "text": "typed"}
            ]}
        })));

        let surface = processor.get_surface_model("main").unwrap();
        assert!(!surface.components().contains("orphan"));
        assert!(surface.components().contains("ok"));
        match &events[..] {
            [ProcessorEvent::SurfaceUpdated(e)] => assert_eq!(e.updated_components, vec!["ok"]),
            other => panic!("Expected SurfaceUpdated, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_properties_are_still_applied() {
        let processor = A2uiMessageProcessor::with_standard_catalog();
        processor.process_message(message(json!({
            "createSurface": {"surfaceId": "main", "catalogId": STANDARD_CATALOG_ID}
        })));
        processor.process_message(message(json!({
            "updateComponents": {"surfaceId": "main", "components": [
                {"id": "slider", "component": "Slider", "value": "not a number"},
                {"id": "custom", "component": "Chart", "series": []}
            ]}
        })));

        let surface = processor.get_surface_model("main").unwrap();
        assert_eq!(surface.components().ids(), vec!["slider", "custom"]);
    }

    #[test]
    fn test_messages_for_unknown_surface_are_dropped() {
        let processor = processor();
        let events = processor.process_messages([
            message(json!({"updateComponents": {"surfaceId": "ghost", "components": [
                {"id": "root", "component": "Text"}
            ]}})),
            message(json!({"updateDataModel": {"surfaceId": "ghost", "path": "/a", "value": 1}})),
            message(json!({"deleteSurface": {"surfaceId": "ghost"}})),
        ]);

        assert!(events.is_empty());
        assert!(processor.get_surface_model("ghost").is_none());
        assert!(processor.group().is_empty());
    }

    #[test]
    fn test_process_update_data_model() {
        let processor = processor();
        create(&processor, "main");

        let events = processor.process_message(message(json!({
            "updateDataModel": {"surfaceId": "main", "path": "/user/name", "value": "Ada"}
        })));
        assert_eq!(
            events,
            vec![ProcessorEvent::DataModelUpdated(DataModelUpdatedEvent {
                surface_id: "main".to_string(),
                updated_paths: vec!["/user/name".to_string()],
            })]
        );

        let surface = processor.get_surface_model("main").unwrap();
        assert_eq!(surface.data_model().get("/user"), Some(json!({"name": "Ada"})));

        processor.process_message(message(json!({
            "updateDataModel": {"surfaceId": "main", "path": "/user/name"}
        })));
        assert_eq!(surface.data_model().get("/user"), Some(json!({})));
    }

    #[test]
    fn test_update_data_model_defaults_to_root() {
        let processor = processor();
        create(&processor, "main");
        processor.process_message(message(json!({
            "updateDataModel": {"surfaceId": "main", "value": {"count": 2}}
        })));

        let surface = processor.get_surface_model("main").unwrap();
        assert_eq!(surface.data_model().get("/count"), Some(json!(2)));
    }

    #[test]
    fn test_process_delete_surface() {
        let processor = processor();
        create(&processor, "main");

        let events = processor.process_message(message(json!({"deleteSurface": {"surfaceId": "main"}})));
        assert_eq!(
            events,
            vec![ProcessorEvent::SurfaceDeleted(SurfaceDeletedEvent {
                surface_id: "main".to_string()
            })]
        );
        assert!(processor.get_surface_model("main").is_none());

        // A deleted id can be created again
        assert_eq!(create(&processor, "main").len(), 1);
    }

    #[test]
    fn test_block_input_is_a_no_op() {
        let processor = processor();
        create(&processor, "main");
        let events = processor.process_message(message(json!({"blockInput": {"surfaceId": "main"}})));
        assert!(events.is_empty());
        assert!(!processor.get_surface_model("main").unwrap().is_input_blocked());
    }

    #[test]
    fn test_lifecycle_listener_sees_processed_surfaces() {
        struct Recorder(Rc<RefCell<Vec<String>>>);

        impl SurfaceLifecycleListener for Recorder {
            fn on_surface_created(&self, surface: &Rc<SurfaceModel>) -> anyhow::Result<()> {
                self.0.borrow_mut().push(format!("+{}", surface.id()));
                Ok(())
            }

            fn on_surface_deleted(&self, surface_id: &str) -> anyhow::Result<()> {
                self.0.borrow_mut().push(format!("-{}", surface_id));
                Ok(())
            }
        }

        let processor = processor();
        let log = Rc::new(RefCell::new(Vec::new()));
        processor.add_lifecycle_listener(Recorder(Rc::clone(&log)));

        create(&processor, "a");
        create(&processor, "a");
        processor.process_message(message(json!({"deleteSurface": {"surfaceId": "a"}})));

        assert_eq!(*log.borrow(), vec!["+a", "-a"]);
    }

    #[test]
    fn test_legacy_flow() {
        let processor = processor();
        let events = processor.process_messages([
            message(json!({"surfaceUpdate": {"surfaceId": "main", "components": [
                {"id": "root-column", "component": {"Column": {"children": {"explicitList": ["title"]}}}},
                {"id": "title", "weight": 2, "component": {"Text": {"text": {"path": "/title"}}}}
            ]}})),
            message(json!({"dataModelUpdate": {"surfaceId": "main", "path": "/", "contents": [
                {"key": "title", "valueString": "Hello"},
                {"key": "user", "valueMap": [{"key": "age", "valueNumber": 42}]}
            ]}})),
            message(json!({"beginRendering": {"surfaceId": "main", "root": "root-column", "styles": {"primaryColor": "#007BFF"}}})),
        ]);

        assert!(matches!(events[0], ProcessorEvent::SurfaceCreated(_)));
        assert_eq!(events.len(), 3);

        let surface = processor.get_surface_model("main").unwrap();
        assert_eq!(surface.catalog().id(), "cat");
        assert_eq!(surface.root_component_id().as_deref(), Some("root-column"));
        assert_eq!(surface.theme()["primaryColor"], "#007BFF");

        let title = surface.components().get("title").unwrap();
        assert_eq!(title.component_type(), "Text");
        assert_eq!(title.property("weight"), Some(json!(2.0)));
        assert_eq!(surface.data_model().get("/title"), Some(json!("Hello")));
        assert_eq!(surface.data_model().get_number("/user/age"), Some(42.0));
    }

    #[test]
    fn test_legacy_catalog_from_config() {
        let config = ProcessorConfig {
            legacy_catalog_id: Some("second".to_string()),
            ..Default::default()
        };
        let processor =
            A2uiMessageProcessor::with_config([Catalog::new("first"), Catalog::new("second")], config);
        processor.process_message(message(json!({"beginRendering": {"surfaceId": "main", "root": "root"}})));

        let surface = processor.get_surface_model("main").unwrap();
        assert_eq!(surface.catalog().id(), "second");
    }

    #[test]
    fn test_legacy_messages_need_a_catalog() {
        let processor = A2uiMessageProcessor::new(Vec::<Catalog>::new());
        let events =
            processor.process_message(message(json!({"beginRendering": {"surfaceId": "main", "root": "root"}})));
        assert!(events.is_empty());
        assert!(processor.group().is_empty());
    }

    #[test]
    fn test_process_json_skips_bad_elements() {
        let processor = processor();
        let events = processor
            .process_json(
                r#"[
                    {"createSurface": {"surfaceId": "main", "catalogId": "cat"}},
                    {"somethingElse": {}},
                    {"updateDataModel": {"surfaceId": "main", "path": "/n", "value": 1}}
                ]"#,
            )
            .unwrap();

        assert_eq!(events.len(), 2);
        let surface = processor.get_surface_model("main").unwrap();
        assert_eq!(surface.data_model().get("/n"), Some(json!(1)));
    }

    #[test]
    fn test_process_json_repairs_model_output() {
        let processor = processor();
        let events = processor
            .process_json(
                r#"[
                    // opening the surface
                    {"version": "v0.9", "createSurface": {"surfaceId": "main", "catalogId": "cat"}},
                    {"updateDataModel": {"surfaceId": "main", "path": "/title", "value": "Hel"#,
            )
            .unwrap();

        assert_eq!(events.len(), 2);
        let surface = processor.get_surface_model("main").unwrap();
        assert_eq!(surface.data_model().get("/title"), Some(json!("Hel")));
    }

    #[test]
    fn test_process_json_without_repair_fails_on_bad_input() {
        let config = ProcessorConfig {
            repair_json: false,
            ..Default::default()
        };
        let processor = A2uiMessageProcessor::with_config([Catalog::new("cat")], config);
        assert!(processor.process_json(r#"[{"deleteSurface": {"surfaceId": "a"}},]"#).is_err());
        assert!(matches!(processor.process_json("42"), Err(A2uiError::InvalidMessage(_))));
    }

    #[test]
    fn test_process_jsonl() {
        let processor = processor();
        let events = processor.process_jsonl(concat!(
            r#"{"createSurface": {"surfaceId": "main", "catalogId": "cat"}}"#,
            "\n\n",
            "not json\n",
            r#"{"updateComponents": {"surfaceId": "main", "components": [{"id": "root", "component": "Text"}]}}"#,
            "\n",
        ));

        assert_eq!(events.len(), 2);
        assert_eq!(events[1].surface_id(), "main");
    }

    #[test]
    fn test_client_capabilities_list_configured_catalogs() {
        let processor = A2uiMessageProcessor::new([Catalog::new("a"), standard_catalog()]);
        let none: [&Catalog; 0] = [];
        let capabilities = processor.get_client_capabilities(none);
        assert_eq!(
            capabilities.supported_catalog_ids,
            vec!["a".to_string(), STANDARD_CATALOG_ID.to_string()]
        );
        assert!(capabilities.inline_catalogs.is_empty());

        let inline = processor.catalog(STANDARD_CATALOG_ID).unwrap();
        let capabilities = processor.get_client_capabilities([inline.as_ref()]);
        assert_eq!(capabilities.inline_catalogs[0].components.len(), 18);
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: ProcessorConfig = serde_json::from_value(json!({"legacyCatalogId": "cat"})).unwrap();
        assert_eq!(config.legacy_catalog_id.as_deref(), Some("cat"));
        assert!(config.validate_components);
        assert!(config.repair_json);
    }
}
