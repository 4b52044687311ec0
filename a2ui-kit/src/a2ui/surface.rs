//! A2UI Surface
//!
//! A surface is one independently addressable UI: its catalog, theme, data
//! model, component registry, and outbound action channel.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use serde_json::{Map, Value};

use super::catalog::Catalog;
use super::component::ComponentsModel;
use super::component_context::ComponentContext;
use super::data_context::DataContext;
use super::data_model::DataModel;
use super::listeners::{
    ActionListener, Listeners, SubscriptionHandle, action_listener, dispatch_sequentially,
    subscribe,
};

/// Component id the protocol reserves for a surface's root.
pub const ROOT_COMPONENT_ID: &str = "root";

/// State of a single surface.
///
/// Owned by a [`SurfaceGroupModel`](super::SurfaceGroupModel) between its
/// `createSurface` and `deleteSurface` messages.
pub struct SurfaceModel {
    id: String,
    catalog: Rc<Catalog>,
    theme: RefCell<Value>,

    /// Root id announced by a legacy `beginRendering`
    legacy_root: RefCell<Option<String>>,

    data_model: Rc<DataModel>,
    components: Rc<ComponentsModel>,
    action_listeners: Rc<Listeners<ActionListener>>,
}

impl SurfaceModel {
    pub fn new(id: impl Into<String>, catalog: Rc<Catalog>, theme: Option<Value>) -> Self {
        SurfaceModel {
            id: id.into(),
            catalog,
            theme: RefCell::new(theme.unwrap_or_else(|| Value::Object(Map::new()))),
            legacy_root: RefCell::new(None),
            data_model: Rc::new(DataModel::new()),
            components: Rc::new(ComponentsModel::new()),
            action_listeners: Rc::new(Listeners::new()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn catalog(&self) -> &Rc<Catalog> {
        &self.catalog
    }

    pub fn theme(&self) -> Value {
        self.theme.borrow().clone()
    }

    pub fn set_theme(&self, theme: Value) {
        *self.theme.borrow_mut() = theme;
    }

    pub fn data_model(&self) -> &Rc<DataModel> {
        &self.data_model
    }

    pub fn components(&self) -> &Rc<ComponentsModel> {
        &self.components
    }

    /// A data context at `path` over this surface's data model
    pub fn data_context(&self, path: &str) -> DataContext {
        DataContext::new(Rc::clone(&self.data_model), path)
    }

    /// `"root"` once such a component exists, else the legacy announced root.
    pub fn root_component_id(&self) -> Option<String> {
        if self.components.contains(ROOT_COMPONENT_ID) {
            return Some(ROOT_COMPONENT_ID.to_string());
        }
        self.legacy_root.borrow().clone()
    }

    /// Record the root announced by a legacy `beginRendering`
    pub fn set_root(&self, root: impl Into<String>) {
        *self.legacy_root.borrow_mut() = Some(root.into());
    }

    /// `blockInput` is accepted but not modeled, so input is never blocked.
    pub fn is_input_blocked(&self) -> bool {
        false
    }

    /// Bind a component to a data context rooted at `base_path`.
    ///
    /// Returns `None` if the component is not registered.
    pub fn create_component_context(
        self: &Rc<Self>,
        component_id: &str,
        base_path: &str,
    ) -> Option<ComponentContext> {
        let component = self.components.get(component_id)?;
        Some(ComponentContext::new(
            component,
            self.data_context(base_path),
            Rc::clone(self),
        ))
    }

    /// Register an async action listener
    pub fn add_action_listener<F, Fut>(&self, listener: F) -> SubscriptionHandle
    where
        F: Fn(Value) -> Fut + 'static,
        Fut: Future<Output = anyhow::Result<()>> + 'static,
    {
        self.add_boxed_action_listener(action_listener(listener))
    }

    pub(crate) fn add_boxed_action_listener(
        &self,
        listener: Rc<ActionListener>,
    ) -> SubscriptionHandle {
        subscribe(&self.action_listeners, listener)
    }

    pub fn action_listener_count(&self) -> usize {
        self.action_listeners.len()
    }

    /// Hand `action` to every action listener in turn.
    ///
    /// Listener failures are logged; this never fails.
    pub async fn dispatch_action(&self, action: Value) {
        let listeners = self.action_listeners.snapshot();
        let origin = format!("surface '{}'", self.id);
        dispatch_sequentially(listeners, action, &origin).await;
    }
}

impl fmt::Debug for SurfaceModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SurfaceModel")
            .field("id", &self.id)
            .field("catalog", &self.catalog.id())
            .field("components", &self.components.len())
            .field("action_listeners", &self.action_listeners.len())
            .finish()
    }
}
