//! A2UI Surface Group
//!
//! The set of active surfaces. Every surface's actions are relayed to the
//! group's own action listeners so one handler can serve all surfaces.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;
use serde_json::Value;

use super::listeners::{
    ActionListener, Listeners, SubscriptionHandle, action_listener, dispatch_sequentially,
    subscribe,
};
use super::surface::SurfaceModel;

/// Observer of surface creation and deletion.
///
/// Both methods default to doing nothing. Returned errors are logged.
pub trait SurfaceLifecycleListener {
    fn on_surface_created(&self, _surface: &Rc<SurfaceModel>) -> anyhow::Result<()> {
        Ok(())
    }

    fn on_surface_deleted(&self, _surface_id: &str) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Root state: all surfaces that have been created and not yet deleted.
#[derive(Default)]
pub struct SurfaceGroupModel {
    surfaces: RefCell<IndexMap<String, Rc<SurfaceModel>>>,

    /// Per-surface subscription forwarding its actions to this group
    relays: RefCell<HashMap<String, SubscriptionHandle>>,

    lifecycle_listeners: Rc<Listeners<dyn SurfaceLifecycleListener>>,
    action_listeners: Rc<Listeners<ActionListener>>,
}

impl SurfaceGroupModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a surface.
    ///
    /// Returns `false` and leaves the group untouched if the id is taken.
    pub fn add_surface(&self, surface: Rc<SurfaceModel>) -> bool {
        let id = surface.id().to_string();
        if self.surfaces.borrow().contains_key(&id) {
            ::log::warn!("[A2UI] Surface {} already exists, ignoring", id);
            return false;
        }

        let relay = self.relay_for(&id);
        let handle = surface.add_boxed_action_listener(relay);
        self.relays.borrow_mut().insert(id.clone(), handle);
        self.surfaces.borrow_mut().insert(id.clone(), Rc::clone(&surface));
        ::log::debug!("[A2UI] Surface {} created", id);

        for listener in self.lifecycle_listeners.snapshot() {
            if let Err(err) = listener.on_surface_created(&surface) {
                ::log::error!("[A2UI] Error in on_surface_created listener: {:#}", err);
            }
        }
        true
    }

    /// Remove a surface and tear down its action relay.
    ///
    /// Unknown ids are ignored. Returns the removed surface.
    pub fn delete_surface(&self, surface_id: &str) -> Option<Rc<SurfaceModel>> {
        let surface = self.surfaces.borrow_mut().shift_remove(surface_id)?;
        if let Some(relay) = self.relays.borrow_mut().remove(surface_id) {
            relay.unsubscribe();
        }
        ::log::debug!("[A2UI] Surface {} deleted", surface_id);

        for listener in self.lifecycle_listeners.snapshot() {
            if let Err(err) = listener.on_surface_deleted(surface_id) {
                ::log::error!("[A2UI] Error in on_surface_deleted listener: {:#}", err);
            }
        }
        Some(surface)
    }

    pub fn get_surface(&self, surface_id: &str) -> Option<Rc<SurfaceModel>> {
        self.surfaces.borrow().get(surface_id).cloned()
    }

    /// Surface ids in creation order
    pub fn surface_ids(&self) -> Vec<String> {
        self.surfaces.borrow().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.surfaces.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.borrow().is_empty()
    }

    pub fn add_lifecycle_listener(
        &self,
        listener: impl SurfaceLifecycleListener + 'static,
    ) -> SubscriptionHandle {
        let listener: Rc<dyn SurfaceLifecycleListener> = Rc::new(listener);
        subscribe(&self.lifecycle_listeners, listener)
    }

    /// Register an async listener for actions from any surface
    pub fn add_action_listener<F, Fut>(&self, listener: F) -> SubscriptionHandle
    where
        F: Fn(Value) -> Fut + 'static,
        Fut: Future<Output = anyhow::Result<()>> + 'static,
    {
        subscribe(&self.action_listeners, action_listener(listener))
    }

    /// Hand `action` to every group-level action listener in turn
    pub async fn dispatch_action(&self, action: Value) {
        let listeners = self.action_listeners.snapshot();
        dispatch_sequentially(listeners, action, "surface group").await;
    }

    /// A surface action listener forwarding into this group.
    ///
    /// Holds the group's registry weakly so a dropped group stops relaying.
    fn relay_for(&self, surface_id: &str) -> Rc<ActionListener> {
        let group_listeners: Weak<Listeners<ActionListener>> =
            Rc::downgrade(&self.action_listeners);
        let origin = format!("surface group (from '{}')", surface_id);

        action_listener(move |action| {
            let listeners = group_listeners
                .upgrade()
                .map(|registry| registry.snapshot())
                .unwrap_or_default();
            let origin = origin.clone();
            async move {
                dispatch_sequentially(listeners, action, &origin).await;
                Ok::<(), anyhow::Error>(())
            }
        })
    }
}

impl fmt::Debug for SurfaceGroupModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SurfaceGroupModel")
            .field("surfaces", &self.surface_ids())
            .field("lifecycle_listeners", &self.lifecycle_listeners.len())
            .field("action_listeners", &self.action_listeners.len())
            .finish()
    }
}
