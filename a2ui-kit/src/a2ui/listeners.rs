//! A2UI Listener Registries
//!
//! Every observable piece of engine state (data model paths, component
//! updates, surface lifecycle, action streams) keeps its callbacks in a
//! registry and hands out a [`SubscriptionHandle`] instead of a closure.
//! The handle only holds a weak reference back to its registry, so a handle
//! that outlives its registry is harmless.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::rc::{Rc, Weak};

use futures::FutureExt;
use futures::future::LocalBoxFuture;
use serde_json::Value;

/// Identifies one registered listener inside a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

/// Something a [`SubscriptionHandle`] can remove itself from.
pub(crate) trait Unsubscribe {
    fn remove(&self, id: ListenerId) -> bool;
}

/// Monotonic id source shared by the registries.
#[derive(Debug, Default)]
pub(crate) struct IdSource {
    next: Cell<u64>,
}

impl IdSource {
    pub(crate) fn next_id(&self) -> ListenerId {
        let id = self.next.get();
        self.next.set(id + 1);
        ListenerId(id)
    }
}

/// An ordered set of listeners of type `F`.
///
/// Listeners are invoked in registration order. Callers always work on a
/// [`snapshot`](Listeners::snapshot) so a listener may add or remove
/// listeners while being notified.
pub(crate) struct Listeners<F: ?Sized> {
    entries: RefCell<Vec<(ListenerId, Rc<F>)>>,
    ids: IdSource,
}

impl<F: ?Sized> Default for Listeners<F> {
    fn default() -> Self {
        Self {
            entries: RefCell::new(Vec::new()),
            ids: IdSource::default(),
        }
    }
}

impl<F: ?Sized> Listeners<F> {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener, returning its id
    pub fn insert(&self, listener: Rc<F>) -> ListenerId {
        let id = self.ids.next_id();
        self.entries.borrow_mut().push((id, listener));
        id
    }

    /// Remove a listener by id. Returns `false` if it was not registered.
    pub fn remove(&self, id: ListenerId) -> bool {
        let mut entries = self.entries.borrow_mut();
        match entries.iter().position(|(entry_id, _)| *entry_id == id) {
            Some(index) => {
                entries.remove(index);
                true
            }
            None => false,
        }
    }

    /// Clone the current listeners out of the registry
    pub fn snapshot(&self) -> Vec<Rc<F>> {
        self.entries
            .borrow()
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }
}

impl<F: ?Sized> Unsubscribe for Listeners<F> {
    fn remove(&self, id: ListenerId) -> bool {
        Listeners::remove(self, id)
    }
}

impl<F: ?Sized> fmt::Debug for Listeners<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("len", &self.len())
            .finish()
    }
}

/// Register `listener` in `registry` and return a handle that can remove it.
pub(crate) fn subscribe<F: ?Sized + 'static>(
    registry: &Rc<Listeners<F>>,
    listener: Rc<F>,
) -> SubscriptionHandle {
    let id = registry.insert(listener);
    let weak: Weak<Listeners<F>> = Rc::downgrade(registry);
    SubscriptionHandle::new(id, weak)
}

/// Handle returned by every `subscribe`/`add_*_listener` call.
///
/// Dropping the handle does not unsubscribe; call [`unsubscribe`](Self::unsubscribe).
#[derive(Clone)]
pub struct SubscriptionHandle {
    id: ListenerId,
    registry: Option<Weak<dyn Unsubscribe>>,
}

impl SubscriptionHandle {
    pub(crate) fn new(id: ListenerId, registry: Weak<dyn Unsubscribe>) -> Self {
        Self {
            id,
            registry: Some(registry),
        }
    }

    /// A handle that is not attached to anything.
    pub(crate) fn detached() -> Self {
        Self {
            id: ListenerId(u64::MAX),
            registry: None,
        }
    }

    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Remove the listener. Returns `true` if it was still registered.
    ///
    /// Calling this more than once is a no-op.
    pub fn unsubscribe(&self) -> bool {
        self.registry
            .as_ref()
            .and_then(Weak::upgrade)
            .map(|registry| registry.remove(self.id))
            .unwrap_or(false)
    }
}

impl fmt::Debug for SubscriptionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionHandle")
            .field("id", &self.id)
            .field("attached", &self.registry.is_some())
            .finish()
    }
}

/// Asynchronous receiver of outbound user actions.
pub type ActionListener = dyn Fn(Value) -> LocalBoxFuture<'static, anyhow::Result<()>>;

/// Box an async closure into an [`ActionListener`].
pub(crate) fn action_listener<F, Fut>(listener: F) -> Rc<ActionListener>
where
    F: Fn(Value) -> Fut + 'static,
    Fut: Future<Output = anyhow::Result<()>> + 'static,
{
    Rc::new(move |action| listener(action).boxed_local())
}

/// Await every listener in turn with its own copy of `action`.
///
/// Errors and panics are logged per listener and never stop the loop.
pub(crate) async fn dispatch_sequentially(
    listeners: Vec<Rc<ActionListener>>,
    action: Value,
    origin: &str,
) {
    for listener in listeners {
        let payload = action.clone();
        let outcome = AssertUnwindSafe(async move { listener(payload).await })
            .catch_unwind()
            .await;
        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                ::log::error!("[A2UI] Action listener on {} failed: {:#}", origin, err);
            }
            Err(_) => {
                ::log::error!("[A2UI] Action listener on {} panicked", origin);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_snapshot_keep_order() {
        let registry: Listeners<dyn Fn() -> u32> = Listeners::new();
        registry.insert(Rc::new(|| 1));
        registry.insert(Rc::new(|| 2));

        let results: Vec<u32> = registry.snapshot().iter().map(|f| f()).collect();
        assert_eq!(results, vec![1, 2]);
    }

    #[test]
    fn test_handle_unsubscribes_once() {
        let registry: Rc<Listeners<dyn Fn()>> = Rc::new(Listeners::new());
        let listener: Rc<dyn Fn()> = Rc::new(|| {});
        let handle = subscribe(&registry, listener);
        assert_eq!(registry.len(), 1);

        assert!(handle.unsubscribe());
        assert_eq!(registry.len(), 0);
        assert!(!handle.unsubscribe());
    }

    #[test]
    fn test_handle_outliving_registry() {
        let registry: Rc<Listeners<dyn Fn()>> = Rc::new(Listeners::new());
        let listener: Rc<dyn Fn()> = Rc::new(|| {});
        let handle = subscribe(&registry, listener);
        drop(registry);
        assert!(!handle.unsubscribe());
    }

    #[test]
    fn test_dispatch_continues_after_failure() {
        let seen = Rc::new(RefCell::new(Vec::new()));

        let failing = action_listener(|_| async { Err::<(), _>(anyhow::anyhow!("boom")) });
        let seen_clone = Rc::clone(&seen);
        let recording = action_listener(move |action| {
            seen_clone.borrow_mut().push(action);
            async { Ok::<(), anyhow::Error>(()) }
        });

        futures::executor::block_on(dispatch_sequentially(
            vec![failing, recording],
            serde_json::json!({"name": "submit"}),
            "test",
        ));

        assert_eq!(seen.borrow().len(), 1);
        assert_eq!(seen.borrow()[0]["name"], "submit");
    }

    #[test]
    fn test_dispatch_survives_panicking_listener() {
        let count = Rc::new(Cell::new(0));

        let panicking = action_listener(|action: Value| async move {
            if action.is_null() {
                panic!("listener bug");
            }
            Ok::<(), anyhow::Error>(())
        });
        let count_clone = Rc::clone(&count);
        let counting = action_listener(move |_| {
            count_clone.set(count_clone.get() + 1);
            async { Ok::<(), anyhow::Error>(()) }
        });

        futures::executor::block_on(dispatch_sequentially(
            vec![panicking, counting],
            Value::Null,
            "test",
        ));

        assert_eq!(count.get(), 1);
    }
}
