//! A2UI Data Model
//!
//! The DataModel is an observable data store using JSON Pointer paths for access.
//! Subscribers register on a path and are notified synchronously whenever that
//! path, one of its ancestors, or one of its descendants changes.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::rc::{Rc, Weak};

use serde_json::{Map, Value};

use super::listeners::{IdSource, ListenerId, SubscriptionHandle, Unsubscribe};

/// Callback invoked with the value now stored at the subscribed path.
///
/// `None` means the path no longer resolves to anything.
pub type DataSubscriber = dyn Fn(Option<&Value>);

/// An observable data model that stores values accessible via JSON Pointer paths.
///
/// # Path Format
///
/// Paths follow JSON Pointer (RFC 6901) format:
/// - `/` or `""` - root
/// - `/foo` - property "foo"
/// - `/foo/bar` - nested property
/// - `/items/0` - array element at index 0
/// - `/items/0/name` - property of array element
///
/// Empty segments are ignored, so `/user//name/` addresses the same value as
/// `/user/name`.
///
/// # Notification order
///
/// A `set` notifies the exact path, then every ancestor up to the root, then
/// every subscribed descendant. Replacing the root notifies every subscriber.
///
/// # Example
///
/// ```rust
/// use a2ui_kit::a2ui::DataModel;
/// use serde_json::json;
///
/// let model = DataModel::new();
/// model.set("/user/name", json!("Alice"));
/// model.set("/items", json!([{"id": 1}, {"id": 2}]));
///
/// assert_eq!(model.get_string("/user/name").as_deref(), Some("Alice"));
/// assert_eq!(model.get_number("/items/1/id"), Some(2.0));
/// ```
pub struct DataModel {
    /// The root data value
    data: RefCell<Value>,

    /// Subscribers keyed by normalized path
    subscribers: Rc<PathSubscribers>,

    /// Set once by `dispose`; notifications stop for good
    disposed: Cell<bool>,

    /// Version counter for change detection
    version: Cell<u64>,
}

impl Default for DataModel {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DataModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataModel")
            .field("data", &self.data.borrow())
            .field("subscribed_paths", &self.subscribers.path_count())
            .field("disposed", &self.disposed.get())
            .field("version", &self.version.get())
            .finish()
    }
}

impl DataModel {
    /// Create a new data model with an empty object as root
    pub fn new() -> Self {
        Self::with_data(Value::Object(Map::new()))
    }

    /// Create a data model with initial data
    pub fn with_data(data: Value) -> Self {
        DataModel {
            data: RefCell::new(data),
            subscribers: Rc::new(PathSubscribers::default()),
            disposed: Cell::new(false),
            version: Cell::new(0),
        }
    }

    /// Get the current version number
    pub fn version(&self) -> u64 {
        self.version.get()
    }

    /// Whether `dispose` has been called
    pub fn is_disposed(&self) -> bool {
        self.disposed.get()
    }

    /// Get a copy of the value at the given path
    pub fn get(&self, path: &str) -> Option<Value> {
        let data = self.data.borrow();
        lookup(&data, &parse_pointer(path)).cloned()
    }

    /// Run `f` against the value at `path` without cloning it
    pub fn with_value<R>(&self, path: &str, f: impl FnOnce(Option<&Value>) -> R) -> R {
        let data = self.data.borrow();
        f(lookup(&data, &parse_pointer(path)))
    }

    /// Whether anything is stored at `path`
    pub fn contains(&self, path: &str) -> bool {
        self.with_value(path, |value| value.is_some())
    }

    /// Get a string value at the given path
    pub fn get_string(&self, path: &str) -> Option<String> {
        self.with_value(path, |v| v.and_then(Value::as_str).map(str::to_string))
    }

    /// Get a number value at the given path
    pub fn get_number(&self, path: &str) -> Option<f64> {
        self.with_value(path, |v| v.and_then(Value::as_f64))
    }

    /// Get a boolean value at the given path
    pub fn get_bool(&self, path: &str) -> Option<bool> {
        self.with_value(path, |v| v.and_then(Value::as_bool))
    }

    /// Get an array value at the given path
    pub fn get_array(&self, path: &str) -> Option<Vec<Value>> {
        self.with_value(path, |v| v.and_then(Value::as_array).cloned())
    }

    /// Get an object value at the given path
    pub fn get_object(&self, path: &str) -> Option<Map<String, Value>> {
        self.with_value(path, |v| v.and_then(Value::as_object).cloned())
    }

    /// Get a copy of the entire data
    pub fn snapshot(&self) -> Value {
        self.data.borrow().clone()
    }

    /// Set a value at the given path
    ///
    /// Creates intermediate objects/arrays as needed. Setting `/` or `""`
    /// replaces the whole tree.
    pub fn set(&self, path: &str, value: Value) {
        self.write(path, Some(value));
    }

    /// Remove the value at the given path
    ///
    /// Removing the root resets it to an empty object. Removing an array
    /// element other than the last leaves `null` in its slot.
    pub fn delete(&self, path: &str) {
        self.write(path, None);
    }

    /// Write `Some(value)` or remove the key on `None`, then notify.
    ///
    /// A write the path cannot hold, such as a non-numeric key into an
    /// array, changes nothing and notifies no one.
    pub fn write(&self, path: &str, value: Option<Value>) {
        let segments = parse_pointer(path);

        if segments.is_empty() {
            *self.data.borrow_mut() = value.unwrap_or_else(|| Value::Object(Map::new()));
            self.bump_version();
            self.notify_all();
            return;
        }

        let changed = {
            let mut data = self.data.borrow_mut();
            match value {
                Some(value) => insert_at(&mut data, &segments, value),
                None => {
                    remove_at(&mut data, &segments);
                    true
                }
            }
        };
        if !changed {
            ::log::debug!("[A2UI] Nothing written at {}", join_pointer(&segments));
            return;
        }
        self.bump_version();
        self.notify_path(&segments);
    }

    /// Subscribe to changes at a specific path.
    ///
    /// The callback fires for changes to the path itself, its ancestors'
    /// replacement, and its descendants. It is not called with the current
    /// value on registration.
    pub fn subscribe(
        &self,
        path: &str,
        callback: impl Fn(Option<&Value>) + 'static,
    ) -> SubscriptionHandle {
        self.subscribe_rc(path, Rc::new(callback))
    }

    pub(crate) fn subscribe_rc(
        &self,
        path: &str,
        callback: Rc<DataSubscriber>,
    ) -> SubscriptionHandle {
        if self.disposed.get() {
            return SubscriptionHandle::detached();
        }
        let key = normalize_path(path);
        let id = self.subscribers.insert(key, callback);
        let weak: Weak<PathSubscribers> = Rc::downgrade(&self.subscribers);
        SubscriptionHandle::new(id, weak)
    }

    /// Subscribe to a path and get a live [`Subscription`] holding its value.
    pub fn observe(&self, path: &str) -> Subscription {
        let subscription = Subscription::fixed(self.get(path));

        let value = Rc::clone(&subscription.value);
        let on_change = Rc::clone(&subscription.on_change);
        let handle = self.subscribe(path, move |new_value| {
            *value.borrow_mut() = new_value.cloned();
            // A handler that writes back to its own path must not re-enter itself.
            if let Ok(mut handler) = on_change.try_borrow_mut() {
                if let Some(handler) = handler.as_mut() {
                    handler(new_value);
                }
            }
        });

        Subscription {
            handle: Some(handle),
            ..subscription
        }
    }

    /// Number of active subscriptions across all paths
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Drop every subscription and silence all future notifications.
    pub fn dispose(&self) {
        self.disposed.set(true);
        self.subscribers.clear();
    }

    // ========================================================================
    // Private helpers
    // ========================================================================

    fn bump_version(&self) {
        self.version.set(self.version.get() + 1);
    }

    /// Notify the exact path, its ancestors, then subscribed descendants.
    fn notify_path(&self, segments: &[String]) {
        if self.disposed.get() {
            return;
        }

        let mut targets: Targets = Vec::new();
        {
            let data = self.data.borrow();
            let subscribers = self.subscribers.by_path.borrow();

            // Exact path first, then each ancestor up to the root.
            for depth in (0..=segments.len()).rev() {
                let key = join_pointer(&segments[..depth]);
                if let Some(callbacks) = subscribers.get(&key) {
                    let value = lookup(&data, &segments[..depth]).cloned();
                    targets.push((callbacks.iter().map(|(_, cb)| Rc::clone(cb)).collect(), value));
                }
            }

            let prefix = format!("{}/", join_pointer(segments));
            for (key, callbacks) in subscribers.range(prefix.clone()..) {
                if !key.starts_with(&prefix) {
                    break;
                }
                let value = lookup(&data, &parse_pointer(key)).cloned();
                targets.push((callbacks.iter().map(|(_, cb)| Rc::clone(cb)).collect(), value));
            }
        }

        fire(targets);
    }

    fn notify_all(&self) {
        if self.disposed.get() {
            return;
        }

        let targets: Targets = {
            let data = self.data.borrow();
            self.subscribers
                .by_path
                .borrow()
                .iter()
                .map(|(key, callbacks)| {
                    let value = lookup(&data, &parse_pointer(key)).cloned();
                    (callbacks.iter().map(|(_, cb)| Rc::clone(cb)).collect(), value)
                })
                .collect()
        };

        fire(targets);
    }
}

/// Callbacks to run, each group with the value at its path.
type Targets = Vec<(Vec<Rc<DataSubscriber>>, Option<Value>)>;

/// Invoke callbacks after every borrow on the model has been released.
fn fire(targets: Targets) {
    for (callbacks, value) in targets {
        for callback in callbacks {
            callback(value.as_ref());
        }
    }
}

/// A live view of one path in a [`DataModel`].
///
/// `value()` always reflects the latest notification. Register a change
/// handler with [`on_change`](Self::on_change).
pub struct Subscription {
    value: Rc<RefCell<Option<Value>>>,
    on_change: Rc<RefCell<Option<Box<dyn FnMut(Option<&Value>)>>>>,
    handle: Option<SubscriptionHandle>,
}

impl Subscription {
    /// A subscription whose value never changes
    pub(crate) fn fixed(value: Option<Value>) -> Self {
        Subscription {
            value: Rc::new(RefCell::new(value)),
            on_change: Rc::new(RefCell::new(None)),
            handle: None,
        }
    }

    /// Current value at the subscribed path
    pub fn value(&self) -> Option<Value> {
        self.value.borrow().clone()
    }

    /// Replace the change handler
    pub fn on_change(&self, handler: impl FnMut(Option<&Value>) + 'static) {
        *self.on_change.borrow_mut() = Some(Box::new(handler));
    }

    /// Whether this subscription tracks a data path (as opposed to a literal)
    pub fn is_live(&self) -> bool {
        self.handle.is_some()
    }

    /// Stop receiving updates. Static subscriptions ignore this.
    pub fn unsubscribe(&self) {
        if let Some(handle) = &self.handle {
            handle.unsubscribe();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("value", &self.value.borrow())
            .field("live", &self.is_live())
            .finish()
    }
}

/// Subscriber storage keyed by normalized path.
#[derive(Default)]
struct PathSubscribers {
    by_path: RefCell<BTreeMap<String, Vec<(ListenerId, Rc<DataSubscriber>)>>>,
    paths_by_id: RefCell<HashMap<ListenerId, String>>,
    ids: IdSource,
}

impl PathSubscribers {
    fn insert(&self, key: String, callback: Rc<DataSubscriber>) -> ListenerId {
        let id = self.ids.next_id();
        self.paths_by_id.borrow_mut().insert(id, key.clone());
        self.by_path
            .borrow_mut()
            .entry(key)
            .or_default()
            .push((id, callback));
        id
    }

    fn len(&self) -> usize {
        self.paths_by_id.borrow().len()
    }

    fn path_count(&self) -> usize {
        self.by_path.borrow().len()
    }

    fn clear(&self) {
        self.by_path.borrow_mut().clear();
        self.paths_by_id.borrow_mut().clear();
    }
}

impl Unsubscribe for PathSubscribers {
    fn remove(&self, id: ListenerId) -> bool {
        let Some(key) = self.paths_by_id.borrow_mut().remove(&id) else {
            return false;
        };
        let mut by_path = self.by_path.borrow_mut();
        if let Some(callbacks) = by_path.get_mut(&key) {
            callbacks.retain(|(entry_id, _)| *entry_id != id);
            if callbacks.is_empty() {
                by_path.remove(&key);
            }
        }
        true
    }
}

// ============================================================================
// JSON Pointer helpers
// ============================================================================

/// Parse a JSON Pointer path into unescaped segments, dropping empty ones.
pub(crate) fn parse_pointer(path: &str) -> Vec<String> {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| segment.replace("~1", "/").replace("~0", "~"))
        .collect()
}

/// Build a normalized pointer from unescaped segments. No segments is `/`.
pub(crate) fn join_pointer(segments: &[String]) -> String {
    if segments.is_empty() {
        return "/".to_string();
    }
    segments.iter().fold(String::new(), |mut acc, segment| {
        acc.push('/');
        acc.push_str(&segment.replace('~', "~0").replace('/', "~1"));
        acc
    })
}

/// Normalize a pointer: drop empty segments and trailing slashes.
pub(crate) fn normalize_path(path: &str) -> String {
    join_pointer(&parse_pointer(path))
}

fn lookup<'a>(root: &'a Value, segments: &[String]) -> Option<&'a Value> {
    segments.iter().try_fold(root, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

fn is_index(segment: &str) -> bool {
    !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit())
}

fn empty_container(for_segment: &str) -> Value {
    if is_index(for_segment) {
        Value::Array(Vec::new())
    } else {
        Value::Object(Map::new())
    }
}

/// Step into `segment`, creating it as a container suited to `next`.
///
/// Scalars and nulls on the way are replaced with containers.
fn step_or_create<'a>(current: &'a mut Value, segment: &str, next: &str) -> Option<&'a mut Value> {
    if !current.is_object() && !current.is_array() {
        *current = empty_container(segment);
    }
    let slot = match current {
        Value::Object(map) => map
            .entry(segment.to_string())
            .or_insert_with(|| empty_container(next)),
        Value::Array(items) => {
            let index = segment.parse::<usize>().ok()?;
            if items.len() <= index {
                items.resize(index + 1, Value::Null);
            }
            &mut items[index]
        }
        _ => return None,
    };
    if !slot.is_object() && !slot.is_array() {
        *slot = empty_container(next);
    }
    Some(slot)
}

/// Store `value` at `segments`. Returns `false` if the path cannot hold it.
fn insert_at(root: &mut Value, segments: &[String], value: Value) -> bool {
    let Some((last, parents)) = segments.split_last() else {
        *root = value;
        return true;
    };

    let mut current = root;
    for (i, segment) in parents.iter().enumerate() {
        match step_or_create(current, segment, &segments[i + 1]) {
            Some(next) => current = next,
            None => return false,
        }
    }

    if !current.is_object() && !current.is_array() {
        *current = empty_container(last);
    }
    match current {
        Value::Object(map) => {
            map.insert(last.clone(), value);
            true
        }
        Value::Array(items) => {
            // Non-numeric keys cannot address an array slot.
            let Ok(index) = last.parse::<usize>() else {
                return false;
            };
            if index < items.len() {
                items[index] = value;
            } else {
                items.resize(index, Value::Null);
                items.push(value);
            }
            true
        }
        _ => false,
    }
}

fn remove_at(root: &mut Value, segments: &[String]) {
    let Some((last, parents)) = segments.split_last() else {
        return;
    };

    let mut current = root;
    for segment in parents {
        let next = match current {
            Value::Object(map) => map.get_mut(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get_mut(i)),
            _ => None,
        };
        match next {
            Some(next) => current = next,
            None => return,
        }
    }

    match current {
        Value::Object(map) => {
            map.shift_remove(last);
        }
        // Later elements keep their indices: the last slot is dropped, any
        // other is left as a null hole.
        Value::Array(items) => {
            if let Ok(index) = last.parse::<usize>() {
                if index + 1 == items.len() {
                    items.pop();
                } else if let Some(slot) = items.get_mut(index) {
                    *slot = Value::Null;
                }
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> DataModel {
        DataModel::with_data(json!({
            "user": {"name": "Alice", "settings": {"theme": "dark"}},
            "items": ["a", "b", "c"]
        }))
    }

    fn recorder() -> (Rc<RefCell<Vec<Option<Value>>>>, impl Fn(Option<&Value>) + 'static) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        (seen, move |value: Option<&Value>| sink.borrow_mut().push(value.cloned()))
    }

    #[test]
    fn test_get_set_basic() {
        let model = DataModel::new();

        model.set("/name", json!("Alice"));
        assert_eq!(model.get_string("/name").as_deref(), Some("Alice"));

        model.set("/count", json!(42));
        assert_eq!(model.get_number("/count"), Some(42.0));

        model.set("/enabled", json!(true));
        assert_eq!(model.get_bool("/enabled"), Some(true));
    }

    #[test]
    fn test_root_aliases() {
        let model = sample();
        assert_eq!(model.get("/"), model.get(""));
        assert_eq!(model.get("/user/settings/theme"), Some(json!("dark")));
        assert_eq!(model.get("/items/1"), Some(json!("b")));
    }

    #[test]
    fn test_missing_paths_are_none() {
        let model = sample();
        assert_eq!(model.get("/user/age"), None);
        assert_eq!(model.get("/unknown/path"), None);
        assert_eq!(model.get("/user/name/first"), None);
        assert_eq!(model.get("/items/9"), None);
    }

    #[test]
    fn test_creates_intermediate_containers() {
        let model = DataModel::new();

        model.set("/a/b/0/c", json!(123));
        assert_eq!(model.get("/a/b/0/c"), Some(json!(123)));
        assert!(model.get("/a/b").is_some_and(|v| v.is_array()));
        assert!(model.get("/a/b/0").is_some_and(|v| v.is_object()));

        model.set("/nested/0/0", json!("inner"));
        assert!(model.get("/nested").is_some_and(|v| v.is_array()));
        assert!(model.get("/nested/0").is_some_and(|v| v.is_array()));
    }

    #[test]
    fn test_array_append_and_pad() {
        let model = DataModel::new();

        model.set("/list/0", json!("hello"));
        model.set("/list/1", json!("world"));
        assert_eq!(model.get("/list"), Some(json!(["hello", "world"])));

        model.set("/list/3", json!("far"));
        assert_eq!(model.get("/list"), Some(json!(["hello", "world", null, "far"])));
    }

    #[test]
    fn test_delete_removes_key() {
        let model = sample();

        model.delete("/user/name");
        assert_eq!(model.get("/user/name"), None);
        let user = model.get_object("/user").unwrap();
        assert!(!user.contains_key("name"));

        model.write("/user/settings", None);
        assert!(!model.contains("/user/settings"));
    }

    #[test]
    fn test_delete_array_element_keeps_later_indices() {
        let model = DataModel::with_data(json!({"list": ["a", "b", "c"]}));
        let (middle_seen, middle) = recorder();
        let (last_seen, last) = recorder();
        model.subscribe("/list/1", middle);
        model.subscribe("/list/2", last);

        model.delete("/list/1");
        assert_eq!(model.get("/list"), Some(json!(["a", null, "c"])));
        assert_eq!(model.get("/list/2"), Some(json!("c")));
        assert_eq!(*middle_seen.borrow(), vec![Some(Value::Null)]);
        assert!(last_seen.borrow().is_empty());

        model.delete("/list/2");
        assert_eq!(model.get("/list/2"), None);
        assert_eq!(model.get("/list"), Some(json!(["a", null])));
        assert_eq!(*last_seen.borrow(), vec![None]);
    }

    #[test]
    fn test_non_numeric_array_key_changes_nothing() {
        let model = DataModel::with_data(json!({"list": ["a"]}));
        let (seen, callback) = recorder();
        model.subscribe("/list", callback);
        let version = model.version();

        model.set("/list/name", json!("x"));
        assert_eq!(model.get("/list"), Some(json!(["a"])));
        assert_eq!(model.version(), version);
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_root_replacement() {
        let model = sample();
        model.set("/", json!({"newRoot": true}));
        assert_eq!(model.snapshot(), json!({"newRoot": true}));

        model.delete("");
        assert_eq!(model.snapshot(), json!({}));
    }

    #[test]
    fn test_escaped_segments() {
        let model = DataModel::new();
        model.set("/a~1b/c~0d", json!(1));
        assert_eq!(model.snapshot(), json!({"a/b": {"c~d": 1}}));
        assert_eq!(model.get("/a~1b/c~0d"), Some(json!(1)));
    }

    #[test]
    fn test_notifies_exact_path() {
        let model = sample();
        let (seen, callback) = recorder();
        model.subscribe("/user/name", callback);

        model.set("/user/name", json!("Charlie"));
        assert_eq!(*seen.borrow(), vec![Some(json!("Charlie"))]);
    }

    #[test]
    fn test_notifies_ancestors_with_updated_value() {
        let model = sample();
        let (seen, callback) = recorder();
        model.subscribe("/user", callback);

        model.set("/user/name", json!("Dave"));
        let seen = seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].as_ref().unwrap()["name"], "Dave");
    }

    #[test]
    fn test_notifies_descendants_on_replacement() {
        let model = sample();
        let (seen, callback) = recorder();
        model.subscribe("/user/settings/theme", callback);

        model.set("/user/settings", json!({"theme": "light"}));
        assert_eq!(*seen.borrow(), vec![Some(json!("light"))]);
    }

    #[test]
    fn test_descendant_scan_does_not_match_siblings() {
        let model = sample();
        let (seen, callback) = recorder();
        model.subscribe("/username", callback);

        model.set("/user", json!({}));
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_root_subscriber_sees_child_writes() {
        let model = sample();
        let (seen, callback) = recorder();
        model.subscribe("/", callback);

        model.set("/newProp", json!("test"));
        assert_eq!(seen.borrow()[0].as_ref().unwrap()["newProp"], "test");
    }

    #[test]
    fn test_root_replacement_notifies_everyone() {
        let model = sample();
        let (root_seen, root_cb) = recorder();
        let (leaf_seen, leaf_cb) = recorder();
        model.subscribe("", root_cb);
        model.subscribe("/user/name", leaf_cb);

        model.set("/", json!({"user": {"name": "Eve"}}));
        assert_eq!(root_seen.borrow()[0], Some(json!({"user": {"name": "Eve"}})));
        assert_eq!(*leaf_seen.borrow(), vec![Some(json!("Eve"))]);
    }

    #[test]
    fn test_deletion_notifies_with_none() {
        let model = sample();
        let (seen, callback) = recorder();
        model.subscribe("/user/name", callback);

        model.delete("/user/name");
        assert_eq!(*seen.borrow(), vec![None]);
    }

    #[test]
    fn test_unsubscribe_frees_path() {
        let model = sample();
        let (seen, callback) = recorder();
        let (_other_seen, other) = recorder();
        let handle = model.subscribe("/a", callback);
        let other_handle = model.subscribe("/a", other);
        assert_eq!(model.subscriber_count(), 2);

        assert!(handle.unsubscribe());
        model.set("/a", json!(1));
        assert!(seen.borrow().is_empty());
        assert_eq!(model.subscriber_count(), 1);

        other_handle.unsubscribe();
        assert_eq!(model.subscriber_count(), 0);
        assert_eq!(model.subscribers.path_count(), 0);
    }

    #[test]
    fn test_observe_tracks_value() {
        let model = DataModel::new();
        model.set("/a", json!(1));

        let subscription = model.observe("/a");
        assert_eq!(subscription.value(), Some(json!(1)));

        let last = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&last);
        subscription.on_change(move |value| *sink.borrow_mut() = value.cloned());

        model.set("/a", json!(2));
        assert_eq!(subscription.value(), Some(json!(2)));
        assert_eq!(*last.borrow(), Some(json!(2)));

        subscription.unsubscribe();
        model.set("/a", json!(3));
        assert_eq!(*last.borrow(), Some(json!(2)));
    }

    #[test]
    fn test_dispose_silences_callbacks() {
        let model = sample();
        let (seen, callback) = recorder();
        model.subscribe("/", callback);

        model.dispose();
        model.set("/foo", json!("bar"));
        assert!(seen.borrow().is_empty());
        assert_eq!(model.get("/foo"), Some(json!("bar")));
        assert_eq!(model.subscriber_count(), 0);
    }

    #[test]
    fn test_version() {
        let model = DataModel::new();

        let v0 = model.version();
        model.set("/name", json!("Alice"));
        assert!(model.version() > v0);
    }

    #[test]
    fn test_subscriber_may_write_back() {
        let model = Rc::new(DataModel::new());
        let weak = Rc::downgrade(&model);
        model.subscribe("/input", move |value| {
            if let (Some(model), Some(value)) = (weak.upgrade(), value) {
                model.set("/mirror", value.clone());
            }
        });

        model.set("/input", json!("typed"));
        assert_eq!(model.get("/mirror"), Some(json!("typed")));
    }
}
