//! A2UI Data Context
//!
//! A scoped view of a surface's [`DataModel`]. Components read and write
//! relative to their own position in the data tree; list templates derive a
//! [`nested`](DataContext::nested) context per repeated item.

use std::rc::Rc;

use serde_json::Value;

use super::data_model::{DataModel, Subscription};
use super::listeners::SubscriptionHandle;
use super::value::{DynamicValue, value_to_string};

/// A `(data model, absolute path)` pair.
///
/// Cloning is cheap and never copies data.
#[derive(Debug, Clone)]
pub struct DataContext {
    model: Rc<DataModel>,
    path: String,
}

impl DataContext {
    /// Create a context rooted at `path`
    pub fn new(model: Rc<DataModel>, path: impl Into<String>) -> Self {
        DataContext {
            model,
            path: path.into(),
        }
    }

    /// The absolute path this context points to
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn data_model(&self) -> &Rc<DataModel> {
        &self.model
    }

    /// Resolve a path against this context.
    /// - If path starts with `/`, it's absolute (use as-is)
    /// - `""` or `"."` is the context's own path
    /// - Otherwise, it's relative (appended to the context path)
    pub fn resolve_path(&self, path: &str) -> String {
        if path.starts_with('/') {
            return path.to_string();
        }
        if path.is_empty() || path == "." {
            return self.path.clone();
        }

        let base = self.path.trim_end_matches('/');
        format!("{}/{}", base, path)
    }

    /// Read a snapshot of the value at `path`
    pub fn get(&self, path: &str) -> Option<Value> {
        self.model.get(&self.resolve_path(path))
    }

    /// Write a value through to the data model
    pub fn set(&self, path: &str, value: Value) {
        self.model.set(&self.resolve_path(path), value);
    }

    /// Write `Some(value)` or delete on `None`
    pub fn update(&self, path: &str, value: Option<Value>) {
        self.model.write(&self.resolve_path(path), value);
    }

    /// Subscribe to changes at a path relative to this context
    pub fn subscribe(
        &self,
        path: &str,
        callback: impl Fn(Option<&Value>) + 'static,
    ) -> SubscriptionHandle {
        self.model.subscribe(&self.resolve_path(path), callback)
    }

    /// Derive a child context, e.g. for one item of a list template
    pub fn nested(&self, relative_path: &str) -> DataContext {
        DataContext::new(Rc::clone(&self.model), self.resolve_path(relative_path))
    }

    /// Evaluate a dynamic value.
    ///
    /// Function calls are not evaluated and come back as their descriptor.
    pub fn resolve_dynamic_value(&self, value: &DynamicValue) -> Option<Value> {
        match value {
            DynamicValue::Literal(literal) => Some(literal.clone()),
            DynamicValue::Path(path) => self.get(path),
            DynamicValue::FunctionCall(_) => Some(value.to_json()),
        }
    }

    /// Evaluate a raw property value
    pub fn resolve(&self, raw: &Value) -> Option<Value> {
        self.resolve_dynamic_value(&DynamicValue::from_json(raw))
    }

    /// Track a dynamic value.
    ///
    /// Literals and function calls yield a static subscription.
    pub fn subscribe_dynamic_value(&self, value: &DynamicValue) -> Subscription {
        match value {
            DynamicValue::Path(path) => self.model.observe(&self.resolve_path(path)),
            other => Subscription::fixed(self.resolve_dynamic_value(other)),
        }
    }

    /// Resolve to a display string; missing values become empty
    pub fn resolve_string(&self, raw: &Value) -> String {
        self.resolve(raw)
            .as_ref()
            .and_then(value_to_string)
            .unwrap_or_default()
    }

    /// Resolve to a number; missing or non-numeric values become `0.0`
    pub fn resolve_number(&self, raw: &Value) -> f64 {
        self.resolve(raw).and_then(|v| v.as_f64()).unwrap_or(0.0)
    }

    /// Resolve to a boolean; missing or non-boolean values become `false`
    pub fn resolve_bool(&self, raw: &Value) -> bool {
        self.resolve(raw).and_then(|v| v.as_bool()).unwrap_or(false)
    }
}
