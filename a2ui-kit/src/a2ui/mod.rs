//! A2UI Protocol Implementation
//!
//! A2UI (Agent-to-UI) is a declarative JSON protocol for AI agents to generate
//! rich, interactive UIs. This module keeps the client-side state of those UIs
//! in sync with the message stream, independent of any rendering toolkit.
//!
//! # Architecture
//!
//! ```text
//! A2UI JSON Messages
//!        ↓
//! A2uiMessageProcessor ──→ ProcessorEvent
//!        ↓
//! SurfaceGroupModel
//!        ↓
//! SurfaceModel (catalog, theme)
//!   ┌────┴──────┐
//!   │           │
//! DataModel  ComponentsModel
//!   │           │
//!   └────┬──────┘
//!        ↓
//! DataContext + ComponentContext (used by renderers)
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use a2ui_kit::a2ui::*;
//!
//! let processor = A2uiMessageProcessor::new([Catalog::new("my-catalog")]);
//! processor.process_json(r#"[
//!     {"createSurface": {"surfaceId": "main", "catalogId": "my-catalog"}},
//!     {"updateDataModel": {"surfaceId": "main", "path": "/count", "value": 1}}
//! ]"#)?;
//!
//! let surface = processor.get_surface_model("main").unwrap();
//! assert_eq!(surface.data_model().get("/count"), Some(serde_json::json!(1)));
//! ```

mod capabilities;
mod catalog;
mod component;
mod component_context;
mod data_context;
mod data_model;
mod error;
mod listeners;
mod message;
mod processor;
mod repair;
mod schema;
mod standard_catalog;
mod surface;
mod surface_group;
mod value;

pub use capabilities::*;
pub use catalog::*;
pub use component::*;
pub use component_context::*;
pub use data_context::*;
pub use data_model::{DataModel, DataSubscriber, Subscription};
pub use error::*;
pub use listeners::{ActionListener, ListenerId, SubscriptionHandle};
pub use message::*;
pub use processor::*;
pub use repair::repair_json;
pub use schema::{COMMON_TYPES_DOCUMENT, CommonType, Schema, SchemaIssue, SchemaKind, conforms};
pub use standard_catalog::*;
pub use surface::*;
pub use surface_group::*;
pub use value::*;
