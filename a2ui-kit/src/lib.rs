//! # Description
//!
//! A2UI Kit is a Rust crate implementing the client-side state engine of the
//! A2UI (Agent-to-UI) protocol: it consumes the message stream an agent
//! produces and maintains, per surface, the component registry and the data
//! model a renderer draws from.
//!
//! # Features
//!
//! - 📨 Processes `createSurface`, `updateComponents`, `updateDataModel` and
//!   `deleteSurface`, plus the earlier `beginRendering` / `surfaceUpdate` /
//!   `dataModelUpdate` revision.
//! - 🔗 JSON Pointer data model with change notification for exact, ancestor
//!   and descendant paths.
//! - 🧩 Explicit component catalogs with schema validation and capability
//!   manifests. The standard catalog is included.
//! - 🛠️ Lenient parsing of model-generated JSON.
//!
//! Everything is single-threaded (`Rc`/`RefCell`); the only async boundary is
//! action dispatch.

pub mod a2ui;

pub mod prelude;
