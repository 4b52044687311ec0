//! Common imports for working with the engine.

pub use crate::a2ui::{
    A2uiError, A2uiMessage, A2uiMessageProcessor, Catalog, ComponentApi, ComponentContext,
    ComponentModel, DataContext, DataModel, DynamicValue, ProcessorConfig, ProcessorEvent, Schema,
    SubscriptionHandle, SurfaceGroupModel, SurfaceLifecycleListener, SurfaceModel,
    standard_catalog,
};
