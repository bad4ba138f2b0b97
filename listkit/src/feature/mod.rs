//! Feature descriptors, order resolution and the registry/compiler.
//!
//! A feature is a self-contained unit contributing an optional API, an
//! optional derive step, optional lifecycle hooks, a private state slice and
//! an optional UI contract. The [`FeatureRegistry`] collects descriptors and
//! compiles them into a [`CompiledFeaturePlan`].

mod api;
mod context;
mod descriptor;
mod id;
mod order;
mod plan;
mod registry;

pub use api::{FeatureApi, FeatureApis};
pub use context::{DeriveContext, FeatureContext, ListContext};
pub use descriptor::{
    DeriveFn, DestroyFn, FeatureBuild, FeatureDescriptor, FeatureOrder, LifecycleFn, UiContract,
};
pub use id::FeatureId;
pub use order::resolve_order;
pub use plan::{CompiledFeaturePlan, DerivePipeline};
pub(crate) use plan::WeakPipeline;
pub use registry::FeatureRegistry;
