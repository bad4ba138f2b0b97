//! Feature descriptors: identity, ordering constraints, UI contract and the
//! factory producing the feature's API and hooks.

use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;

use crate::error::{HookError, ListError};
use crate::row::Row;

use super::api::ApiEntry;
use super::{DeriveContext, FeatureApi, FeatureContext, FeatureId, ListContext};

/// A derive step: rows in, rows out.
pub type DeriveFn = Arc<dyn Fn(Vec<Row>, &DeriveContext<'_>) -> Vec<Row> + Send + Sync>;

/// An async lifecycle hook (`on_init`, `on_refresh`).
pub type LifecycleFn =
    Arc<dyn Fn(ListContext) -> BoxFuture<'static, Result<(), HookError>> + Send + Sync>;

/// A teardown hook.
pub type DestroyFn = Arc<dyn Fn(&ListContext) -> Result<(), HookError> + Send + Sync>;

type CreateFn = Box<dyn FnOnce(&FeatureContext<'_>) -> Result<FeatureBuild, ListError> + Send>;

/// Ordering constraints relative to other features.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureOrder {
    /// Features this one must run before.
    pub before: Vec<FeatureId>,
    /// Features this one must run after.
    pub after: Vec<FeatureId>,
}

impl FeatureOrder {
    /// Check if no constraint is declared.
    pub fn is_empty(&self) -> bool {
        self.before.is_empty() && self.after.is_empty()
    }
}

/// UI slots a feature serves and the handlers those slots need.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UiContract {
    /// Slot names (e.g. `"SortBar"`).
    pub slots: Vec<String>,
    /// Handler names that must exist on the feature's API when a slot renders.
    pub required_handlers: Vec<String>,
}

impl UiContract {
    /// Create an empty contract.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a slot.
    pub fn slot(mut self, slot: impl Into<String>) -> Self {
        self.slots.push(slot.into());
        self
    }

    /// Require a handler.
    pub fn requires(mut self, handler: impl Into<String>) -> Self {
        self.required_handlers.push(handler.into());
        self
    }
}

/// What a feature's `create` call produces: an optional API plus optional
/// derive and lifecycle hooks. Missing hooks are left out of the pipelines.
#[derive(Default)]
pub struct FeatureBuild {
    pub(crate) api: Option<ApiEntry>,
    pub(crate) derive: Option<DeriveFn>,
    pub(crate) on_init: Option<LifecycleFn>,
    pub(crate) on_refresh: Option<LifecycleFn>,
    pub(crate) on_destroy: Option<DestroyFn>,
}

impl FeatureBuild {
    /// A feature with no public API.
    pub fn new() -> Self {
        Self::default()
    }

    /// A feature exposing `api`.
    pub fn with_api<A: FeatureApi>(api: Arc<A>) -> Self {
        Self {
            api: Some(ApiEntry::new(api)),
            ..Self::default()
        }
    }

    /// Add a derive step.
    pub fn derive<F>(mut self, f: F) -> Self
    where
        F: Fn(Vec<Row>, &DeriveContext<'_>) -> Vec<Row> + Send + Sync + 'static,
    {
        self.derive = Some(Arc::new(f));
        self
    }

    /// Add an `on_init` hook.
    pub fn on_init<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(ListContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HookError>> + Send + 'static,
    {
        self.on_init = Some(Arc::new(move |cx| f(cx).boxed()));
        self
    }

    /// Add an `on_refresh` hook.
    pub fn on_refresh<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(ListContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HookError>> + Send + 'static,
    {
        self.on_refresh = Some(Arc::new(move |cx| f(cx).boxed()));
        self
    }

    /// Add an `on_destroy` hook.
    pub fn on_destroy<F>(mut self, f: F) -> Self
    where
        F: Fn(&ListContext) -> Result<(), HookError> + Send + Sync + 'static,
    {
        self.on_destroy = Some(Arc::new(f));
        self
    }
}

/// Description of one pluggable feature.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use listkit::feature::{FeatureApi, FeatureBuild, FeatureDescriptor};
///
/// struct Noop;
/// impl FeatureApi for Noop {
///     fn handlers(&self) -> Vec<&'static str> {
///         vec![]
///     }
/// }
///
/// let descriptor = FeatureDescriptor::new("noop", |_cx| Ok(FeatureBuild::with_api(Arc::new(Noop))))
///     .after(["filters"]);
/// assert_eq!(descriptor.id().as_str(), "noop");
/// ```
pub struct FeatureDescriptor {
    id: FeatureId,
    order: FeatureOrder,
    ui: Option<UiContract>,
    pub(crate) create: CreateFn,
}

impl FeatureDescriptor {
    /// Create a descriptor with the given id and factory.
    pub fn new<F>(id: impl Into<FeatureId>, create: F) -> Self
    where
        F: FnOnce(&FeatureContext<'_>) -> Result<FeatureBuild, ListError> + Send + 'static,
    {
        Self {
            id: id.into(),
            order: FeatureOrder::default(),
            ui: None,
            create: Box::new(create),
        }
    }

    /// Run after the given features.
    pub fn after<I, T>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<FeatureId>,
    {
        self.order.after.extend(ids.into_iter().map(Into::into));
        self
    }

    /// Run before the given features.
    pub fn before<I, T>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<FeatureId>,
    {
        self.order.before.extend(ids.into_iter().map(Into::into));
        self
    }

    /// Declare a UI contract.
    pub fn ui(mut self, contract: UiContract) -> Self {
        self.ui = Some(contract);
        self
    }

    /// The feature id.
    pub fn id(&self) -> &FeatureId {
        &self.id
    }

    /// Declared ordering constraints.
    pub fn order(&self) -> &FeatureOrder {
        &self.order
    }

    /// Declared UI contract.
    pub fn ui_contract(&self) -> Option<&UiContract> {
        self.ui.as_ref()
    }
}

impl std::fmt::Debug for FeatureDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeatureDescriptor")
            .field("id", &self.id)
            .field("order", &self.order)
            .field("ui", &self.ui)
            .finish()
    }
}
