use std::sync::Arc;

use crate::error::ListError;
use crate::runtime::RefreshSender;
use crate::state::ListStore;

use super::order::resolve_order;
use super::plan::{CompiledFeaturePlan, DerivePipeline};
use super::{FeatureApis, FeatureContext, FeatureDescriptor, FeatureId};

/// Accumulates feature descriptors and compiles them into a plan.
///
/// # Example
///
/// ```
/// use listkit::feature::{FeatureBuild, FeatureDescriptor, FeatureRegistry};
///
/// let registry = FeatureRegistry::new()
///     .register(FeatureDescriptor::new("a", |_| Ok(FeatureBuild::new())))?
///     .register(FeatureDescriptor::new("b", |_| Ok(FeatureBuild::new())).before(["a"]))?;
/// assert_eq!(registry.len(), 2);
/// # Ok::<(), listkit::error::ListError>(())
/// ```
#[derive(Debug, Default)]
pub struct FeatureRegistry {
    descriptors: Vec<FeatureDescriptor>,
}

impl FeatureRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a descriptor. Fails if its id is already registered.
    pub fn register(mut self, descriptor: FeatureDescriptor) -> Result<Self, ListError> {
        if self.contains(descriptor.id()) {
            return Err(ListError::DuplicateFeature {
                id: descriptor.id().clone(),
            });
        }
        log::debug!("registered feature '{}'", descriptor.id());
        self.descriptors.push(descriptor);
        Ok(self)
    }

    /// Add several descriptors, failing on the first duplicate.
    pub fn register_all<I>(self, descriptors: I) -> Result<Self, ListError>
    where
        I: IntoIterator<Item = FeatureDescriptor>,
    {
        descriptors
            .into_iter()
            .try_fold(self, |registry, descriptor| registry.register(descriptor))
    }

    /// Check if a feature id is registered.
    pub fn contains(&self, id: &FeatureId) -> bool {
        self.descriptors.iter().any(|d| d.id() == id)
    }

    /// Registered ids in registration order.
    pub fn ids(&self) -> Vec<&FeatureId> {
        self.descriptors.iter().map(|d| d.id()).collect()
    }

    /// Number of registered features.
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Check if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Resolve the execution order without creating anything.
    pub fn resolve_order(&self) -> Result<Vec<FeatureId>, ListError> {
        let constraints: Vec<_> = self.descriptors.iter().map(|d| (d.id(), d.order())).collect();
        let order = resolve_order(&constraints)?;
        Ok(order
            .into_iter()
            .map(|i| self.descriptors[i].id().clone())
            .collect())
    }

    /// Create every feature in resolved order and assemble the plan.
    ///
    /// Each `create` sees only the APIs of features created before it. The
    /// first failing `create` aborts compilation.
    pub fn compile(
        self,
        store: &ListStore,
        refresh: &RefreshSender,
    ) -> Result<CompiledFeaturePlan, ListError> {
        let constraints: Vec<_> = self.descriptors.iter().map(|d| (d.id(), d.order())).collect();
        let order = resolve_order(&constraints)?;

        let mut slots: Vec<Option<FeatureDescriptor>> =
            self.descriptors.into_iter().map(Some).collect();
        let mut apis = FeatureApis::new();
        let mut plan_order = Vec::with_capacity(order.len());
        let mut derive = Vec::new();
        let mut on_init = Vec::new();
        let mut on_refresh = Vec::new();
        let mut on_destroy = Vec::new();
        let mut ui_contracts = Vec::new();

        for index in order {
            let Some(descriptor) = slots[index].take() else {
                continue;
            };
            let id = descriptor.id().clone();
            if let Some(contract) = descriptor.ui_contract() {
                ui_contracts.push((id.clone(), contract.clone()));
            }

            log::debug!("creating feature '{id}'");
            let build = {
                let cx = FeatureContext::new(&id, store, refresh, &apis);
                (descriptor.create)(&cx)?
            };

            if let Some(api) = build.api {
                apis.insert(id.clone(), api);
            }
            if let Some(step) = build.derive {
                derive.push((id.clone(), step));
            }
            if let Some(hook) = build.on_init {
                on_init.push((id.clone(), hook));
            }
            if let Some(hook) = build.on_refresh {
                on_refresh.push((id.clone(), hook));
            }
            if let Some(hook) = build.on_destroy {
                on_destroy.push((id.clone(), hook));
            }
            plan_order.push(id);
        }

        log::debug!(
            "compiled {} features: {}",
            plan_order.len(),
            plan_order
                .iter()
                .map(FeatureId::as_str)
                .collect::<Vec<_>>()
                .join(" -> ")
        );

        Ok(CompiledFeaturePlan {
            order: plan_order,
            derive: DerivePipeline::new(derive),
            on_init,
            on_refresh,
            on_destroy,
            ui_contracts,
            apis: Arc::new(apis),
        })
    }
}
