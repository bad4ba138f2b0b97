use std::sync::{Arc, Weak};

use crate::meta::ListMeta;
use crate::row::Row;
use crate::state::ListState;

use super::descriptor::{DeriveFn, DestroyFn, LifecycleFn};
use super::{DeriveContext, FeatureApis, FeatureId, UiContract};

/// Ordered derive steps.
#[derive(Clone, Default)]
pub struct DerivePipeline {
    steps: Arc<[(FeatureId, DeriveFn)]>,
}

impl DerivePipeline {
    pub(crate) fn new(steps: Vec<(FeatureId, DeriveFn)>) -> Self {
        Self {
            steps: steps.into(),
        }
    }

    /// Fold the steps over `rows`, each reading its slice from `state`.
    pub fn run(&self, rows: Vec<Row>, state: &ListState, meta: &ListMeta) -> Vec<Row> {
        let cx = DeriveContext::new(state, meta);
        self.steps
            .iter()
            .fold(rows, |acc, (_, step)| step(acc, &cx))
    }

    /// A handle that does not keep the steps alive.
    pub(crate) fn downgrade(&self) -> WeakPipeline {
        WeakPipeline {
            steps: Arc::downgrade(&self.steps),
        }
    }

    /// Feature ids contributing a step, in run order.
    pub fn feature_ids(&self) -> Vec<FeatureId> {
        self.steps.iter().map(|(id, _)| id.clone()).collect()
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Check if the pipeline has no step.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl std::fmt::Debug for DerivePipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.steps.iter().map(|(id, _)| id))
            .finish()
    }
}

/// Non-owning handle to a [`DerivePipeline`].
///
/// Derive steps capture slices and slices hold the store, so the store only
/// ever holds this.
#[derive(Clone)]
pub(crate) struct WeakPipeline {
    steps: Weak<[(FeatureId, DeriveFn)]>,
}

impl WeakPipeline {
    /// The pipeline, while its plan is alive.
    pub(crate) fn upgrade(&self) -> Option<DerivePipeline> {
        self.steps.upgrade().map(|steps| DerivePipeline { steps })
    }
}

/// The immutable result of compiling a feature registry.
///
/// Holds the resolved order, the derive and lifecycle pipelines (features
/// without a given hook are simply absent from that pipeline), the UI
/// contracts and the feature-API map.
pub struct CompiledFeaturePlan {
    pub(crate) order: Vec<FeatureId>,
    pub(crate) derive: DerivePipeline,
    pub(crate) on_init: Vec<(FeatureId, LifecycleFn)>,
    pub(crate) on_refresh: Vec<(FeatureId, LifecycleFn)>,
    pub(crate) on_destroy: Vec<(FeatureId, DestroyFn)>,
    pub(crate) ui_contracts: Vec<(FeatureId, UiContract)>,
    pub(crate) apis: Arc<FeatureApis>,
}

impl CompiledFeaturePlan {
    /// Feature ids in resolved order.
    pub fn order(&self) -> &[FeatureId] {
        &self.order
    }

    /// The derive pipeline.
    pub fn derive_pipeline(&self) -> &DerivePipeline {
        &self.derive
    }

    /// Features with an `on_init` hook, in run order.
    pub fn init_features(&self) -> Vec<&FeatureId> {
        self.on_init.iter().map(|(id, _)| id).collect()
    }

    /// Features with an `on_refresh` hook, in run order.
    pub fn refresh_features(&self) -> Vec<&FeatureId> {
        self.on_refresh.iter().map(|(id, _)| id).collect()
    }

    /// Features with an `on_destroy` hook, in run order.
    pub fn destroy_features(&self) -> Vec<&FeatureId> {
        self.on_destroy.iter().map(|(id, _)| id).collect()
    }

    /// UI contracts by feature, in resolved order.
    pub fn ui_contracts(&self) -> &[(FeatureId, UiContract)] {
        &self.ui_contracts
    }

    /// The feature-API map.
    pub fn apis(&self) -> &Arc<FeatureApis> {
        &self.apis
    }
}

impl std::fmt::Debug for CompiledFeaturePlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledFeaturePlan")
            .field("order", &self.order)
            .field("derive", &self.derive)
            .field("on_init", &self.init_features())
            .field("on_refresh", &self.refresh_features())
            .field("on_destroy", &self.destroy_features())
            .finish()
    }
}
