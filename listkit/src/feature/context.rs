//! Contexts handed to features: at creation, at derive time, and at
//! lifecycle time.

use std::sync::Arc;

use crate::error::ListError;
use crate::meta::ListMeta;
use crate::runtime::RefreshSender;
use crate::state::{ListState, ListStore, Slice};

use super::{FeatureApi, FeatureApis, FeatureId};

/// Context passed to a feature's `create` call.
///
/// Scoped to the feature being created: [`slice`](Self::slice) always binds
/// to this feature's id, and [`features`](Self::features) only contains
/// features created earlier in the resolved order.
pub struct FeatureContext<'a> {
    id: &'a FeatureId,
    store: &'a ListStore,
    refresh: &'a RefreshSender,
    features: &'a FeatureApis,
}

impl<'a> FeatureContext<'a> {
    pub(crate) fn new(
        id: &'a FeatureId,
        store: &'a ListStore,
        refresh: &'a RefreshSender,
        features: &'a FeatureApis,
    ) -> Self {
        Self {
            id,
            store,
            refresh,
            features,
        }
    }

    /// Id of the feature being created.
    pub fn id(&self) -> &FeatureId {
        self.id
    }

    /// Claim this feature's private slice, starting at `initial`.
    pub fn slice<T: Clone + Send + Sync + 'static>(&self, initial: T) -> Slice<T> {
        Slice::new(self.id.clone(), initial, self.store.clone())
    }

    /// APIs of the features created so far.
    pub fn features(&self) -> &FeatureApis {
        self.features
    }

    /// API of an already-created feature.
    pub fn feature<A: FeatureApi>(&self, id: impl Into<FeatureId>) -> Result<Arc<A>, ListError> {
        self.features.get(id)
    }

    /// API of an optional, already-created feature.
    pub fn try_feature<A: FeatureApi>(
        &self,
        id: impl Into<FeatureId>,
    ) -> Result<Option<Arc<A>>, ListError> {
        self.features.try_get(id)
    }

    /// Handle to the list store.
    pub fn store(&self) -> ListStore {
        self.store.clone()
    }

    /// Static metadata.
    pub fn meta(&self) -> &ListMeta {
        self.store.meta()
    }

    /// The refresh trigger.
    pub fn refresh_trigger(&self) -> RefreshSender {
        self.refresh.clone()
    }
}

/// Read-only context for a derive step.
///
/// [`state`](Self::state) is the snapshot being derived; read slices from it
/// with [`Slice::read`]. Feature APIs and [`Slice::get`] still work inside a
/// step but see the last published snapshot. A step must not write to the
/// store.
pub struct DeriveContext<'a> {
    state: &'a ListState,
    meta: &'a ListMeta,
}

impl<'a> DeriveContext<'a> {
    pub(crate) fn new(state: &'a ListState, meta: &'a ListMeta) -> Self {
        Self { state, meta }
    }

    /// The snapshot being derived.
    pub fn state(&self) -> &ListState {
        self.state
    }

    /// Static metadata.
    pub fn meta(&self) -> &ListMeta {
        self.meta
    }
}

/// Shared runtime context: state accessor, mutator, refresh trigger,
/// feature APIs and static metadata.
#[derive(Clone)]
pub struct ListContext {
    store: ListStore,
    refresh: RefreshSender,
    features: Arc<FeatureApis>,
}

impl ListContext {
    pub(crate) fn new(store: ListStore, refresh: RefreshSender, features: Arc<FeatureApis>) -> Self {
        Self {
            store,
            refresh,
            features,
        }
    }

    /// Current snapshot.
    pub fn state(&self) -> Arc<ListState> {
        self.store.state()
    }

    /// Mutate a copy of the snapshot; derived rows are recomputed.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut ListState),
    {
        self.store.update(f);
    }

    /// Ask the host to run a refresh.
    pub fn request_refresh(&self) {
        self.refresh.request();
    }

    /// All feature APIs.
    pub fn features(&self) -> &FeatureApis {
        &self.features
    }

    /// One feature's API.
    pub fn feature<A: FeatureApi>(&self, id: impl Into<FeatureId>) -> Result<Arc<A>, ListError> {
        self.features.get(id)
    }

    /// Static metadata.
    pub fn meta(&self) -> &ListMeta {
        self.store.meta()
    }

    /// The list store.
    pub fn store(&self) -> &ListStore {
        &self.store
    }
}

impl std::fmt::Debug for ListContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListContext")
            .field("store", &self.store)
            .field("features", &self.features)
            .finish()
    }
}
