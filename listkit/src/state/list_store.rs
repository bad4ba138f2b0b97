use std::sync::{Arc, OnceLock};

use crate::feature::{DerivePipeline, WeakPipeline};
use crate::listeners::Subscription;
use crate::meta::ListMeta;
use crate::row::Row;
use crate::store::Store;

use super::ListState;

/// The list's store plus the derive pipeline that owns `rows`.
///
/// Binding a store installs a commit hook on it, so every write through any
/// clone of that store (the host's own handle included) recomputes the
/// derived rows from `raw_rows` and the feature slices of the new snapshot
/// before it is published. A store backs a single list.
#[derive(Clone)]
pub struct ListStore {
    store: Store<ListState>,
    meta: Arc<ListMeta>,
    pipeline: Arc<OnceLock<WeakPipeline>>,
}

impl ListStore {
    /// Bind `store`. Rows are passed through untouched until a compiled
    /// pipeline is installed, and again once its plan is dropped.
    pub fn new(store: Store<ListState>, meta: ListMeta) -> Self {
        let meta = Arc::new(meta);
        let pipeline: Arc<OnceLock<WeakPipeline>> = Arc::new(OnceLock::new());
        let hook = {
            let meta = Arc::clone(&meta);
            let pipeline = Arc::clone(&pipeline);
            move |state: &mut ListState| {
                state.rows = derive_rows(&pipeline, &meta, &state.raw_rows, &*state);
            }
        };
        if !store.set_commit_hook(Box::new(hook)) {
            log::warn!("store already backs a list; its derive pipeline stays in charge");
        }
        Self {
            store,
            meta,
            pipeline,
        }
    }

    /// Install the compiled pipeline and re-derive the current snapshot.
    ///
    /// Only a weak handle is kept: the pipeline lives as long as the plan
    /// that owns it.
    pub(crate) fn install_pipeline(&self, pipeline: &DerivePipeline) {
        if self.pipeline.set(pipeline.downgrade()).is_err() {
            log::warn!("derive pipeline already installed; keeping the first one");
        }
        self.update(|_| {});
    }

    /// Current snapshot.
    pub fn state(&self) -> Arc<ListState> {
        self.store.get()
    }

    /// The underlying observable store.
    pub fn store(&self) -> &Store<ListState> {
        &self.store
    }

    /// Static metadata.
    pub fn meta(&self) -> &ListMeta {
        &self.meta
    }

    /// Apply a mutation to a copy of the current snapshot and publish it.
    /// Derived rows are recomputed on commit.
    ///
    /// `f` must not write to this store.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut ListState),
    {
        self.store.update(|current| {
            let mut next = current.clone();
            f(&mut next);
            next
        });
    }

    /// Run the derive pipeline over `raw` against the slices in `state`.
    pub fn derive_for(&self, raw: &[Row], state: &ListState) -> Vec<Row> {
        derive_rows(&self.pipeline, &self.meta, raw, state)
    }

    /// Subscribe to snapshot changes.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&Arc<ListState>) + Send + Sync + 'static,
    {
        self.store.subscribe(listener)
    }
}

impl std::fmt::Debug for ListStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListStore")
            .field("id_key", &self.meta.id_key)
            .field(
                "compiled",
                &self.pipeline.get().and_then(WeakPipeline::upgrade).is_some(),
            )
            .finish()
    }
}

fn derive_rows(
    pipeline: &OnceLock<WeakPipeline>,
    meta: &ListMeta,
    raw: &[Row],
    state: &ListState,
) -> Vec<Row> {
    match pipeline.get().and_then(WeakPipeline::upgrade) {
        Some(pipeline) => pipeline.run(raw.to_vec(), state, meta),
        None => raw.to_vec(),
    }
}
