use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::listeners::Subscription;
use crate::state::{ListStatus, ListStore};

use super::{DataSource, RowPatch, apply_patch};

/// What happened to one load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Rows were written to the store.
    Applied,
    /// The source failed; the error is in state.
    Failed,
    /// A newer load was issued meanwhile; the result was dropped.
    Superseded,
}

#[derive(Clone, Copy)]
enum LoadKind {
    Init,
    Refresh,
}

impl LoadKind {
    fn name(self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Refresh => "refresh",
        }
    }
}

/// Bridges a [`DataSource`] into the list store.
///
/// Each load takes a token from a generation counter; a finished load is
/// written only if no newer load (or teardown) was issued in the meantime.
/// Source failures are stored as [`ListStatus::Error`] and never returned.
pub struct DataIngestion {
    source: Arc<dyn DataSource>,
    store: ListStore,
    generation: AtomicU64,
    subscription: Mutex<Option<Subscription>>,
}

impl DataIngestion {
    /// Create an adapter writing into `store`.
    pub fn new(source: Arc<dyn DataSource>, store: ListStore) -> Self {
        Self {
            source,
            store,
            generation: AtomicU64::new(0),
            subscription: Mutex::new(None),
        }
    }

    /// Subscribe to the source's patches (once) and run the initial load.
    pub async fn init(&self) -> LoadOutcome {
        self.subscribe_patches();
        self.load(LoadKind::Init).await
    }

    /// Run the source's refresh.
    pub async fn refresh(&self) -> LoadOutcome {
        self.load(LoadKind::Refresh).await
    }

    /// Drop the patch subscription, discard in-flight loads and release the
    /// source.
    pub fn destroy(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        let subscription = self
            .subscription
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(subscription) = subscription {
            subscription.unsubscribe();
        }
        self.source.destroy();
    }

    /// Apply one patch to the raw rows.
    pub fn apply(&self, patch: &RowPatch) {
        apply_to(&self.store, patch);
    }

    fn subscribe_patches(&self) {
        let mut guard = self.subscription.lock().unwrap_or_else(|e| e.into_inner());
        if guard.is_some() {
            return;
        }
        let store = self.store.clone();
        *guard = self
            .source
            .subscribe(Box::new(move |patch| apply_to(&store, patch)));
    }

    async fn load(&self, kind: LoadKind) -> LoadOutcome {
        let token = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        log::info!("ingestion {} started (generation {token})", kind.name());
        self.store
            .update(|state| state.set_status(ListStatus::Loading));

        let result = match kind {
            LoadKind::Init => self.source.init().await,
            LoadKind::Refresh => self.source.refresh().await,
        };

        let latest = self.generation.load(Ordering::SeqCst);
        if latest != token {
            log::debug!(
                "ingestion {} result discarded (generation {token}, latest {latest})",
                kind.name()
            );
            return LoadOutcome::Superseded;
        }

        match result {
            Ok(load) => {
                log::info!("ingestion {} loaded {} rows", kind.name(), load.rows.len());
                self.store.update(move |state| {
                    state.set_raw_rows(load.rows);
                    state.set_total_count(load.total_count);
                    state.set_status(load.status.unwrap_or(ListStatus::Ready));
                });
                LoadOutcome::Applied
            }
            Err(err) => {
                log::warn!("ingestion {} failed: {err}", kind.name());
                self.store.update(move |state| state.set_error(err));
                LoadOutcome::Failed
            }
        }
    }
}

fn apply_to(store: &ListStore, patch: &RowPatch) {
    let id_key = store.meta().id_key.clone();
    store.update(|state| {
        let mut rows = state.raw_rows().to_vec();
        if apply_patch(&mut rows, patch, &id_key) {
            log::trace!("applied patch {patch:?}");
            state.set_raw_rows(rows);
        }
    });
}

impl std::fmt::Debug for DataIngestion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataIngestion")
            .field("generation", &self.generation.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}
