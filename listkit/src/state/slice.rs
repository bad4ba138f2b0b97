use std::sync::Arc;

use crate::feature::FeatureId;

use super::{ListState, ListStore};

/// Capability handle to one feature's private slice.
///
/// Only handed out by the owning feature's
/// [`FeatureContext`](crate::feature::FeatureContext), so no feature can
/// name another feature's slice. Reads fall back to the initial value until
/// the first write.
pub struct Slice<T> {
    feature: FeatureId,
    initial: Arc<T>,
    store: ListStore,
}

impl<T: Clone + Send + Sync + 'static> Slice<T> {
    pub(crate) fn new(feature: FeatureId, initial: T, store: ListStore) -> Self {
        Self {
            feature,
            initial: Arc::new(initial),
            store,
        }
    }

    /// The owning feature.
    pub fn feature(&self) -> &FeatureId {
        &self.feature
    }

    /// Read the slice from the current snapshot.
    ///
    /// Safe to call from a derive step or an update closure; there it sees
    /// the last published snapshot, not the one being built.
    pub fn get(&self) -> T {
        self.read(&self.store.state())
    }

    /// Read the slice from a given snapshot (used by derive steps).
    pub fn read(&self, state: &ListState) -> T {
        state.feature_state.get_or(&self.feature, &self.initial)
    }

    /// Replace the slice.
    pub fn set(&self, value: T) {
        let feature = self.feature.clone();
        self.store.update(move |state| state.feature_state.set(&feature, value));
    }

    /// Mutate the slice in place and return the closure's result.
    ///
    /// `f` may read any slice or feature API but must not write to the
    /// store; writes are serialized and would block on themselves.
    pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let mut out = None;
        self.store.update(|state| {
            let mut value = self.read(state);
            out = Some(f(&mut value));
            state.feature_state.set(&self.feature, value);
        });
        match out {
            Some(out) => out,
            None => unreachable!("store updater always runs"),
        }
    }
}

impl<T> Clone for Slice<T> {
    fn clone(&self) -> Self {
        Self {
            feature: self.feature.clone(),
            initial: Arc::clone(&self.initial),
            store: self.store.clone(),
        }
    }
}

impl<T> std::fmt::Debug for Slice<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Slice")
            .field("feature", &self.feature)
            .finish()
    }
}
