use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use crate::feature::FeatureId;

/// Per-feature private slices, keyed by feature id.
///
/// Reads and writes are crate-private: features reach their slice only
/// through the [`Slice`](super::Slice) handle their context hands them.
/// Writes happen on a cloned snapshot; published snapshots are never touched.
#[derive(Clone, Default)]
pub struct FeatureStateBag {
    slices: HashMap<FeatureId, Arc<dyn Any + Send + Sync>>,
}

impl FeatureStateBag {
    /// Read a slice, or `None` if unset or stored with another type.
    pub(crate) fn get<T: Clone + Send + Sync + 'static>(&self, id: &FeatureId) -> Option<T> {
        self.slices
            .get(id)
            .and_then(|value| value.downcast_ref::<T>())
            .cloned()
    }

    /// Read a slice, falling back to `default`.
    pub(crate) fn get_or<T: Clone + Send + Sync + 'static>(&self, id: &FeatureId, default: &T) -> T {
        self.get(id).unwrap_or_else(|| default.clone())
    }

    /// Set `id` to `value`.
    pub(crate) fn set<T: Send + Sync + 'static>(&mut self, id: &FeatureId, value: T) {
        self.slices.insert(id.clone(), Arc::new(value));
    }

    /// Ids that currently hold a slice, sorted.
    pub(crate) fn ids(&self) -> Vec<FeatureId> {
        let mut ids: Vec<_> = self.slices.keys().cloned().collect();
        ids.sort();
        ids
    }
}

impl std::fmt::Debug for FeatureStateBag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeatureStateBag")
            .field("features", &self.ids())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_or_default_when_unset() {
        let bag = FeatureStateBag::default();
        let id = FeatureId::from_static("paging");
        assert_eq!(bag.get_or(&id, &3usize), 3);
    }

    #[test]
    fn test_write_on_clone_leaves_original_untouched() {
        let bag = FeatureStateBag::default();
        let id = FeatureId::from_static("paging");
        let mut next = bag.clone();
        next.set(&id, 7usize);
        assert_eq!(bag.get::<usize>(&id), None);
        assert_eq!(next.get::<usize>(&id), Some(7));
    }

    #[test]
    fn test_type_mismatch_reads_none() {
        let id = FeatureId::from_static("paging");
        let mut bag = FeatureStateBag::default();
        bag.set(&id, 7usize);
        assert_eq!(bag.get::<String>(&id), None);
    }
}
