//! Row selection by id.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::feature::{FeatureApi, FeatureBuild, FeatureDescriptor, UiContract};
use crate::row::RowId;
use crate::state::{ListStore, Slice};

use super::SELECTION;

/// Selection mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionMode {
    /// No selection allowed.
    None,
    /// One row at a time (radio-button style).
    Single,
    /// Any number of rows (checkbox style).
    #[default]
    Multi,
}

/// Tracks selected rows by id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub mode: SelectionMode,
    pub selected: BTreeSet<RowId>,
}

impl Selection {
    /// Empty selection in `mode`.
    pub fn new(mode: SelectionMode) -> Self {
        Self {
            mode,
            selected: BTreeSet::new(),
        }
    }

    /// Toggle `id`. Returns true if the selection changed.
    pub fn toggle(&mut self, id: RowId) -> bool {
        match self.mode {
            SelectionMode::None => false,
            SelectionMode::Single => {
                let was_selected = self.selected.contains(&id);
                self.selected.clear();
                if !was_selected {
                    self.selected.insert(id);
                }
                true
            }
            SelectionMode::Multi => {
                if !self.selected.remove(&id) {
                    self.selected.insert(id);
                }
                true
            }
        }
    }

    /// Select `id`. Returns true if the selection changed.
    pub fn select(&mut self, id: RowId) -> bool {
        match self.mode {
            SelectionMode::None => false,
            SelectionMode::Single => {
                if self.selected.len() == 1 && self.selected.contains(&id) {
                    return false;
                }
                self.selected.clear();
                self.selected.insert(id)
            }
            SelectionMode::Multi => self.selected.insert(id),
        }
    }

    /// Deselect `id`. Returns true if it was selected.
    pub fn deselect(&mut self, id: &RowId) -> bool {
        self.selected.remove(id)
    }

    /// Check if `id` is selected.
    pub fn is_selected(&self, id: &RowId) -> bool {
        self.selected.contains(id)
    }

    /// Clear all selections.
    pub fn clear(&mut self) {
        self.selected.clear();
    }
}

/// Public API of the selection feature.
pub struct SelectionApi {
    slice: Slice<Selection>,
    store: ListStore,
}

impl SelectionApi {
    /// Toggle a row.
    pub fn toggle(&self, id: impl Into<RowId>) -> bool {
        let id = id.into();
        self.slice.update(move |s| s.toggle(id))
    }

    /// Select a row.
    pub fn select(&self, id: impl Into<RowId>) -> bool {
        let id = id.into();
        self.slice.update(move |s| s.select(id))
    }

    /// Deselect a row.
    pub fn deselect(&self, id: impl Into<RowId>) -> bool {
        let id = id.into();
        self.slice.update(|s| s.deselect(&id))
    }

    /// Select every visible row. Only meaningful in multi mode.
    pub fn select_all(&self) -> bool {
        if self.slice.get().mode != SelectionMode::Multi {
            return false;
        }
        let state = self.store.state();
        let id_key = &self.store.meta().id_key;
        let visible: Vec<RowId> = state.rows().iter().filter_map(|r| r.id(id_key)).collect();
        self.slice.update(move |s| {
            let before = s.selected.len();
            s.selected.extend(visible);
            s.selected.len() != before
        })
    }

    /// Deselect everything.
    pub fn clear(&self) {
        self.slice.update(Selection::clear);
    }

    /// Selected ids in ascending order.
    pub fn selected(&self) -> Vec<RowId> {
        self.slice.get().selected.into_iter().collect()
    }

    /// Check if a row is selected.
    pub fn is_selected(&self, id: &RowId) -> bool {
        self.slice.get().is_selected(id)
    }

    /// The selection mode.
    pub fn mode(&self) -> SelectionMode {
        self.slice.get().mode
    }
}

impl FeatureApi for SelectionApi {
    fn handlers(&self) -> Vec<&'static str> {
        vec!["toggle", "select", "deselect", "select_all", "clear"]
    }
}

/// The selection feature. On refresh, ids no longer present in the raw rows
/// are dropped.
pub fn selection(mode: SelectionMode) -> FeatureDescriptor {
    FeatureDescriptor::new(SELECTION, move |cx| {
        let slice = cx.slice(Selection::new(mode));
        let api = Arc::new(SelectionApi {
            slice: slice.clone(),
            store: cx.store(),
        });
        Ok(FeatureBuild::with_api(api).on_refresh(move |lcx| {
            let slice = slice.clone();
            async move {
                let state = lcx.state();
                let id_key = &lcx.meta().id_key;
                let present: BTreeSet<RowId> =
                    state.raw_rows().iter().filter_map(|r| r.id(id_key)).collect();
                let current = slice.get();
                if !current.selected.is_subset(&present) {
                    slice.update(|s| s.selected.retain(|id| present.contains(id)));
                }
                Ok(())
            }
        }))
    })
    .ui(UiContract::new()
        .slot("SelectionColumn")
        .requires("toggle")
        .requires("select_all")
        .requires("clear"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_mode_ignores_everything() {
        let mut sel = Selection::new(SelectionMode::None);
        assert!(!sel.toggle("a".into()));
        assert!(!sel.select("a".into()));
        assert!(sel.selected.is_empty());
    }

    #[test]
    fn test_single_mode_replaces() {
        let mut sel = Selection::new(SelectionMode::Single);
        sel.select("a".into());
        sel.select("b".into());
        assert_eq!(sel.selected.len(), 1);
        assert!(sel.is_selected(&"b".into()));
        assert!(sel.toggle("b".into()));
        assert!(sel.selected.is_empty());
    }

    #[test]
    fn test_multi_mode_toggles() {
        let mut sel = Selection::new(SelectionMode::Multi);
        sel.toggle("a".into());
        sel.toggle("b".into());
        sel.toggle("a".into());
        assert_eq!(sel.selected.iter().collect::<Vec<_>>(), vec![&RowId::from("b")]);
    }
}
