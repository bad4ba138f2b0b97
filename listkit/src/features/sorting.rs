//! Single-column sorting.

use std::cmp::Ordering;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ListError;
use crate::feature::{FeatureApi, FeatureBuild, FeatureDescriptor, UiContract};
use crate::meta::ListMeta;
use crate::row::{Row, compare_values};
use crate::state::Slice;

use super::SORTING;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// The active sort.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    /// Field to sort by.
    pub field: String,
    /// Direction.
    pub direction: SortDirection,
}

impl SortState {
    /// Ascending sort by `field`.
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    /// Descending sort by `field`.
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// Public API of the sorting feature.
pub struct SortingApi {
    slice: Slice<Option<SortState>>,
    meta: ListMeta,
}

impl SortingApi {
    /// Sort by `field` in `direction`.
    pub fn set_sort(&self, field: &str, direction: SortDirection) -> Result<(), ListError> {
        if !self.meta.is_sortable(field) {
            return Err(ListError::FieldNotAllowed {
                field: field.to_string(),
                operation: "sorting",
            });
        }
        self.slice.set(Some(SortState {
            field: field.to_string(),
            direction,
        }));
        Ok(())
    }

    /// Cycle `field` through ascending, descending and unsorted.
    pub fn toggle_sort(&self, field: &str) -> Result<(), ListError> {
        let next = match self.slice.get() {
            Some(current) if current.field == field => match current.direction {
                SortDirection::Asc => Some(SortDirection::Desc),
                SortDirection::Desc => None,
            },
            _ => Some(SortDirection::Asc),
        };
        match next {
            Some(direction) => self.set_sort(field, direction),
            None => {
                self.clear_sort();
                Ok(())
            }
        }
    }

    /// Remove the active sort.
    pub fn clear_sort(&self) {
        self.slice.set(None);
    }

    /// The active sort.
    pub fn state(&self) -> Option<SortState> {
        self.slice.get()
    }
}

impl FeatureApi for SortingApi {
    fn handlers(&self) -> Vec<&'static str> {
        vec!["set_sort", "toggle_sort", "clear_sort"]
    }
}

fn non_null(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}

/// Compare two rows under `sort`. Missing values go last in both directions.
fn compare_rows(a: &Row, b: &Row, sort: &SortState) -> Ordering {
    let a = non_null(a.get(&sort.field));
    let b = non_null(b.get(&sort.field));
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (a, b) => {
            let ord = compare_values(a, b);
            match sort.direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            }
        }
    }
}

/// The sorting feature, optionally starting with `initial`.
pub fn sorting(initial: Option<SortState>) -> FeatureDescriptor {
    FeatureDescriptor::new(SORTING, move |cx| {
        let slice = cx.slice(initial);
        let api = Arc::new(SortingApi {
            slice: slice.clone(),
            meta: cx.meta().clone(),
        });
        Ok(FeatureBuild::with_api(api).derive(move |mut rows, dx| {
            if let Some(sort) = slice.read(dx.state()) {
                rows.sort_by(|a, b| compare_rows(a, b, &sort));
            }
            rows
        }))
    })
    .ui(UiContract::new().slot("SortBar").requires("set_sort"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(v: Value) -> Row {
        Row::from_value(v).unwrap()
    }

    #[test]
    fn test_desc_keeps_missing_last() {
        let mut rows = vec![
            row(json!({"id": 1})),
            row(json!({"id": 2, "v": 1})),
            row(json!({"id": 3, "v": 5})),
        ];
        let sort = SortState::desc("v");
        rows.sort_by(|a, b| compare_rows(a, b, &sort));
        let ids: Vec<_> = rows.iter().map(|r| r.id("id").unwrap().to_string()).collect();
        assert_eq!(ids, vec!["3", "2", "1"]);
    }

    #[test]
    fn test_sort_is_stable() {
        let mut rows = vec![
            row(json!({"id": 1, "g": "x"})),
            row(json!({"id": 2, "g": "a"})),
            row(json!({"id": 3, "g": "x"})),
        ];
        let sort = SortState::asc("g");
        rows.sort_by(|a, b| compare_rows(a, b, &sort));
        let ids: Vec<_> = rows.iter().map(|r| r.id("id").unwrap().to_string()).collect();
        assert_eq!(ids, vec!["2", "1", "3"]);
    }
}
