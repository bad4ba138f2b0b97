//! Field filters and free-text search.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;

use crate::error::ListError;
use crate::feature::{FeatureApi, FeatureBuild, FeatureDescriptor, UiContract};
use crate::meta::ListMeta;
use crate::row::Row;
use crate::state::Slice;

use super::FILTERS;

/// Row predicate used by [`FilterRule::Custom`].
pub type RowPredicate = Arc<dyn Fn(&Row) -> bool + Send + Sync>;

/// One filter rule, keyed by field in [`FilterState`].
#[derive(Clone)]
pub enum FilterRule {
    /// Field equals the value.
    Equals(Value),
    /// Field's text contains the needle, case-insensitively.
    Contains(String),
    /// Numeric field within the inclusive bounds.
    Range {
        /// Lower bound.
        min: Option<f64>,
        /// Upper bound.
        max: Option<f64>,
    },
    /// Field equals one of the values.
    OneOf(Vec<Value>),
    /// Arbitrary row predicate. The key is only a name.
    Custom(RowPredicate),
}

impl FilterRule {
    /// A custom predicate.
    pub fn custom<F>(predicate: F) -> Self
    where
        F: Fn(&Row) -> bool + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(predicate))
    }

    fn matches(&self, field: &str, row: &Row) -> bool {
        let value = row.get(field);
        match self {
            Self::Equals(expected) => value == Some(expected),
            Self::Contains(needle) => value
                .and_then(value_text)
                .is_some_and(|text| text.to_lowercase().contains(&needle.to_lowercase())),
            Self::Range { min, max } => match value.and_then(Value::as_f64) {
                Some(n) => min.is_none_or(|min| n >= min) && max.is_none_or(|max| n <= max),
                None => false,
            },
            Self::OneOf(options) => value.is_some_and(|v| options.contains(v)),
            Self::Custom(predicate) => predicate(row),
        }
    }
}

impl std::fmt::Debug for FilterRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Equals(v) => f.debug_tuple("Equals").field(v).finish(),
            Self::Contains(s) => f.debug_tuple("Contains").field(s).finish(),
            Self::Range { min, max } => f
                .debug_struct("Range")
                .field("min", min)
                .field("max", max)
                .finish(),
            Self::OneOf(v) => f.debug_tuple("OneOf").field(v).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Filter slice.
#[derive(Debug, Clone, Default)]
pub struct FilterState {
    /// Active rules by field.
    pub rules: BTreeMap<String, FilterRule>,
    /// Free-text search, if any.
    pub search: Option<String>,
}

impl FilterState {
    /// Check if nothing is filtered.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty() && self.search.is_none()
    }
}

/// Text form of a scalar value for search and `Contains`.
fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Public API of the filters feature.
pub struct FiltersApi {
    slice: Slice<FilterState>,
    meta: ListMeta,
}

impl FiltersApi {
    /// Set the rule for `field`, replacing any previous one.
    ///
    /// Custom rules skip the schema check since their key is only a name.
    pub fn set_filter(&self, field: &str, rule: FilterRule) -> Result<(), ListError> {
        if !matches!(rule, FilterRule::Custom(_)) && !self.meta.is_filterable(field) {
            return Err(ListError::FieldNotAllowed {
                field: field.to_string(),
                operation: "filtering",
            });
        }
        let field = field.to_string();
        self.slice.update(move |s| {
            s.rules.insert(field, rule);
        });
        Ok(())
    }

    /// Remove the rule for `field`. Returns whether one existed.
    pub fn remove_filter(&self, field: &str) -> bool {
        self.slice.update(|s| s.rules.remove(field).is_some())
    }

    /// Drop every rule and the search text.
    pub fn clear_filters(&self) {
        self.slice.set(FilterState::default());
    }

    /// Set the search text. Blank text clears it.
    pub fn set_search(&self, text: &str) {
        let text = text.trim();
        let search = (!text.is_empty()).then(|| text.to_string());
        self.slice.update(move |s| s.search = search);
    }

    /// The current filter slice.
    pub fn state(&self) -> FilterState {
        self.slice.get()
    }
}

impl FeatureApi for FiltersApi {
    fn handlers(&self) -> Vec<&'static str> {
        vec!["set_filter", "remove_filter", "clear_filters", "set_search"]
    }
}

fn matches_search(row: &Row, needle: &str, meta: &ListMeta) -> bool {
    row.fields()
        .filter(|(key, _)| meta.is_filterable(key))
        .filter_map(|(_, value)| value_text(value))
        .any(|text| text.to_lowercase().contains(needle))
}

/// The filters feature.
pub fn filters() -> FeatureDescriptor {
    FeatureDescriptor::new(FILTERS, |cx| {
        let slice = cx.slice(FilterState::default());
        let api = Arc::new(FiltersApi {
            slice: slice.clone(),
            meta: cx.meta().clone(),
        });
        Ok(FeatureBuild::with_api(api).derive(move |mut rows, dx| {
            let state = slice.read(dx.state());
            if state.is_empty() {
                return rows;
            }
            let needle = state.search.as_ref().map(|s| s.to_lowercase());
            rows.retain(|row| {
                state.rules.iter().all(|(field, rule)| rule.matches(field, row))
                    && needle
                        .as_deref()
                        .is_none_or(|n| matches_search(row, n, dx.meta()))
            });
            rows
        }))
    })
    .ui(UiContract::new()
        .slot("FilterBar")
        .slot("SearchBox")
        .requires("set_filter")
        .requires("set_search"))
}
