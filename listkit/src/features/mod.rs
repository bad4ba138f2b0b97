//! Built-in features.
//!
//! Each constructor returns a [`FeatureDescriptor`](crate::feature::FeatureDescriptor)
//! ready to register. Cross-feature reads go through the peers' public APIs,
//! which is why the consumers declare `after` constraints on them.

pub mod actions;
pub mod filters;
pub mod modals;
pub mod pagination;
pub mod selection;
pub mod sorting;

use crate::feature::FeatureId;

/// Id of the filters feature.
pub const FILTERS: FeatureId = FeatureId::from_static("filters");
/// Id of the sorting feature.
pub const SORTING: FeatureId = FeatureId::from_static("sorting");
/// Id of the pagination feature.
pub const PAGINATION: FeatureId = FeatureId::from_static("pagination");
/// Id of the selection feature.
pub const SELECTION: FeatureId = FeatureId::from_static("selection");
/// Id of the modals feature.
pub const MODALS: FeatureId = FeatureId::from_static("modals");
/// Id of the general (list-wide) actions feature.
pub const GENERAL_ACTIONS: FeatureId = FeatureId::from_static("general_actions");
/// Id of the row actions feature.
pub const ROW_ACTIONS: FeatureId = FeatureId::from_static("row_actions");
