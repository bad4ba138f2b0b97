//! Feature orchestration for list and table widgets.
//!
//! A list is configured from pluggable features (filters, sorting,
//! pagination, selection, modals, actions, or your own). Each feature owns a
//! private slice of the list state, may contribute a derive step that turns
//! raw rows into displayed rows, may expose a typed API to the UI and to
//! other features, and may hook into `init`, `refresh` and `destroy`.
//!
//! ```
//! use listkit::prelude::*;
//! use listkit::features::{pagination::*, sorting::*};
//! use serde_json::json;
//!
//! let registry = FeatureRegistry::new()
//!     .register(sorting(Some(SortState::asc("name"))))?
//!     .register(pagination(PaginationState { page_index: 0, page_size: 1 }))?;
//! let runtime = ListRuntime::builder(registry).id_key("id").build()?;
//!
//! let rows = vec![
//!     Row::from_value(json!({"id": 1, "name": "b"})).unwrap(),
//!     Row::from_value(json!({"id": 2, "name": "a"})).unwrap(),
//! ];
//! let visible = runtime.derive(&rows);
//! assert_eq!(visible[0].get("id"), Some(&json!(2)));
//! # Ok::<(), listkit::ListError>(())
//! ```

pub mod error;
pub mod feature;
pub mod features;
pub mod ingest;
pub mod listeners;
pub mod meta;
pub mod row;
pub mod runtime;
pub mod state;
pub mod store;
pub mod validate;

pub use error::{HookError, IngestError, ListError};
pub use runtime::ListRuntime;

pub mod prelude {
    pub use crate::error::{HookError, IngestError, ListError};
    pub use crate::feature::{
        DeriveContext, FeatureApi, FeatureBuild, FeatureContext, FeatureDescriptor, FeatureId,
        FeatureRegistry, ListContext, UiContract,
    };
    pub use crate::ingest::{DataLoad, DataSource, RowPatch, StaticDataSource};
    pub use crate::listeners::Subscription;
    pub use crate::meta::{FieldKind, FieldSpec, ListMeta};
    pub use crate::row::{Row, RowId};
    pub use crate::runtime::{ListRuntime, RefreshReceiver, RefreshSender, RuntimeBindings};
    pub use crate::state::{ListState, ListStatus, Slice};
    pub use crate::store::Store;
    pub use crate::validate::{UiComponents, ValidationMode, ValidationOptions};
}
