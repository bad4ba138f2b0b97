//! List state: the snapshot held by the store, its feature-private slices,
//! and the store wrapper that keeps derived rows consistent.

mod bag;
mod list_store;
mod slice;

pub use bag::FeatureStateBag;
pub use list_store::ListStore;
pub use slice::Slice;

use crate::error::IngestError;
use crate::feature::FeatureId;
use crate::row::Row;

/// Loading status of the list's data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListStatus {
    /// No load has started.
    #[default]
    Idle,
    /// A load is in flight.
    Loading,
    /// Data is loaded.
    Ready,
    /// The last load failed; see [`ListState::error`].
    Error,
}

/// One immutable snapshot of the list.
///
/// `raw_rows` is the ingestion-layer source of truth. `rows` is the derived,
/// render-ready projection; it can only be written by the derive pipeline.
#[derive(Debug, Clone, Default)]
pub struct ListState {
    pub(crate) raw_rows: Vec<Row>,
    pub(crate) rows: Vec<Row>,
    pub(crate) feature_state: FeatureStateBag,
    pub(crate) status: ListStatus,
    pub(crate) error: Option<IngestError>,
    pub(crate) total_count: Option<usize>,
}

impl ListState {
    /// Create an empty, idle state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows as delivered by the data source.
    pub fn raw_rows(&self) -> &[Row] {
        &self.raw_rows
    }

    /// Rows after the derive pipeline (what the UI renders).
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Current loading status.
    pub fn status(&self) -> ListStatus {
        self.status
    }

    /// The last ingestion error, when status is [`ListStatus::Error`].
    pub fn error(&self) -> Option<&IngestError> {
        self.error.as_ref()
    }

    /// Total row count reported by the data source, if any.
    pub fn total_count(&self) -> Option<usize> {
        self.total_count
    }

    /// Replace the raw rows. Derived rows are recomputed on commit.
    pub fn set_raw_rows(&mut self, rows: Vec<Row>) {
        self.raw_rows = rows;
    }

    /// Set the loading status.
    pub fn set_status(&mut self, status: ListStatus) {
        self.status = status;
        if status != ListStatus::Error {
            self.error = None;
        }
    }

    /// Record an ingestion failure.
    pub fn set_error(&mut self, error: IngestError) {
        self.status = ListStatus::Error;
        self.error = Some(error);
    }

    /// Set the source-reported total count.
    pub fn set_total_count(&mut self, total: Option<usize>) {
        self.total_count = total;
    }

    /// Ids of the features holding a slice in this snapshot.
    pub fn feature_ids(&self) -> Vec<FeatureId> {
        self.feature_state.ids()
    }
}
