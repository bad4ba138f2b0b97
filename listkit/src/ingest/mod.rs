//! Data ingestion: the [`DataSource`] contract and the adapter that turns
//! loads and patches into raw-row replacements in the store.

mod adapter;
mod patch;
mod static_source;

pub use adapter::{DataIngestion, LoadOutcome};
pub use patch::apply_patch;
pub use static_source::StaticDataSource;

use async_trait::async_trait;

use crate::error::IngestError;
use crate::listeners::Subscription;
use crate::row::{Row, RowId};
use crate::state::ListStatus;

/// Result of a data source load.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataLoad {
    /// The rows.
    pub rows: Vec<Row>,
    /// Total number of rows on the source side, if known.
    pub total_count: Option<usize>,
    /// Status to report instead of [`ListStatus::Ready`].
    pub status: Option<ListStatus>,
}

impl DataLoad {
    /// A load carrying `rows`.
    pub fn new(rows: Vec<Row>) -> Self {
        Self {
            rows,
            total_count: None,
            status: None,
        }
    }

    /// Set the total count.
    pub fn with_total_count(mut self, total: usize) -> Self {
        self.total_count = Some(total);
        self
    }

    /// Override the resulting status.
    pub fn with_status(mut self, status: ListStatus) -> Self {
        self.status = Some(status);
        self
    }
}

/// Incremental change pushed by a data source.
#[derive(Debug, Clone, PartialEq)]
pub enum RowPatch {
    /// Replace every row.
    ReplaceAll(Vec<Row>),
    /// Add a row at the end.
    Append(Row),
    /// Replace the row with the same id; no-op if absent.
    Update(Row),
    /// Remove the row with this id; no-op if absent.
    Remove(RowId),
}

/// Listener receiving patches from a data source.
pub type PatchListener = Box<dyn Fn(&RowPatch) + Send + Sync>;

/// Source of row data for a list.
///
/// Only `init` is required. Sources without a patch stream keep the default
/// `subscribe`; `refresh` defaults to loading again through `init`.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Load the initial data.
    async fn init(&self) -> Result<DataLoad, IngestError>;

    /// Subscribe to incremental patches. `None` means no patch stream.
    fn subscribe(&self, listener: PatchListener) -> Option<Subscription> {
        let _ = listener;
        None
    }

    /// Reload the data.
    async fn refresh(&self) -> Result<DataLoad, IngestError> {
        self.init().await
    }

    /// Release resources held by the source.
    fn destroy(&self) {}
}
