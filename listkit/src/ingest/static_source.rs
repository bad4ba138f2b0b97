use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::IngestError;
use crate::listeners::{ListenerSet, Subscription};
use crate::row::Row;

use super::{DataLoad, DataSource, PatchListener, RowPatch};

/// In-memory data source.
///
/// Every load returns the current rows. [`push`](Self::push) forwards a
/// patch to subscribers without changing what the next load returns.
pub struct StaticDataSource {
    rows: RwLock<Vec<Row>>,
    total_count: Option<usize>,
    listeners: ListenerSet<RowPatch>,
}

impl StaticDataSource {
    /// Create a source serving `rows`.
    pub fn new(rows: Vec<Row>) -> Self {
        Self {
            rows: RwLock::new(rows),
            total_count: None,
            listeners: ListenerSet::new(),
        }
    }

    /// Report a total count with every load.
    pub fn with_total_count(mut self, total: usize) -> Self {
        self.total_count = Some(total);
        self
    }

    /// Change what subsequent loads return.
    pub fn replace_rows(&self, rows: Vec<Row>) {
        *self.rows.write().unwrap_or_else(|e| e.into_inner()) = rows;
    }

    /// Send a patch to subscribers.
    pub fn push(&self, patch: RowPatch) {
        self.listeners.notify(&patch);
    }

    /// Number of patch subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.listeners.len()
    }
}

#[async_trait]
impl DataSource for StaticDataSource {
    async fn init(&self) -> Result<DataLoad, IngestError> {
        let rows = self.rows.read().unwrap_or_else(|e| e.into_inner()).clone();
        let load = DataLoad::new(rows);
        Ok(match self.total_count {
            Some(total) => load.with_total_count(total),
            None => load,
        })
    }

    fn subscribe(&self, listener: PatchListener) -> Option<Subscription> {
        Some(self.listeners.add(listener))
    }
}
