//! General (list-wide) and row actions.
//!
//! Both features share the same confirmation handshake: a gated action opens
//! a modal and records what is pending; a later resolution runs the handler
//! only if it matches one of those records.

mod general;
mod row;

pub use general::{GeneralAction, GeneralActionsApi, general_actions};
pub use row::{RowAction, RowActionsApi, row_actions};

use std::sync::{Arc, Mutex, Weak};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ListError, OptDisplay};
use crate::feature::{FeatureContext, FeatureId};
use crate::listeners::Subscription;
use crate::row::{Row, RowId};
use crate::state::{ListState, ListStore, Slice};

use super::filters::{FilterState, FiltersApi};
use super::modals::{ModalDescriptor, ModalHost, ModalRequester, ModalResult, ModalScope, ModalsApi};
use super::pagination::{PaginationApi, PaginationState};
use super::selection::SelectionApi;
use super::sorting::{SortState, SortingApi};
use super::{FILTERS, MODALS, PAGINATION, SELECTION, SORTING};

/// Features the action features read from, when registered.
const PEERS: [FeatureId; 5] = [FILTERS, SORTING, PAGINATION, SELECTION, MODALS];

/// The confirmation an action is waiting for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingAction {
    /// The gated action.
    pub action_id: String,
    /// Its row, for row actions.
    pub row_id: Option<RowId>,
}

/// What a trigger did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The handler ran.
    Executed,
    /// The action's predicate refused it.
    Disabled,
    /// A confirmation modal is open; the handler runs once it is confirmed.
    AwaitingConfirmation,
    /// The row is not among the visible rows.
    RowNotVisible,
}

/// Summary of an action for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionInfo {
    /// Action id, as passed to `trigger`.
    pub id: String,
    /// Display label (the id unless set).
    pub label: String,
    /// Whether the predicate currently allows the action.
    pub enabled: bool,
    /// Whether triggering opens a confirmation modal first.
    pub requires_confirmation: bool,
}

/// What an action handler or predicate sees.
#[derive(Debug, Clone)]
pub struct ActionContext {
    state: Arc<ListState>,
    selection: Vec<RowId>,
    pagination: Option<PaginationState>,
    filters: Option<FilterState>,
    sort: Option<SortState>,
}

impl ActionContext {
    /// Derived rows, as displayed.
    pub fn visible_rows(&self) -> &[Row] {
        self.state.rows()
    }

    /// Raw rows, before any feature.
    pub fn all_rows(&self) -> &[Row] {
        self.state.raw_rows()
    }

    /// Selected ids (empty without a selection feature).
    pub fn selection(&self) -> &[RowId] {
        &self.selection
    }

    /// Pagination state, if paginated.
    pub fn pagination(&self) -> Option<&PaginationState> {
        self.pagination.as_ref()
    }

    /// Filter state, if filterable.
    pub fn filters(&self) -> Option<&FilterState> {
        self.filters.as_ref()
    }

    /// Active sort, if any.
    pub fn sort(&self) -> Option<&SortState> {
        self.sort.as_ref()
    }

    /// The whole snapshot.
    pub fn state(&self) -> &ListState {
        &self.state
    }
}

/// Confirmation settings of an action.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Confirmation {
    pub(crate) meta: Option<Value>,
}

struct Peers {
    selection: Option<Arc<SelectionApi>>,
    pagination: Option<Arc<PaginationApi>>,
    filters: Option<Arc<FiltersApi>>,
    sorting: Option<Arc<SortingApi>>,
}

/// State and wiring shared by both action features.
pub(crate) struct ActionCore {
    feature: FeatureId,
    scope: ModalScope,
    pending: Slice<Vec<PendingAction>>,
    store: ListStore,
    modals: Option<Arc<dyn ModalHost>>,
    peers: Peers,
    subscription: Mutex<Option<Subscription>>,
}

impl ActionCore {
    pub(crate) fn new(cx: &FeatureContext<'_>, scope: ModalScope) -> Result<Self, ListError> {
        let modals: Option<Arc<dyn ModalHost>> = cx
            .try_feature::<ModalsApi>(MODALS)?
            .map(|m| m as Arc<dyn ModalHost>);
        Ok(Self {
            feature: cx.id().clone(),
            scope,
            pending: cx.slice(Vec::new()),
            store: cx.store(),
            modals,
            peers: Peers {
                selection: cx.try_feature(SELECTION)?,
                pagination: cx.try_feature(PAGINATION)?,
                filters: cx.try_feature(FILTERS)?,
                sorting: cx.try_feature(SORTING)?,
            },
            subscription: Mutex::new(None),
        })
    }

    /// Forward modal resolutions to `requester`.
    pub(crate) fn attach(&self, requester: Weak<dyn ModalRequester>) {
        if let Some(host) = &self.modals {
            let sub = host.attach(requester);
            *self.subscription.lock().unwrap_or_else(|e| e.into_inner()) = Some(sub);
        }
    }

    /// Stop listening for resolutions and forget what is pending.
    pub(crate) fn detach(&self) {
        let sub = self
            .subscription
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(sub) = sub {
            sub.unsubscribe();
        }
        self.pending.set(Vec::new());
    }

    pub(crate) fn id_key(&self) -> &str {
        &self.store.meta().id_key
    }

    pub(crate) fn feature(&self) -> &FeatureId {
        &self.feature
    }

    pub(crate) fn pending(&self) -> Vec<PendingAction> {
        self.pending.get()
    }

    /// Snapshot the list and its peers for a handler.
    pub(crate) fn context(&self) -> ActionContext {
        ActionContext {
            state: self.store.state(),
            selection: self
                .peers
                .selection
                .as_ref()
                .map(|s| s.selected())
                .unwrap_or_default(),
            pagination: self.peers.pagination.as_ref().map(|p| p.state()),
            filters: self.peers.filters.as_ref().map(|f| f.state()),
            sort: self.peers.sorting.as_ref().and_then(|s| s.state()),
        }
    }

    /// Open a confirmation modal and record it as pending.
    ///
    /// Re-triggering what is already pending does nothing.
    pub(crate) fn request_confirmation(
        &self,
        action_id: &str,
        row_id: Option<RowId>,
        confirmation: &Confirmation,
    ) -> Result<ActionOutcome, ListError> {
        let host = self
            .modals
            .as_ref()
            .ok_or_else(|| ListError::ModalsUnavailable {
                action_id: action_id.to_string(),
            })?;
        let record = PendingAction {
            action_id: action_id.to_string(),
            row_id,
        };
        if self.pending.get().contains(&record) {
            log::debug!(
                "action '{action_id}' (row {}) already awaiting confirmation",
                OptDisplay(record.row_id.as_ref())
            );
            return Ok(ActionOutcome::AwaitingConfirmation);
        }

        let descriptor = ModalDescriptor {
            scope: self.scope.clone(),
            action_id: record.action_id.clone(),
            row_id: record.row_id.clone(),
            meta: confirmation.meta.clone(),
        };
        host.open(descriptor);
        self.pending.update(|pending| pending.push(record));
        Ok(ActionOutcome::AwaitingConfirmation)
    }

    /// Remove and return the pending record `result` resolves, if any.
    pub(crate) fn take_matching(&self, result: &ModalResult) -> Option<PendingAction> {
        let descriptor = result.descriptor();
        if descriptor.scope != self.scope {
            return None;
        }
        let matched = self.pending.update(|pending| {
            let i = pending
                .iter()
                .position(|record| self.describes(descriptor, record))?;
            Some(pending.remove(i))
        });
        if matched.is_none() {
            log::debug!(
                "ignoring modal resolution for '{}' (row {}): not pending",
                descriptor.action_id,
                OptDisplay(descriptor.row_id.as_ref())
            );
        }
        matched
    }

    fn describes(&self, descriptor: &ModalDescriptor, record: &PendingAction) -> bool {
        descriptor.scope == self.scope
            && descriptor.action_id == record.action_id
            && descriptor.row_id == record.row_id
    }
}
