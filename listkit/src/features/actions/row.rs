use std::collections::HashMap;
use std::sync::{Arc, Weak};

use serde_json::Value;

use crate::error::{HookError, ListError};
use crate::feature::{FeatureApi, FeatureBuild, FeatureDescriptor, UiContract};
use crate::features::ROW_ACTIONS;
use crate::features::modals::{ModalRequester, ModalResult, ModalScope};
use crate::row::{Row, RowId, find_row};

use super::{ActionContext, ActionCore, ActionInfo, ActionOutcome, Confirmation, PEERS, PendingAction};

type Handler =
    Arc<dyn Fn(&Row, &ActionContext, Option<&Value>) -> Result<(), HookError> + Send + Sync>;
type Predicate = Arc<dyn Fn(&Row, &ActionContext) -> bool + Send + Sync>;

/// An action on a single row.
#[derive(Clone)]
pub struct RowAction {
    id: String,
    label: String,
    enabled: Option<Predicate>,
    confirmation: Option<Confirmation>,
    handler: Handler,
}

impl RowAction {
    /// Create a row action.
    pub fn new<F>(id: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&Row, &ActionContext, Option<&Value>) -> Result<(), HookError>
            + Send
            + Sync
            + 'static,
    {
        let id = id.into();
        Self {
            label: id.clone(),
            id,
            enabled: None,
            confirmation: None,
            handler: Arc::new(handler),
        }
    }

    /// Set the label.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Only allow the action on rows where `predicate` holds.
    pub fn enabled_when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Row, &ActionContext) -> bool + Send + Sync + 'static,
    {
        self.enabled = Some(Arc::new(predicate));
        self
    }

    /// Require confirmation through the modals feature.
    pub fn confirm(mut self) -> Self {
        self.confirmation = Some(Confirmation::default());
        self
    }

    /// Require confirmation, passing `meta` to the modal.
    pub fn confirm_with(mut self, meta: Value) -> Self {
        self.confirmation = Some(Confirmation { meta: Some(meta) });
        self
    }

    /// The action id.
    pub fn id(&self) -> &str {
        &self.id
    }

    fn is_enabled(&self, row: &Row, cx: &ActionContext) -> bool {
        self.enabled.as_ref().is_none_or(|p| p(row, cx))
    }
}

impl std::fmt::Debug for RowAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RowAction")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("confirmation", &self.confirmation)
            .finish_non_exhaustive()
    }
}

/// Public API of the row actions feature.
///
/// Rows are addressed by id and looked up among the visible rows at the time
/// of the call, and again when a confirmation arrives.
pub struct RowActionsApi {
    core: ActionCore,
    actions: Vec<RowAction>,
    index: HashMap<String, usize>,
}

impl RowActionsApi {
    /// Run `action_id` on `row_id`, or open its confirmation modal.
    pub fn trigger(
        &self,
        action_id: &str,
        row_id: impl Into<RowId>,
    ) -> Result<ActionOutcome, ListError> {
        let row_id = row_id.into();
        let action = self.action(action_id)?;
        let cx = self.core.context();
        let Some(row) = find_row(cx.visible_rows(), self.core.id_key(), &row_id) else {
            log::debug!("row action '{action_id}': row {row_id} is not visible");
            return Ok(ActionOutcome::RowNotVisible);
        };
        if !action.is_enabled(row, &cx) {
            log::debug!("row action '{action_id}' is disabled for row {row_id}");
            return Ok(ActionOutcome::Disabled);
        }
        if let Some(confirmation) = &action.confirmation {
            return self
                .core
                .request_confirmation(action_id, Some(row_id), confirmation);
        }
        self.run(action, row, &cx, None)?;
        Ok(ActionOutcome::Executed)
    }

    /// Whether `action_id` is enabled for a visible row.
    pub fn is_enabled(&self, action_id: &str, row_id: &RowId) -> bool {
        let Ok(action) = self.action(action_id) else {
            return false;
        };
        let cx = self.core.context();
        find_row(cx.visible_rows(), self.core.id_key(), row_id)
            .is_some_and(|row| action.is_enabled(row, &cx))
    }

    /// Declared actions as they apply to `row_id`. Empty if the row is not
    /// visible.
    pub fn actions_for(&self, row_id: &RowId) -> Vec<ActionInfo> {
        let cx = self.core.context();
        let Some(row) = find_row(cx.visible_rows(), self.core.id_key(), row_id) else {
            return Vec::new();
        };
        self.actions
            .iter()
            .map(|action| ActionInfo {
                id: action.id.clone(),
                label: action.label.clone(),
                enabled: action.is_enabled(row, &cx),
                requires_confirmation: action.confirmation.is_some(),
            })
            .collect()
    }

    /// Actions awaiting confirmation, oldest first.
    pub fn pending(&self) -> Vec<PendingAction> {
        self.core.pending()
    }

    fn action(&self, action_id: &str) -> Result<&RowAction, ListError> {
        self.index
            .get(action_id)
            .map(|&i| &self.actions[i])
            .ok_or_else(|| ListError::UnknownAction {
                action_id: action_id.to_string(),
            })
    }

    fn run(
        &self,
        action: &RowAction,
        row: &Row,
        cx: &ActionContext,
        payload: Option<&Value>,
    ) -> Result<(), ListError> {
        log::debug!("running row action '{}'", action.id);
        (action.handler)(row, cx, payload).map_err(|source| ListError::Hook {
            id: self.core.feature().clone(),
            stage: "action",
            source,
        })
    }
}

impl ModalRequester for RowActionsApi {
    fn handle_resolution(&self, result: &ModalResult) {
        let Some(record) = self.core.take_matching(result) else {
            return;
        };
        if !result.is_confirmed() {
            log::debug!("row action '{}' cancelled", record.action_id);
            return;
        }
        let (Ok(action), Some(row_id)) = (self.action(&record.action_id), record.row_id) else {
            return;
        };
        let cx = self.core.context();
        let Some(row) = find_row(cx.visible_rows(), self.core.id_key(), &row_id) else {
            log::debug!(
                "row action '{}' confirmed but row {row_id} is no longer visible",
                record.action_id
            );
            return;
        };
        if let Err(err) = self.run(action, row, &cx, result.payload()) {
            log::error!("{err}");
        }
    }
}

impl FeatureApi for RowActionsApi {
    fn handlers(&self) -> Vec<&'static str> {
        vec!["trigger", "is_enabled", "actions_for"]
    }
}

/// The row actions feature.
///
/// Later declarations with a duplicate id replace earlier ones.
pub fn row_actions(actions: Vec<RowAction>) -> FeatureDescriptor {
    FeatureDescriptor::new(ROW_ACTIONS, move |cx| {
        let mut list: Vec<RowAction> = Vec::with_capacity(actions.len());
        let mut index = HashMap::new();
        for action in actions {
            match index.get(&action.id).copied() {
                Some(i) => list[i] = action,
                None => {
                    index.insert(action.id.clone(), list.len());
                    list.push(action);
                }
            }
        }

        let api = Arc::new(RowActionsApi {
            core: ActionCore::new(cx, ModalScope::RowAction)?,
            actions: list,
            index,
        });
        let requester: Weak<RowActionsApi> = Arc::downgrade(&api);
        api.core.attach(requester);

        let teardown = Arc::clone(&api);
        Ok(FeatureBuild::with_api(api).on_destroy(move |_| {
            teardown.core.detach();
            Ok(())
        }))
    })
    .after(PEERS)
    .ui(UiContract::new().slot("RowActions").requires("trigger"))
}
