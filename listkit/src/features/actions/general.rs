use std::collections::HashMap;
use std::sync::{Arc, Weak};

use serde_json::Value;

use crate::error::{HookError, ListError};
use crate::feature::{FeatureApi, FeatureBuild, FeatureDescriptor, UiContract};
use crate::features::GENERAL_ACTIONS;
use crate::features::modals::{ModalRequester, ModalResult, ModalScope};

use super::{ActionContext, ActionCore, ActionInfo, ActionOutcome, Confirmation, PEERS, PendingAction};

type Handler = Arc<dyn Fn(&ActionContext, Option<&Value>) -> Result<(), HookError> + Send + Sync>;
type Predicate = Arc<dyn Fn(&ActionContext) -> bool + Send + Sync>;

/// A list-wide action (toolbar button).
#[derive(Clone)]
pub struct GeneralAction {
    id: String,
    label: String,
    enabled: Option<Predicate>,
    confirmation: Option<Confirmation>,
    handler: Handler,
}

impl GeneralAction {
    /// Create an action. The handler receives the confirmation payload when
    /// the action is gated by a modal.
    pub fn new<F>(id: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&ActionContext, Option<&Value>) -> Result<(), HookError> + Send + Sync + 'static,
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

    /// Only allow the action when `predicate` holds.
    pub fn enabled_when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&ActionContext) -> bool + Send + Sync + 'static,
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

    fn is_enabled(&self, cx: &ActionContext) -> bool {
        self.enabled.as_ref().is_none_or(|p| p(cx))
    }
}

impl std::fmt::Debug for GeneralAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneralAction")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("confirmation", &self.confirmation)
            .finish_non_exhaustive()
    }
}

/// Public API of the general actions feature.
pub struct GeneralActionsApi {
    core: ActionCore,
    actions: Vec<GeneralAction>,
    index: HashMap<String, usize>,
}

impl GeneralActionsApi {
    /// Run `action_id`, or open its confirmation modal.
    pub fn trigger(&self, action_id: &str) -> Result<ActionOutcome, ListError> {
        let action = self.action(action_id)?;
        let cx = self.core.context();
        if !action.is_enabled(&cx) {
            log::debug!("general action '{action_id}' is disabled");
            return Ok(ActionOutcome::Disabled);
        }
        if let Some(confirmation) = &action.confirmation {
            return self.core.request_confirmation(action_id, None, confirmation);
        }
        self.run(action, &cx, None)?;
        Ok(ActionOutcome::Executed)
    }

    /// Whether `action_id` is currently enabled. Unknown actions are not.
    pub fn is_enabled(&self, action_id: &str) -> bool {
        self.action(action_id)
            .is_ok_and(|action| action.is_enabled(&self.core.context()))
    }

    /// Declared actions, in declaration order.
    pub fn actions(&self) -> Vec<ActionInfo> {
        let cx = self.core.context();
        self.actions
            .iter()
            .map(|action| ActionInfo {
                id: action.id.clone(),
                label: action.label.clone(),
                enabled: action.is_enabled(&cx),
                requires_confirmation: action.confirmation.is_some(),
            })
            .collect()
    }

    /// Actions awaiting confirmation, oldest first.
    pub fn pending(&self) -> Vec<PendingAction> {
        self.core.pending()
    }

    fn action(&self, action_id: &str) -> Result<&GeneralAction, ListError> {
        self.index
            .get(action_id)
            .map(|&i| &self.actions[i])
            .ok_or_else(|| ListError::UnknownAction {
                action_id: action_id.to_string(),
            })
    }

    fn run(
        &self,
        action: &GeneralAction,
        cx: &ActionContext,
        payload: Option<&Value>,
    ) -> Result<(), ListError> {
        log::debug!("running general action '{}'", action.id);
        (action.handler)(cx, payload).map_err(|source| ListError::Hook {
            id: self.core.feature().clone(),
            stage: "action",
            source,
        })
    }
}

impl ModalRequester for GeneralActionsApi {
    fn handle_resolution(&self, result: &ModalResult) {
        let Some(record) = self.core.take_matching(result) else {
            return;
        };
        if !result.is_confirmed() {
            log::debug!("general action '{}' cancelled", record.action_id);
            return;
        }
        let Ok(action) = self.action(&record.action_id) else {
            return;
        };
        let cx = self.core.context();
        if let Err(err) = self.run(action, &cx, result.payload()) {
            log::error!("{err}");
        }
    }
}

impl FeatureApi for GeneralActionsApi {
    fn handlers(&self) -> Vec<&'static str> {
        vec!["trigger", "is_enabled", "actions"]
    }
}

/// The general actions feature.
///
/// Later declarations with a duplicate id replace earlier ones.
pub fn general_actions(actions: Vec<GeneralAction>) -> FeatureDescriptor {
    FeatureDescriptor::new(GENERAL_ACTIONS, move |cx| {
        let mut list: Vec<GeneralAction> = Vec::with_capacity(actions.len());
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

        let api = Arc::new(GeneralActionsApi {
            core: ActionCore::new(cx, ModalScope::GeneralAction)?,
            actions: list,
            index,
        });
        let requester: Weak<GeneralActionsApi> = Arc::downgrade(&api);
        api.core.attach(requester);

        let teardown = Arc::clone(&api);
        Ok(FeatureBuild::with_api(api).on_destroy(move |_| {
            teardown.core.detach();
            Ok(())
        }))
    })
    .after(PEERS)
    .ui(UiContract::new().slot("Toolbar").requires("trigger"))
}
