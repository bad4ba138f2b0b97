//! Confirmation modals shared by the action features.
//!
//! A requester opens a [`ModalDescriptor`]; the UI renders the active one and
//! calls [`ModalsApi::confirm`] or [`ModalsApi::cancel`]. Every resolution is
//! broadcast to subscribers, which match it against what they asked for.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, Weak};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::oneshot;

use crate::feature::{FeatureApi, FeatureBuild, FeatureDescriptor, UiContract};
use crate::listeners::{ListenerSet, Subscription};
use crate::row::RowId;
use crate::state::Slice;

use super::MODALS;

/// Who asked for a modal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModalScope {
    /// A list-wide action.
    GeneralAction,
    /// An action on one row.
    RowAction,
    /// A feature-defined requester, by name.
    Custom(String),
}

/// What a modal is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModalDescriptor {
    /// Who asked.
    pub scope: ModalScope,
    /// The action waiting on this modal.
    pub action_id: String,
    /// The row the action targets, for row actions.
    pub row_id: Option<RowId>,
    /// Free-form data for the UI (title, message, ...).
    pub meta: Option<Value>,
}

impl ModalDescriptor {
    /// Descriptor for a list-wide action.
    pub fn general(action_id: impl Into<String>) -> Self {
        Self {
            scope: ModalScope::GeneralAction,
            action_id: action_id.into(),
            row_id: None,
            meta: None,
        }
    }

    /// Descriptor for an action on one row.
    pub fn row(action_id: impl Into<String>, row_id: impl Into<RowId>) -> Self {
        Self {
            scope: ModalScope::RowAction,
            action_id: action_id.into(),
            row_id: Some(row_id.into()),
            meta: None,
        }
    }

    /// Attach UI metadata.
    pub fn with_meta(mut self, meta: Value) -> Self {
        self.meta = Some(meta);
        self
    }
}

/// Outcome of a modal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalResult {
    /// The user accepted, optionally with form data.
    Confirmed {
        /// The modal that was shown.
        descriptor: ModalDescriptor,
        /// Data collected by the modal.
        payload: Option<Value>,
    },
    /// The user dismissed the modal, or a newer one replaced it.
    Cancelled {
        /// The modal that was shown.
        descriptor: ModalDescriptor,
    },
}

impl ModalResult {
    /// The modal this result resolves.
    pub fn descriptor(&self) -> &ModalDescriptor {
        match self {
            Self::Confirmed { descriptor, .. } | Self::Cancelled { descriptor } => descriptor,
        }
    }

    /// Check if the modal was confirmed.
    pub fn is_confirmed(&self) -> bool {
        matches!(self, Self::Confirmed { .. })
    }

    /// Payload supplied on confirmation.
    pub fn payload(&self) -> Option<&Value> {
        match self {
            Self::Confirmed { payload, .. } => payload.as_ref(),
            Self::Cancelled { .. } => None,
        }
    }
}

/// What happens when a modal opens while another is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModalPolicy {
    /// The new modal replaces the active one, which resolves as cancelled.
    #[default]
    SingleFlight,
    /// The new modal waits until the active one resolves.
    Queue,
}

/// Modals slice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModalsState {
    /// The modal on screen.
    pub active: Option<ModalDescriptor>,
    /// Modals waiting behind the active one, oldest first.
    pub queue: VecDeque<ModalDescriptor>,
}

/// Receives modal resolutions.
pub trait ModalRequester: Send + Sync {
    /// Called for every resolution, including ones this requester did not ask for.
    fn handle_resolution(&self, result: &ModalResult);
}

/// The side that shows modals.
pub trait ModalHost: Send + Sync {
    /// Show `descriptor`.
    fn open(&self, descriptor: ModalDescriptor) -> bool;

    /// The descriptor currently shown.
    fn active(&self) -> Option<ModalDescriptor>;

    /// Forward resolutions to `requester` while the returned guard lives.
    fn attach(&self, requester: Weak<dyn ModalRequester>) -> Subscription;
}

/// Public API of the modals feature.
pub struct ModalsApi {
    slice: Slice<ModalsState>,
    policy: ModalPolicy,
    listeners: ListenerSet<ModalResult>,
    waiters: Mutex<Vec<(ModalDescriptor, oneshot::Sender<ModalResult>)>>,
}

impl ModalsApi {
    /// Show `descriptor` according to the policy.
    ///
    /// Returns false if the same descriptor is already active or queued.
    pub fn open(&self, descriptor: ModalDescriptor) -> bool {
        let policy = self.policy;
        let (opened, superseded) = self.slice.update(|s| {
            if s.active.as_ref() == Some(&descriptor) || s.queue.contains(&descriptor) {
                return (false, None);
            }
            match policy {
                ModalPolicy::SingleFlight => (true, s.active.replace(descriptor.clone())),
                ModalPolicy::Queue => {
                    if s.active.is_none() {
                        s.active = Some(descriptor.clone());
                    } else {
                        s.queue.push_back(descriptor.clone());
                    }
                    (true, None)
                }
            }
        });
        if let Some(previous) = superseded {
            log::debug!("modal '{}' superseded by '{}'", previous.action_id, descriptor.action_id);
            self.resolve(ModalResult::Cancelled {
                descriptor: previous,
            });
        }
        opened
    }

    /// Open `descriptor` and wait for its resolution.
    ///
    /// Yields `None` if the API is dropped first or the descriptor was
    /// already pending.
    pub async fn open_and_wait(&self, descriptor: ModalDescriptor) -> Option<ModalResult> {
        let (tx, rx) = oneshot::channel();
        self.waiters
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((descriptor.clone(), tx));
        if !self.open(descriptor.clone()) {
            let mut waiters = self.waiters.lock().unwrap_or_else(|e| e.into_inner());
            if let Some(i) = waiters.iter().rposition(|(d, _)| d == &descriptor) {
                waiters.remove(i);
            }
            return None;
        }
        rx.await.ok()
    }

    /// Confirm the active modal. Returns false if none is active.
    pub fn confirm(&self, payload: Option<Value>) -> bool {
        match self.take_active() {
            Some(descriptor) => {
                self.resolve(ModalResult::Confirmed {
                    descriptor,
                    payload,
                });
                true
            }
            None => false,
        }
    }

    /// Cancel the active modal. Returns false if none is active.
    pub fn cancel(&self) -> bool {
        match self.take_active() {
            Some(descriptor) => {
                self.resolve(ModalResult::Cancelled { descriptor });
                true
            }
            None => false,
        }
    }

    /// Subscribe to every resolution.
    pub fn on_resolve<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&ModalResult) + Send + Sync + 'static,
    {
        self.listeners.add(listener)
    }

    /// The active descriptor.
    pub fn active(&self) -> Option<ModalDescriptor> {
        self.slice.get().active
    }

    /// Descriptors waiting behind the active one.
    pub fn queued(&self) -> Vec<ModalDescriptor> {
        self.slice.get().queue.into()
    }

    /// The opening policy.
    pub fn policy(&self) -> ModalPolicy {
        self.policy
    }

    /// Clear the slice, promoting the next queued descriptor.
    fn take_active(&self) -> Option<ModalDescriptor> {
        self.slice.update(|s| {
            let current = s.active.take();
            s.active = s.queue.pop_front();
            current
        })
    }

    /// Notify waiters and subscribers. The slice is already updated.
    fn resolve(&self, result: ModalResult) {
        let waiter = {
            let mut waiters = self.waiters.lock().unwrap_or_else(|e| e.into_inner());
            waiters
                .iter()
                .position(|(d, _)| d == result.descriptor())
                .map(|i| waiters.remove(i).1)
        };
        if let Some(tx) = waiter {
            let _ = tx.send(result.clone());
        }
        self.listeners.notify(&result);
    }
}

impl ModalHost for ModalsApi {
    fn open(&self, descriptor: ModalDescriptor) -> bool {
        ModalsApi::open(self, descriptor)
    }

    fn active(&self) -> Option<ModalDescriptor> {
        ModalsApi::active(self)
    }

    fn attach(&self, requester: Weak<dyn ModalRequester>) -> Subscription {
        self.on_resolve(move |result| {
            if let Some(requester) = requester.upgrade() {
                requester.handle_resolution(result);
            }
        })
    }
}

impl FeatureApi for ModalsApi {
    fn handlers(&self) -> Vec<&'static str> {
        vec!["open", "confirm", "cancel", "on_resolve"]
    }
}

/// The modals feature.
pub fn modals(policy: ModalPolicy) -> FeatureDescriptor {
    FeatureDescriptor::new(MODALS, move |cx| {
        let api = Arc::new(ModalsApi {
            slice: cx.slice(ModalsState::default()),
            policy,
            listeners: ListenerSet::new(),
            waiters: Mutex::new(Vec::new()),
        });
        let teardown = Arc::clone(&api);
        Ok(FeatureBuild::with_api(api).on_destroy(move |_| {
            teardown
                .waiters
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .clear();
            Ok(())
        }))
    })
    .ui(UiContract::new()
        .slot("Modal")
        .requires("confirm")
        .requires("cancel"))
}
