//! Error types for the list runtime.
//!
//! Configuration mistakes surface as [`ListError`] at compile or trigger time.
//! Data source failures are [`IngestError`] values stored in state, and
//! lifecycle hooks report [`HookError`].

use std::any::Any;
use std::fmt;

use thiserror::Error;

use crate::feature::FeatureId;
use crate::validate::UiContractViolation;

/// Errors raised by the registry, the runtime and the built-in features.
#[derive(Debug, Clone, Error)]
pub enum ListError {
    /// Two descriptors were registered under the same id.
    #[error("feature '{id}' is already registered")]
    DuplicateFeature {
        /// The colliding id.
        id: FeatureId,
    },

    /// The `before`/`after` constraints cannot be satisfied.
    #[error("feature ordering cycle between: {}", join_ids(.features))]
    OrderCycle {
        /// Features taking part in the cycle, in traversal order.
        features: Vec<FeatureId>,
    },

    /// A feature's `create` call failed.
    #[error("feature '{id}' failed to initialize: {message}")]
    FeatureCreate {
        /// The failing feature.
        id: FeatureId,
        /// What went wrong.
        message: String,
    },

    /// A feature API was requested that has not been created (yet).
    #[error("feature '{id}' is not available; declare it in `after` or register it")]
    FeatureNotCreated {
        /// The requested feature.
        id: FeatureId,
    },

    /// A feature API exists but is not of the requested type.
    #[error("feature '{id}' does not expose an API of type {expected}")]
    FeatureApiMismatch {
        /// The requested feature.
        id: FeatureId,
        /// The type name the caller asked for.
        expected: &'static str,
    },

    /// Static metadata lacks the row id key.
    #[error("list metadata requires a non-empty id key")]
    MissingIdKey,

    /// An action declares a confirmation modal but no modals feature exists.
    #[error("action '{action_id}' requires confirmation but no modals feature is registered")]
    ModalsUnavailable {
        /// The action that asked for confirmation.
        action_id: String,
    },

    /// An action id that was never declared.
    #[error("unknown action '{action_id}'")]
    UnknownAction {
        /// The requested action.
        action_id: String,
    },

    /// A field that the schema does not allow for the requested operation.
    #[error("field '{field}' cannot be used for {operation}")]
    FieldNotAllowed {
        /// The field key.
        field: String,
        /// The refused operation (e.g. "sorting").
        operation: &'static str,
    },

    /// One or more UI contract violations, reported together.
    #[error("UI contract violations:\n{}", join_violations(.0))]
    UiContract(Vec<UiContractViolation>),

    /// A lifecycle hook failed during `init` or `refresh`.
    #[error("feature '{id}' {stage} hook failed: {source}")]
    Hook {
        /// The feature owning the hook.
        id: FeatureId,
        /// Lifecycle stage name.
        stage: &'static str,
        /// The hook's error.
        #[source]
        source: HookError,
    },
}

fn join_ids(ids: &[FeatureId]) -> String {
    ids.iter()
        .map(|id| id.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn join_violations(violations: &[UiContractViolation]) -> String {
    violations
        .iter()
        .map(|v| format!("  - {v}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Error returned by a feature lifecycle hook.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct HookError {
    /// Error message.
    pub message: String,
}

impl HookError {
    /// Create a new hook error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for HookError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for HookError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<ListError> for HookError {
    fn from(err: ListError) -> Self {
        Self::new(err.to_string())
    }
}

/// Error produced by a [`DataSource`](crate::ingest::DataSource).
///
/// Stored in [`ListState`](crate::state::ListState) with
/// [`ListStatus::Error`](crate::state::ListStatus::Error) rather than returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct IngestError {
    /// Error message.
    pub message: String,
}

impl IngestError {
    /// Create a new ingestion error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for IngestError {
    fn from(err: std::io::Error) -> Self {
        Self::new(err.to_string())
    }
}

impl From<String> for IngestError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for IngestError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// Extract a human-readable message from a panic payload.
pub(crate) fn extract_panic_message(panic: &Box<dyn Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Display wrapper used in log lines for optional ids.
pub(crate) struct OptDisplay<'a, T>(pub Option<&'a T>);

impl<T: fmt::Display> fmt::Display for OptDisplay<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(v) => write!(f, "{v}"),
            None => f.write_str("-"),
        }
    }
}
