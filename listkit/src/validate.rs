//! UI contract validation.
//!
//! For each feature declaring UI slots, check whether the UI renders any of
//! them; if it does, the feature must have produced an API exposing every
//! handler its contract requires.

use std::collections::HashMap;
use std::fmt;

use crate::error::ListError;
use crate::feature::FeatureId;
use crate::runtime::ListRuntime;

/// How violations are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationMode {
    /// Fail with [`ListError::UiContract`].
    #[default]
    Throw,
    /// Log a warning and continue.
    Warn,
}

/// Validation configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationOptions {
    /// Report mode.
    pub mode: ValidationMode,
    /// When false, validation is skipped entirely.
    pub enabled: bool,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            mode: ValidationMode::Throw,
            enabled: true,
        }
    }
}

impl ValidationOptions {
    /// Fail on violations.
    pub fn throw() -> Self {
        Self::default()
    }

    /// Only log violations.
    pub fn warn() -> Self {
        Self {
            mode: ValidationMode::Warn,
            ..Self::default()
        }
    }

    /// Enable or disable validation.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// Components the UI mounts, keyed by slot name.
///
/// An entry with an empty component name counts as not rendered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UiComponents {
    slots: HashMap<String, String>,
}

impl UiComponents {
    /// No components.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mount `component` in `slot`.
    pub fn with(mut self, slot: impl Into<String>, component: impl Into<String>) -> Self {
        self.slots.insert(slot.into(), component.into());
        self
    }

    /// Whether `slot` has a non-empty component.
    pub fn is_rendered(&self, slot: &str) -> bool {
        self.slots.get(slot).is_some_and(|c| !c.trim().is_empty())
    }
}

impl<S: Into<String>, C: Into<String>> FromIterator<(S, C)> for UiComponents {
    fn from_iter<I: IntoIterator<Item = (S, C)>>(iter: I) -> Self {
        Self {
            slots: iter
                .into_iter()
                .map(|(s, c)| (s.into(), c.into()))
                .collect(),
        }
    }
}

/// One UI contract violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiContractViolation {
    /// A slot is rendered but its feature produced no API.
    MissingApi {
        /// The feature.
        feature: FeatureId,
        /// The feature's declared slots.
        slots: Vec<String>,
    },
    /// A required handler does not exist on the feature's API.
    MissingHandler {
        /// The feature.
        feature: FeatureId,
        /// The handler name.
        handler: String,
    },
    /// A required handler exists but cannot be called.
    HandlerNotCallable {
        /// The feature.
        feature: FeatureId,
        /// The handler name.
        handler: String,
    },
}

impl fmt::Display for UiContractViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingApi { feature, slots } => write!(
                f,
                "feature '{feature}' has rendered UI slots [{}] but exposes no API",
                slots.join(", ")
            ),
            Self::MissingHandler { feature, handler } => {
                write!(f, "feature '{feature}' is missing required handler '{handler}'")
            }
            Self::HandlerNotCallable { feature, handler } => {
                write!(f, "feature '{feature}' handler '{handler}' is not callable")
            }
        }
    }
}

/// Collect the violations without reporting them.
pub fn collect_violations(runtime: &ListRuntime, components: &UiComponents) -> Vec<UiContractViolation> {
    let mut violations = Vec::new();
    for (feature, contract) in runtime.plan().ui_contracts() {
        if !contract.slots.iter().any(|slot| components.is_rendered(slot)) {
            continue;
        }
        let Some(api) = runtime.features().get_dyn(feature) else {
            violations.push(UiContractViolation::MissingApi {
                feature: feature.clone(),
                slots: contract.slots.clone(),
            });
            continue;
        };
        for handler in &contract.required_handlers {
            if !api.has_handler(handler) {
                violations.push(UiContractViolation::MissingHandler {
                    feature: feature.clone(),
                    handler: handler.clone(),
                });
            } else if !api.is_callable(handler) {
                violations.push(UiContractViolation::HandlerNotCallable {
                    feature: feature.clone(),
                    handler: handler.clone(),
                });
            }
        }
    }
    violations
}

/// Validate the UI wiring of `runtime` against `components`.
pub fn validate_ui(
    runtime: &ListRuntime,
    components: &UiComponents,
    options: &ValidationOptions,
) -> Result<(), ListError> {
    if !options.enabled {
        return Ok(());
    }
    let violations = collect_violations(runtime, components);
    if violations.is_empty() {
        return Ok(());
    }
    let err = ListError::UiContract(violations);
    match options.mode {
        ValidationMode::Throw => Err(err),
        ValidationMode::Warn => {
            log::warn!("{err}");
            Ok(())
        }
    }
}
