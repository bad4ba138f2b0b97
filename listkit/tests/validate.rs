//! UI contract validation.

mod common;

use std::sync::Arc;

use listkit::features::pagination::{PaginationState, pagination};
use listkit::features::sorting::sorting;
use listkit::prelude::*;
use listkit::validate::{UiContractViolation, collect_violations};

use common::runtime;

/// A sort bar whose API forgot `set_sort`.
struct BrokenSortApi;

impl FeatureApi for BrokenSortApi {
    fn handlers(&self) -> Vec<&'static str> {
        vec!["toggle_sort"]
    }
}

/// Declares `set_sort` but refuses to be called through it.
struct LockedSortApi;

impl FeatureApi for LockedSortApi {
    fn handlers(&self) -> Vec<&'static str> {
        vec!["set_sort"]
    }

    fn is_callable(&self, _handler: &str) -> bool {
        false
    }
}

fn sort_bar() -> UiContract {
    UiContract::new().slot("SortBar").requires("set_sort")
}

fn broken_sorting() -> FeatureRegistry {
    FeatureRegistry::new()
        .register(
            FeatureDescriptor::new("sorting", |_| {
                Ok(FeatureBuild::with_api(Arc::new(BrokenSortApi)))
            })
            .ui(sort_bar()),
        )
        .unwrap()
}

fn sort_bar_rendered() -> UiComponents {
    UiComponents::new().with("SortBar", "MySortBar")
}

#[test]
fn test_builtin_contracts_are_satisfied() {
    let registry = FeatureRegistry::new()
        .register_all([sorting(None), pagination(PaginationState::default())])
        .unwrap();
    let runtime = runtime(registry);
    let ui = UiComponents::new()
        .with("SortBar", "SortBar")
        .with("Pagination", "Pager");
    assert!(runtime.validate_ui(&ui, &ValidationOptions::throw()).is_ok());
}

#[test]
fn test_missing_handler_throws() {
    let runtime = runtime(broken_sorting());
    let err = runtime
        .validate_ui(&sort_bar_rendered(), &ValidationOptions::throw())
        .unwrap_err();
    let ListError::UiContract(violations) = &err else {
        panic!("unexpected error: {err:?}");
    };
    assert_eq!(
        violations,
        &vec![UiContractViolation::MissingHandler {
            feature: "sorting".into(),
            handler: "set_sort".into(),
        }]
    );
    assert!(err.to_string().contains("set_sort"));
}

#[test]
fn test_missing_handler_warns() {
    let runtime = runtime(broken_sorting());
    assert!(
        runtime
            .validate_ui(&sort_bar_rendered(), &ValidationOptions::warn())
            .is_ok()
    );
}

#[test]
fn test_disabled_validation_skips_checks() {
    let runtime = runtime(broken_sorting());
    let options = ValidationOptions::throw().enabled(false);
    assert!(runtime.validate_ui(&sort_bar_rendered(), &options).is_ok());
}

#[test]
fn test_unrendered_slots_are_not_checked() {
    let runtime = runtime(broken_sorting());
    let ui = UiComponents::new().with("SortBar", "  ");
    assert!(collect_violations(&runtime, &ui).is_empty());
    assert!(collect_violations(&runtime, &UiComponents::new()).is_empty());
}

#[test]
fn test_feature_without_api() {
    let registry = FeatureRegistry::new()
        .register(FeatureDescriptor::new("sorting", |_| Ok(FeatureBuild::new())).ui(sort_bar()))
        .unwrap();
    let runtime = runtime(registry);
    let violations = collect_violations(&runtime, &sort_bar_rendered());
    assert!(matches!(
        violations.as_slice(),
        [UiContractViolation::MissingApi { slots, .. }] if slots == &vec!["SortBar".to_string()]
    ));
}

#[test]
fn test_uncallable_handler() {
    let registry = FeatureRegistry::new()
        .register(
            FeatureDescriptor::new("sorting", |_| {
                Ok(FeatureBuild::with_api(Arc::new(LockedSortApi)))
            })
            .ui(sort_bar()),
        )
        .unwrap();
    let runtime = runtime(registry);
    let violations = collect_violations(&runtime, &sort_bar_rendered());
    assert_eq!(
        violations,
        vec![UiContractViolation::HandlerNotCallable {
            feature: "sorting".into(),
            handler: "set_sort".into(),
        }]
    );
}
