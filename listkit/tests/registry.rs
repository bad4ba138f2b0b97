//! Registration, ordering and compilation.

mod common;

use std::sync::Arc;

use listkit::features::{FILTERS, PAGINATION, SORTING, filters, pagination, sorting};
use listkit::prelude::*;

use common::{EventLog, recording_feature, runtime};

fn noop(id: &'static str) -> FeatureDescriptor {
    FeatureDescriptor::new(id, |_| Ok(FeatureBuild::new()))
}

#[derive(Debug)]
struct Counter(usize);

impl FeatureApi for Counter {
    fn handlers(&self) -> Vec<&'static str> {
        vec!["value"]
    }
}

#[test]
fn test_duplicate_id_is_rejected() {
    let err = FeatureRegistry::new()
        .register(noop("a"))
        .unwrap()
        .register(noop("a"))
        .unwrap_err();
    assert!(matches!(err, ListError::DuplicateFeature { ref id } if id.as_str() == "a"));
}

#[test]
fn test_builtins_resolve_in_dependency_order() {
    // Registered backwards on purpose.
    let registry = FeatureRegistry::new()
        .register(pagination::pagination(Default::default()))
        .unwrap()
        .register(sorting::sorting(None))
        .unwrap()
        .register(filters::filters())
        .unwrap();
    let order = registry.resolve_order().unwrap();
    let names: Vec<_> = order.iter().map(FeatureId::as_str).collect();
    assert_eq!(names, vec!["sorting", "filters", "pagination"]);
}

#[test]
fn test_cycle_names_participants() {
    let err = FeatureRegistry::new()
        .register(noop("a").after(["b"]))
        .unwrap()
        .register(noop("b").after(["a"]))
        .unwrap()
        .register(noop("c"))
        .unwrap()
        .resolve_order()
        .unwrap_err();
    let ListError::OrderCycle { features } = &err else {
        panic!("expected a cycle, got {err:?}");
    };
    let names: Vec<_> = features.iter().map(FeatureId::as_str).collect();
    assert_eq!(names, vec!["a", "b"]);
}

#[test]
fn test_unknown_constraints_are_ignored() {
    let order = FeatureRegistry::new()
        .register(noop("a").after(["ghost"]))
        .unwrap()
        .register(noop("b").before(["phantom"]))
        .unwrap()
        .resolve_order()
        .unwrap();
    assert_eq!(order, vec![FeatureId::from("a"), FeatureId::from("b")]);
}

#[test]
fn test_order_is_deterministic() {
    let build = || {
        FeatureRegistry::new()
            .register_all([
                noop("d"),
                noop("c").before(["a"]),
                noop("b"),
                noop("a").after(["d"]),
            ])
            .unwrap()
    };
    let first = build().resolve_order().unwrap();
    for _ in 0..10 {
        assert_eq!(build().resolve_order().unwrap(), first);
    }
}

#[test]
fn test_create_failure_aborts_compilation() {
    let registry = FeatureRegistry::new()
        .register(noop("fine"))
        .unwrap()
        .register(FeatureDescriptor::new("broken", |cx| {
            Err(ListError::FeatureCreate {
                id: cx.id().clone(),
                message: "no backend".into(),
            })
        }))
        .unwrap();
    let err = ListRuntime::builder(registry).id_key("id").build().unwrap_err();
    assert!(err.to_string().contains("no backend"));
}

#[test]
fn test_peer_api_visible_only_when_created_earlier() {
    let registry = FeatureRegistry::new()
        .register(FeatureDescriptor::new("reader", |cx| {
            let counter = cx.feature::<Counter>("counter")?;
            assert_eq!(counter.0, 7);
            Ok(FeatureBuild::new())
        }))
        .unwrap()
        .register(
            FeatureDescriptor::new("counter", |_| Ok(FeatureBuild::with_api(Arc::new(Counter(7)))))
                .before(["reader"]),
        )
        .unwrap();
    let _runtime = runtime(registry);

    let registry = FeatureRegistry::new()
        .register(FeatureDescriptor::new("reader", |cx| {
            cx.feature::<Counter>("counter")?;
            Ok(FeatureBuild::new())
        }))
        .unwrap()
        .register(noop("counter"))
        .unwrap();
    let err = ListRuntime::builder(registry).id_key("id").build().unwrap_err();
    assert!(matches!(err, ListError::FeatureNotCreated { .. }));
}

#[test]
fn test_api_type_mismatch() {
    let registry = FeatureRegistry::new()
        .register(sorting::sorting(None))
        .unwrap();
    let runtime = runtime(registry);
    let err = runtime.feature::<Counter>(SORTING).unwrap_err();
    assert!(matches!(err, ListError::FeatureApiMismatch { .. }));
    assert!(runtime.feature::<sorting::SortingApi>(SORTING).is_ok());
    assert!(matches!(
        runtime.feature::<filters::FiltersApi>(FILTERS),
        Err(ListError::FeatureNotCreated { .. })
    ));
}

#[test]
fn test_plan_lists_hooks_in_resolved_order() {
    let log = EventLog::default();
    let registry = FeatureRegistry::new()
        .register(recording_feature("second", &log).after(["first"]))
        .unwrap()
        .register(recording_feature("first", &log))
        .unwrap()
        .register(pagination::pagination(Default::default()))
        .unwrap();
    let runtime = runtime(registry);
    let plan = runtime.plan();
    let init: Vec<_> = plan.init_features().into_iter().map(|id| id.as_str()).collect();
    assert_eq!(init, vec!["first", "second"]);
    let derive = plan.derive_pipeline().feature_ids();
    assert_eq!(derive, vec![PAGINATION]);
}

#[test]
fn test_missing_id_key_is_rejected() {
    let err = ListRuntime::builder(FeatureRegistry::new()).build().unwrap_err();
    assert!(matches!(err, ListError::MissingIdKey));
}
