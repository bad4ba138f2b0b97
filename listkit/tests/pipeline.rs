//! Built-in data features working together over loaded rows.

mod common;

use std::sync::Arc;

use listkit::features::filters::{FilterRule, FiltersApi, filters};
use listkit::features::pagination::{PaginationApi, PaginationState, pagination};
use listkit::features::selection::{SelectionApi, SelectionMode, selection};
use listkit::features::sorting::{SortDirection, SortState, SortingApi, sorting};
use listkit::features::{FILTERS, PAGINATION, SELECTION, SORTING};
use listkit::prelude::*;
use serde_json::json;

use common::{ids, loaded_runtime, numbered_rows, row};

fn page(size: usize) -> PaginationState {
    PaginationState {
        page_index: 0,
        page_size: size,
    }
}

fn data_features(page_size: usize) -> FeatureRegistry {
    FeatureRegistry::new()
        .register_all([
            pagination(page(page_size)),
            sorting(None),
            filters(),
        ])
        .unwrap()
}

#[tokio::test]
async fn test_filter_sort_paginate() {
    let runtime = loaded_runtime(data_features(10), numbered_rows(25)).await;
    let filters: Arc<FiltersApi> = runtime.feature(FILTERS).unwrap();
    let sorting: Arc<SortingApi> = runtime.feature(SORTING).unwrap();

    filters
        .set_filter("value", FilterRule::Range { min: Some(11.0), max: None })
        .unwrap();
    sorting.set_sort("value", SortDirection::Desc).unwrap();

    let expected: Vec<String> = (16..=25).rev().map(|i: i64| i.to_string()).collect();
    assert_eq!(ids(runtime.state().rows()), expected);
    assert_eq!(runtime.state().raw_rows().len(), 25);
}

#[tokio::test]
async fn test_sort_then_page_through() {
    let rows = vec![
        row(json!({"id": 1, "name": "b", "age": 30})),
        row(json!({"id": 2, "name": "a", "age": 25})),
    ];
    let runtime = loaded_runtime(data_features(1), rows).await;
    let sorting: Arc<SortingApi> = runtime.feature(SORTING).unwrap();
    let pages: Arc<PaginationApi> = runtime.feature(PAGINATION).unwrap();

    sorting.set_sort("name", SortDirection::Asc).unwrap();
    assert_eq!(
        runtime.state().rows(),
        &[row(json!({"id": 2, "name": "a", "age": 25}))]
    );

    pages.set_page_index(1);
    assert_eq!(
        runtime.state().rows(),
        &[row(json!({"id": 1, "name": "b", "age": 30}))]
    );
}

#[tokio::test]
async fn test_toggle_sort_cycles() {
    let runtime = loaded_runtime(data_features(10), numbered_rows(3)).await;
    let sorting: Arc<SortingApi> = runtime.feature(SORTING).unwrap();

    sorting.toggle_sort("value").unwrap();
    assert_eq!(sorting.state(), Some(SortState::asc("value")));
    sorting.toggle_sort("value").unwrap();
    assert_eq!(sorting.state(), Some(SortState::desc("value")));
    assert_eq!(ids(runtime.state().rows()), vec!["3", "2", "1"]);
    sorting.toggle_sort("value").unwrap();
    assert_eq!(sorting.state(), None);
    assert_eq!(ids(runtime.state().rows()), vec!["1", "2", "3"]);
}

#[tokio::test]
async fn test_schema_restricts_sorting_and_filtering() {
    let runtime = ListRuntime::builder(data_features(10))
        .id_key("id")
        .field(FieldSpec::new("name"))
        .field(FieldSpec::new("value").kind(FieldKind::Number).unsortable().unfilterable())
        .build()
        .unwrap();
    let sorting: Arc<SortingApi> = runtime.feature(SORTING).unwrap();
    let filters: Arc<FiltersApi> = runtime.feature(FILTERS).unwrap();

    assert!(matches!(
        sorting.set_sort("value", SortDirection::Asc),
        Err(ListError::FieldNotAllowed { .. })
    ));
    assert!(filters.set_filter("value", FilterRule::Equals(json!(1))).is_err());
    assert!(sorting.set_sort("name", SortDirection::Asc).is_ok());
    // Custom rules are named, not bound to a field.
    let odd = FilterRule::custom(|r| {
        r.get("value")
            .and_then(|v| v.as_i64())
            .is_some_and(|v| v % 2 == 1)
    });
    assert!(filters.set_filter("odd", odd).is_ok());
}

#[tokio::test]
async fn test_search_and_clear() {
    let rows = vec![
        row(json!({"id": 1, "name": "Alpha"})),
        row(json!({"id": 2, "name": "beta"})),
        row(json!({"id": 3, "name": "alphabet"})),
    ];
    let runtime = loaded_runtime(data_features(10), rows).await;
    let filters: Arc<FiltersApi> = runtime.feature(FILTERS).unwrap();

    filters.set_search("ALPHA");
    assert_eq!(ids(runtime.state().rows()), vec!["1", "3"]);

    filters.set_search("   ");
    assert!(filters.state().search.is_none());
    assert_eq!(runtime.state().rows().len(), 3);

    filters.set_filter("name", FilterRule::Contains("bet".into())).unwrap();
    assert_eq!(ids(runtime.state().rows()), vec!["2", "3"]);
    assert!(filters.remove_filter("name"));
    assert!(!filters.remove_filter("name"));
    filters.clear_filters();
    assert!(filters.state().is_empty());
}

#[tokio::test]
async fn test_page_size_change_resets_index() {
    let runtime = loaded_runtime(data_features(5), numbered_rows(12)).await;
    let pages: Arc<PaginationApi> = runtime.feature(PAGINATION).unwrap();

    pages.next_page();
    pages.next_page();
    assert_eq!(ids(runtime.state().rows()), vec!["11", "12"]);
    assert_eq!(pages.page_count(12), 3);

    pages.set_page_size(4);
    assert_eq!(pages.state(), page(4));
    assert_eq!(ids(runtime.state().rows()), vec!["1", "2", "3", "4"]);

    pages.prev_page();
    assert_eq!(pages.state().page_index, 0);
}

#[tokio::test]
async fn test_selection_over_visible_rows() {
    let registry = data_features(3)
        .register(selection(SelectionMode::Multi))
        .unwrap();
    let source = Arc::new(StaticDataSource::new(numbered_rows(6)));
    let runtime = ListRuntime::builder(registry)
        .id_key("id")
        .source(source.clone())
        .build()
        .unwrap();
    runtime.init().await.unwrap();
    let selection: Arc<SelectionApi> = runtime.feature(SELECTION).unwrap();

    assert!(selection.select_all());
    assert_eq!(
        selection.selected(),
        vec![RowId::from(1), RowId::from(2), RowId::from(3)]
    );
    assert!(selection.toggle(2));
    assert!(!selection.is_selected(&RowId::from(2)));

    // Rows that disappear from the source are dropped on refresh.
    source.replace_rows(numbered_rows(6).into_iter().skip(2).collect());
    runtime.refresh().await.unwrap();
    assert_eq!(selection.selected(), vec![RowId::from(3)]);

    selection.clear();
    assert!(selection.selected().is_empty());
}

#[tokio::test]
async fn test_single_selection_mode() {
    let registry = FeatureRegistry::new()
        .register(selection(SelectionMode::Single))
        .unwrap();
    let runtime = loaded_runtime(registry, numbered_rows(3)).await;
    let selection: Arc<SelectionApi> = runtime.feature(SELECTION).unwrap();

    assert!(!selection.select_all());
    selection.select(1);
    selection.select(3);
    assert_eq!(selection.selected(), vec![RowId::from(3)]);
    assert!(selection.deselect(3));
    assert_eq!(selection.mode(), SelectionMode::Single);
}
