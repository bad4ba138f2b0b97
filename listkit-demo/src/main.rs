use std::fs::File;
use std::sync::Arc;

use listkit::features::actions::{
    ActionOutcome, GeneralAction, GeneralActionsApi, RowAction, RowActionsApi, general_actions,
    row_actions,
};
use listkit::features::filters::{FilterRule, FiltersApi, filters};
use listkit::features::modals::{ModalPolicy, ModalsApi, modals};
use listkit::features::pagination::{PaginationApi, PaginationState, pagination};
use listkit::features::selection::{SelectionApi, SelectionMode, selection};
use listkit::features::sorting::{SortDirection, SortState, SortingApi, sorting};
use listkit::features::{
    FILTERS, GENERAL_ACTIONS, MODALS, PAGINATION, ROW_ACTIONS, SELECTION, SORTING,
};
use listkit::prelude::*;
use serde_json::json;
use simplelog::{Config, LevelFilter, WriteLogger};

const PRODUCTS: [(&str, f64, i64); 12] = [
    ("Anchor", 12.5, 4),
    ("Bellows", 8.0, 0),
    ("Compass", 24.0, 7),
    ("Davit", 99.9, 1),
    ("Ensign", 5.5, 30),
    ("Fender", 15.0, 12),
    ("Gaff", 31.0, 2),
    ("Halyard", 9.75, 18),
    ("Isinglass", 3.2, 0),
    ("Jib", 140.0, 3),
    ("Keel bolt", 6.4, 44),
    ("Lanyard", 2.1, 61),
];

fn log_level() -> LevelFilter {
    std::env::var("LISTKIT_LOG")
        .ok()
        .and_then(|level| level.parse().ok())
        .unwrap_or(LevelFilter::Debug)
}

fn products() -> Vec<Row> {
    PRODUCTS
        .iter()
        .enumerate()
        .map(|(i, (name, price, stock))| {
            Row::new()
                .with("id", i as i64 + 1)
                .with("name", *name)
                .with("price", *price)
                .with("stock", *stock)
        })
        .collect()
}

fn registry() -> Result<FeatureRegistry, ListError> {
    let export = GeneralAction::new("export", |cx, _| {
        println!("  exporting {} rows", cx.all_rows().len());
        Ok(())
    })
    .label("Export");

    let delete_selected = GeneralAction::new("delete_selected", |cx, payload| {
        println!("  deleting {:?} (payload: {payload:?})", cx.selection());
        Ok(())
    })
    .label("Delete selected")
    .enabled_when(|cx| !cx.selection().is_empty())
    .confirm_with(json!({"title": "Delete the selected products?"}));

    let restock = RowAction::new("restock", |row, _, _| {
        println!("  restocking {}", cell(row, "name"));
        Ok(())
    })
    .label("Restock")
    .enabled_when(|row, _| row.get("stock").and_then(|s| s.as_i64()) == Some(0));

    FeatureRegistry::new().register_all([
        filters(),
        sorting(Some(SortState::asc("name"))),
        pagination(PaginationState {
            page_index: 0,
            page_size: 5,
        }),
        selection(SelectionMode::Multi),
        modals(ModalPolicy::SingleFlight),
        general_actions(vec![export, delete_selected]),
        row_actions(vec![restock]),
    ])
}

fn cell(row: &Row, key: &str) -> String {
    match row.get(key) {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(value) => value.to_string(),
        None => "-".to_string(),
    }
}

fn print_page(title: &str, runtime: &ListRuntime) -> Result<(), ListError> {
    let pages: Arc<PaginationApi> = runtime.feature(PAGINATION)?;
    let state = runtime.state();
    let page = pages.state();
    println!(
        "{title} (page {} of {})",
        page.page_index + 1,
        pages.page_count(state.raw_rows().len())
    );
    for row in state.rows() {
        println!(
            "  {:>3}  {:<10} {:>7} {:>4}",
            cell(row, "id"),
            cell(row, "name"),
            cell(row, "price"),
            cell(row, "stock"),
        );
    }
    Ok(())
}

async fn run() -> Result<(), ListError> {
    let (bindings, mut refreshes) = RuntimeBindings::with_refresh_channel();
    let source = Arc::new(StaticDataSource::new(products()));
    let runtime = ListRuntime::new(
        registry()?,
        bindings,
        ListMeta::new("id")
            .field(FieldSpec::new("name").label("Name"))
            .field(FieldSpec::new("price").label("Price").kind(FieldKind::Number))
            .field(FieldSpec::new("stock").label("Stock").kind(FieldKind::Number)),
    )?
    .with_source(source.clone());

    let ui = UiComponents::new()
        .with("SortBar", "SortBar")
        .with("Pagination", "Pager")
        .with("Toolbar", "Toolbar")
        .with("RowActions", "RowMenu")
        .with("Modal", "ConfirmDialog");
    runtime.validate_ui(&ui, &ValidationOptions::warn())?;

    runtime.init().await?;
    print_page("Products by name", &runtime)?;

    let filters: Arc<FiltersApi> = runtime.feature(FILTERS)?;
    let sorting: Arc<SortingApi> = runtime.feature(SORTING)?;
    let pages: Arc<PaginationApi> = runtime.feature(PAGINATION)?;
    filters.set_filter("price", FilterRule::Range {
        min: Some(5.0),
        max: None,
    })?;
    sorting.set_sort("price", SortDirection::Desc)?;
    print_page("Price >= 5, most expensive first", &runtime)?;
    pages.next_page();
    print_page("Next page", &runtime)?;

    let row_actions: Arc<RowActionsApi> = runtime.feature(ROW_ACTIONS)?;
    for row in runtime.state().rows() {
        let Some(id) = row.id("id") else {
            continue;
        };
        if row_actions.trigger("restock", id)? == ActionOutcome::Executed {
            log::info!("restock ran");
        }
    }

    let selection: Arc<SelectionApi> = runtime.feature(SELECTION)?;
    let actions: Arc<GeneralActionsApi> = runtime.feature(GENERAL_ACTIONS)?;
    let modals: Arc<ModalsApi> = runtime.feature(MODALS)?;
    selection.select_all();
    println!("Selected {} rows", selection.selected().len());
    let outcome = actions.trigger("delete_selected")?;
    println!("delete_selected: {outcome:?}, modal: {:?}", modals.active());
    modals.confirm(Some(json!({"reason": "discontinued"})));
    actions.trigger("export")?;

    // A source-side change, then the refresh a poller would issue.
    source.replace_rows(products().into_iter().take(3).collect());
    runtime.context().request_refresh();
    if refreshes.try_recv().is_some() {
        runtime.refresh().await?;
    }
    filters.clear_filters();
    print_page("After refresh", &runtime)?;
    println!("Still selected: {:?}", selection.selected());

    runtime.destroy();
    Ok(())
}

#[tokio::main]
async fn main() {
    let log_file = File::create("listkit-demo.log").expect("Failed to create log file");
    WriteLogger::init(log_level(), Config::default(), log_file)
        .expect("Failed to initialize logger");

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
    }
}
