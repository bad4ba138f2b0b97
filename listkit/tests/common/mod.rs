//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use listkit::prelude::*;
use serde_json::{Value, json};

/// Build a row from a JSON object literal.
pub fn row(value: Value) -> Row {
    Row::from_value(value).expect("fixture rows are objects")
}

/// `n` rows `{id, name, value}` with `value` counting from 1.
pub fn numbered_rows(n: i64) -> Vec<Row> {
    (1..=n)
        .map(|i| row(json!({"id": i, "name": format!("row-{i:02}"), "value": i})))
        .collect()
}

/// Ids of `rows` under the `id` key, as strings.
pub fn ids(rows: &[Row]) -> Vec<String> {
    rows.iter()
        .map(|r| r.id("id").expect("fixture rows have ids").to_string())
        .collect()
}

/// A shared, append-only event log for ordering assertions.
#[derive(Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<String>>>);

impl EventLog {
    pub fn push(&self, event: impl Into<String>) {
        self.0.lock().unwrap().push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

/// A feature with no API that records its lifecycle into `log`.
pub fn recording_feature(id: &'static str, log: &EventLog) -> FeatureDescriptor {
    let log = log.clone();
    FeatureDescriptor::new(id, move |_cx| {
        let (init, refresh, destroy) = (log.clone(), log.clone(), log.clone());
        Ok(FeatureBuild::new()
            .on_init(move |_| {
                let log = init.clone();
                async move {
                    log.push(format!("{id}:init"));
                    Ok(())
                }
            })
            .on_refresh(move |_| {
                let log = refresh.clone();
                async move {
                    log.push(format!("{id}:refresh"));
                    Ok(())
                }
            })
            .on_destroy(move |_| {
                destroy.push(format!("{id}:destroy"));
                Ok(())
            }))
    })
}

/// Runtime over `registry` with id key `id` and no data source.
pub fn runtime(registry: FeatureRegistry) -> ListRuntime {
    ListRuntime::builder(registry)
        .id_key("id")
        .build()
        .expect("runtime builds")
}

/// Runtime over `registry` fed by a static source holding `rows`.
pub async fn loaded_runtime(registry: FeatureRegistry, rows: Vec<Row>) -> ListRuntime {
    let runtime = ListRuntime::builder(registry)
        .id_key("id")
        .source(Arc::new(StaticDataSource::new(rows)))
        .build()
        .expect("runtime builds");
    runtime.init().await.expect("init succeeds");
    runtime
}
