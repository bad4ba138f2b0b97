//! The list runtime: owns the compiled feature plan and the shared context,
//! derives rows, and drives the `init`/`refresh`/`destroy` lifecycle.

pub mod refresh;

pub use refresh::{RefreshReceiver, RefreshSender};

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{ListError, extract_panic_message};
use crate::feature::{
    CompiledFeaturePlan, FeatureApi, FeatureApis, FeatureId, FeatureRegistry, LifecycleFn,
    ListContext,
};
use crate::ingest::{DataIngestion, DataSource};
use crate::listeners::Subscription;
use crate::meta::{FieldSpec, ListMeta};
use crate::row::Row;
use crate::state::{ListState, ListStore};
use crate::store::Store;
use crate::validate::{UiComponents, ValidationOptions, validate_ui};

/// Host-supplied bindings: the state store (accessor and mutator) and the
/// refresh trigger.
#[derive(Debug, Clone, Default)]
pub struct RuntimeBindings {
    /// Store holding the list snapshot.
    pub store: Store<ListState>,
    /// Trigger features use to request a refresh.
    pub refresh: RefreshSender,
}

impl RuntimeBindings {
    /// Fresh store, detached refresh trigger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh store plus a connected refresh channel.
    pub fn with_refresh_channel() -> (Self, RefreshReceiver) {
        let (tx, rx) = refresh::channel();
        (
            Self {
                store: Store::default(),
                refresh: tx,
            },
            rx,
        )
    }
}

/// Runs a compiled feature plan against a list store.
///
/// `init` and `refresh` first run the data source (if any), then the
/// features' hooks one after another in resolved order. `destroy` runs every
/// teardown hook even when some of them fail.
pub struct ListRuntime {
    cx: ListContext,
    plan: CompiledFeaturePlan,
    ingestion: Option<DataIngestion>,
    destroyed: AtomicBool,
}

impl ListRuntime {
    /// Compile `registry` against `bindings`.
    ///
    /// Fails on invalid metadata, ordering cycles, or any failing feature
    /// `create`; no partially built runtime is returned.
    pub fn new(
        registry: FeatureRegistry,
        bindings: RuntimeBindings,
        meta: ListMeta,
    ) -> Result<Self, ListError> {
        meta.validate()?;
        let store = ListStore::new(bindings.store, meta);
        let plan = registry.compile(&store, &bindings.refresh)?;
        store.install_pipeline(&plan.derive);
        let cx = ListContext::new(store, bindings.refresh, Arc::clone(&plan.apis));

        Ok(Self {
            cx,
            plan,
            ingestion: None,
            destroyed: AtomicBool::new(false),
        })
    }

    /// Start building a runtime.
    pub fn builder(registry: FeatureRegistry) -> ListRuntimeBuilder {
        ListRuntimeBuilder::new(registry)
    }

    /// Attach a data source.
    pub fn with_source(mut self, source: Arc<dyn DataSource>) -> Self {
        self.ingestion = Some(DataIngestion::new(source, self.cx.store().clone()));
        self
    }

    /// Run the derive pipeline over `raw_rows` against the current feature
    /// state.
    pub fn derive(&self, raw_rows: &[Row]) -> Vec<Row> {
        let state = self.cx.state();
        self.cx.store().derive_for(raw_rows, &state)
    }

    /// Load data, then run every `on_init` hook in order.
    pub async fn init(&self) -> Result<(), ListError> {
        if let Some(ingestion) = &self.ingestion {
            ingestion.init().await;
        }
        self.run_hooks("init", &self.plan.on_init).await
    }

    /// Reload data, then run every `on_refresh` hook in order.
    pub async fn refresh(&self) -> Result<(), ListError> {
        if let Some(ingestion) = &self.ingestion {
            ingestion.refresh().await;
        }
        self.run_hooks("refresh", &self.plan.on_refresh).await
    }

    /// Run every `on_destroy` hook, then release the data source.
    ///
    /// Failing or panicking hooks are logged and skipped. Only the first call
    /// does anything.
    pub fn destroy(&self) {
        if self.destroyed.swap(true, Ordering::SeqCst) {
            return;
        }
        for (id, hook) in &self.plan.on_destroy {
            match std::panic::catch_unwind(AssertUnwindSafe(|| hook(&self.cx))) {
                Ok(Ok(())) => {}
                Ok(Err(err)) => log::warn!("feature '{id}' destroy hook failed: {err}"),
                Err(panic) => log::warn!(
                    "feature '{id}' destroy hook panicked: {}",
                    extract_panic_message(&panic)
                ),
            }
        }
        if let Some(ingestion) = &self.ingestion {
            ingestion.destroy();
        }
    }

    /// Whether `destroy` has run.
    pub fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::SeqCst)
    }

    /// Check the UI wiring against the features' UI contracts.
    pub fn validate_ui(
        &self,
        components: &UiComponents,
        options: &ValidationOptions,
    ) -> Result<(), ListError> {
        validate_ui(self, components, options)
    }

    /// The shared context.
    pub fn context(&self) -> &ListContext {
        &self.cx
    }

    /// Current snapshot.
    pub fn state(&self) -> Arc<ListState> {
        self.cx.state()
    }

    /// Subscribe to snapshot changes.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&Arc<ListState>) + Send + Sync + 'static,
    {
        self.cx.store().subscribe(listener)
    }

    /// All feature APIs.
    pub fn features(&self) -> &FeatureApis {
        self.cx.features()
    }

    /// One feature's API.
    pub fn feature<A: FeatureApi>(&self, id: impl Into<FeatureId>) -> Result<Arc<A>, ListError> {
        self.cx.feature(id)
    }

    /// Static metadata.
    pub fn meta(&self) -> &ListMeta {
        self.cx.meta()
    }

    /// The compiled plan.
    pub fn plan(&self) -> &CompiledFeaturePlan {
        &self.plan
    }

    async fn run_hooks(
        &self,
        stage: &'static str,
        hooks: &[(FeatureId, LifecycleFn)],
    ) -> Result<(), ListError> {
        for (id, hook) in hooks {
            log::debug!("running {stage} hook of '{id}'");
            if let Err(source) = hook(self.cx.clone()).await {
                log::error!("feature '{id}' {stage} hook failed: {source}");
                return Err(ListError::Hook {
                    id: id.clone(),
                    stage,
                    source,
                });
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for ListRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListRuntime")
            .field("plan", &self.plan)
            .field("ingestion", &self.ingestion)
            .field("destroyed", &self.is_destroyed())
            .finish()
    }
}

/// Builder for [`ListRuntime`].
pub struct ListRuntimeBuilder {
    registry: FeatureRegistry,
    meta: ListMeta,
    bindings: RuntimeBindings,
    source: Option<Arc<dyn DataSource>>,
}

impl ListRuntimeBuilder {
    fn new(registry: FeatureRegistry) -> Self {
        Self {
            registry,
            meta: ListMeta::new(""),
            bindings: RuntimeBindings::new(),
            source: None,
        }
    }

    /// Set the row id key.
    pub fn id_key(mut self, key: impl Into<String>) -> Self {
        self.meta.id_key = key.into();
        self
    }

    /// Add a schema field.
    pub fn field(mut self, field: FieldSpec) -> Self {
        self.meta.fields.push(field);
        self
    }

    /// Replace the whole metadata.
    pub fn meta(mut self, meta: ListMeta) -> Self {
        self.meta = meta;
        self
    }

    /// Use a host-owned store.
    pub fn store(mut self, store: Store<ListState>) -> Self {
        self.bindings.store = store;
        self
    }

    /// Use a host-owned refresh trigger.
    pub fn refresh_trigger(mut self, refresh: RefreshSender) -> Self {
        self.bindings.refresh = refresh;
        self
    }

    /// Attach a data source.
    pub fn source(mut self, source: Arc<dyn DataSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Compile and build the runtime.
    pub fn build(self) -> Result<ListRuntime, ListError> {
        let runtime = ListRuntime::new(self.registry, self.bindings, self.meta)?;
        Ok(match self.source {
            Some(source) => runtime.with_source(source),
            None => runtime,
        })
    }
}
