//! Feature APIs and the typed registry that holds them.

use std::any::{Any, type_name};
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::ListError;

use super::FeatureId;

/// Public surface a feature exposes to the UI and to other features.
///
/// Implementors list the names of their callable handlers so the UI contract
/// validator can check them against a feature's declared requirements.
pub trait FeatureApi: Any + Send + Sync {
    /// Names of the handlers this API exposes.
    fn handlers(&self) -> Vec<&'static str>;

    /// Whether a handler exists and can currently be called.
    fn is_callable(&self, name: &str) -> bool {
        self.handlers().contains(&name)
    }

    /// Whether a handler name exists at all.
    fn has_handler(&self, name: &str) -> bool {
        self.handlers().contains(&name)
    }
}

/// One created API, kept both as trait object and as `Any` for downcasting.
#[derive(Clone)]
pub(crate) struct ApiEntry {
    api: Arc<dyn FeatureApi>,
    any: Arc<dyn Any + Send + Sync>,
}

impl ApiEntry {
    pub(crate) fn new<A: FeatureApi>(api: Arc<A>) -> Self {
        Self {
            api: Arc::clone(&api) as Arc<dyn FeatureApi>,
            any: api as Arc<dyn Any + Send + Sync>,
        }
    }
}

/// Feature id to feature API map.
///
/// Populated strictly in resolved order during compilation. Lookups of
/// features that have not been created fail with
/// [`ListError::FeatureNotCreated`] instead of returning nothing.
#[derive(Clone, Default)]
pub struct FeatureApis {
    entries: HashMap<FeatureId, ApiEntry>,
    order: Vec<FeatureId>,
}

impl FeatureApis {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, id: FeatureId, entry: ApiEntry) {
        if self.entries.insert(id.clone(), entry).is_none() {
            self.order.push(id);
        }
    }

    /// Get a feature's API with its concrete type.
    pub fn get<A: FeatureApi>(&self, id: impl Into<FeatureId>) -> Result<Arc<A>, ListError> {
        let id = id.into();
        let entry = self
            .entries
            .get(&id)
            .ok_or_else(|| ListError::FeatureNotCreated { id: id.clone() })?;
        Arc::clone(&entry.any)
            .downcast::<A>()
            .map_err(|_| ListError::FeatureApiMismatch {
                id,
                expected: type_name::<A>(),
            })
    }

    /// Get a feature's API if the feature exists; mismatched types still fail.
    pub fn try_get<A: FeatureApi>(
        &self,
        id: impl Into<FeatureId>,
    ) -> Result<Option<Arc<A>>, ListError> {
        let id = id.into();
        if !self.entries.contains_key(&id) {
            return Ok(None);
        }
        self.get(id).map(Some)
    }

    /// Get a feature's API as a trait object.
    pub fn get_dyn(&self, id: &FeatureId) -> Option<Arc<dyn FeatureApi>> {
        self.entries.get(id).map(|e| Arc::clone(&e.api))
    }

    /// Check if a feature produced an API.
    pub fn contains(&self, id: &FeatureId) -> bool {
        self.entries.contains_key(id)
    }

    /// Feature ids in creation order.
    pub fn ids(&self) -> &[FeatureId] {
        &self.order
    }

    /// Number of APIs.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no API is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for FeatureApis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeatureApis")
            .field("features", &self.order)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counter;

    impl FeatureApi for Counter {
        fn handlers(&self) -> Vec<&'static str> {
            vec!["increment"]
        }
    }

    struct Other;

    impl FeatureApi for Other {
        fn handlers(&self) -> Vec<&'static str> {
            vec![]
        }
    }

    #[test]
    fn test_get_missing_feature_fails_clearly() {
        let apis = FeatureApis::new();
        let err = apis.get::<Counter>("counter").err().unwrap();
        assert!(matches!(err, ListError::FeatureNotCreated { ref id } if id.as_str() == "counter"));
        assert!(apis.try_get::<Counter>("counter").unwrap().is_none());
    }

    #[test]
    fn test_get_wrong_type_fails() {
        let mut apis = FeatureApis::new();
        apis.insert("counter".into(), ApiEntry::new(Arc::new(Counter)));
        assert!(apis.get::<Counter>("counter").is_ok());
        assert!(matches!(
            apis.get::<Other>("counter"),
            Err(ListError::FeatureApiMismatch { .. })
        ));
    }

    #[test]
    fn test_dyn_handlers() {
        let mut apis = FeatureApis::new();
        apis.insert("counter".into(), ApiEntry::new(Arc::new(Counter)));
        let api = apis.get_dyn(&"counter".into()).unwrap();
        assert!(api.is_callable("increment"));
        assert!(!api.has_handler("decrement"));
    }
}
