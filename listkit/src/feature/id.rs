use std::borrow::Cow;
use std::fmt;

/// Unique identifier of a feature.
///
/// The id is the join key between state slices, UI contracts and the
/// feature-API map.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FeatureId(Cow<'static, str>);

impl FeatureId {
    /// Create an id from a static string (usable in constants).
    pub const fn from_static(id: &'static str) -> Self {
        Self(Cow::Borrowed(id))
    }

    /// Create an id from any string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(Cow::Owned(id.into()))
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for FeatureId {
    fn from(id: &'static str) -> Self {
        Self::from_static(id)
    }
}

impl From<String> for FeatureId {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}

impl From<&FeatureId> for FeatureId {
    fn from(id: &FeatureId) -> Self {
        id.clone()
    }
}
