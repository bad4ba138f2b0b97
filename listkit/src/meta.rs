//! Static list metadata: the row id key and the field schema.

use serde::{Deserialize, Serialize};

use crate::error::ListError;

/// Kind of values a field holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    #[default]
    Text,
    Number,
    Boolean,
    Date,
    Other,
}

/// Schema entry for one row field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Field key in the row.
    pub key: String,
    /// Human-readable label.
    pub label: String,
    /// Value kind.
    pub kind: FieldKind,
    /// Whether the sorting feature may sort by this field.
    pub sortable: bool,
    /// Whether the filters feature may filter (and search) on this field.
    pub filterable: bool,
}

impl FieldSpec {
    /// Create a sortable, filterable text field labelled with its key.
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            label: key.clone(),
            key,
            kind: FieldKind::Text,
            sortable: true,
            filterable: true,
        }
    }

    /// Set the label.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Set the value kind.
    pub fn kind(mut self, kind: FieldKind) -> Self {
        self.kind = kind;
        self
    }

    /// Mark the field as not sortable.
    pub fn unsortable(mut self) -> Self {
        self.sortable = false;
        self
    }

    /// Mark the field as not filterable.
    pub fn unfilterable(mut self) -> Self {
        self.filterable = false;
        self
    }
}

/// Static metadata shared with every feature and the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListMeta {
    /// Field holding each row's identity.
    pub id_key: String,
    /// Field schema. Empty means "unknown": every field is allowed.
    pub fields: Vec<FieldSpec>,
}

impl ListMeta {
    /// Create metadata with the given id key and no schema.
    pub fn new(id_key: impl Into<String>) -> Self {
        Self {
            id_key: id_key.into(),
            fields: Vec::new(),
        }
    }

    /// Add a field to the schema.
    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    /// Replace the schema.
    pub fn fields(mut self, fields: impl IntoIterator<Item = FieldSpec>) -> Self {
        self.fields = fields.into_iter().collect();
        self
    }

    /// Look up a field by key.
    pub fn field_spec(&self, key: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.key == key)
    }

    /// Whether sorting by `key` is allowed.
    pub fn is_sortable(&self, key: &str) -> bool {
        self.fields.is_empty() || self.field_spec(key).is_some_and(|f| f.sortable)
    }

    /// Whether filtering on `key` is allowed.
    pub fn is_filterable(&self, key: &str) -> bool {
        self.fields.is_empty() || self.field_spec(key).is_some_and(|f| f.filterable)
    }

    /// Check that the metadata is usable.
    pub fn validate(&self) -> Result<(), ListError> {
        if self.id_key.trim().is_empty() {
            return Err(ListError::MissingIdKey);
        }
        Ok(())
    }
}
