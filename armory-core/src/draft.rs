use std::fmt::Debug;

use serde::Serialize;
use thiserror::Error;

use crate::entity::EntityId;
use crate::resource::Resource;

/// How a form field is edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
    /// Identifier of an entity of another resource, chosen from its collection.
    Reference(Resource),
    /// Local file to upload; the stored value is the server path.
    Photo,
}

/// One entry of a draft's form layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
}

impl Field {
    pub const fn text(key: &'static str, label: &'static str) -> Self {
        Self { key, label, kind: FieldKind::Text }
    }

    pub const fn integer(key: &'static str, label: &'static str) -> Self {
        Self { key, label, kind: FieldKind::Integer }
    }

    pub const fn reference(key: &'static str, label: &'static str, resource: Resource) -> Self {
        Self { key, label, kind: FieldKind::Reference(resource) }
    }

    pub const fn photo(key: &'static str, label: &'static str) -> Self {
        Self { key, label, kind: FieldKind::Photo }
    }
}

/// A foreign-reference value held by a draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reference {
    pub field: &'static str,
    pub label: &'static str,
    pub resource: Resource,
    pub id: EntityId,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftError {
    #[error("Please select all required fields.")]
    MissingReferences(Vec<&'static str>),

    #[error("{0} name is required.")]
    BlankName(&'static str),

    #[error("Selected {label} #{id} no longer exists.")]
    UnknownReference { label: &'static str, id: EntityId },

    #[error("{label}: '{value}' is not a whole number")]
    InvalidNumber { label: &'static str, value: String },

    #[error("Unknown field: {0}")]
    UnknownField(String),
}

/// The in-progress, unsaved form state of an entity.
///
/// Serializes to the creation payload. Server-assigned fields are absent.
pub trait Draft: Clone + Default + Debug + Serialize + Send + Sync + 'static {
    /// Form layout, in display order.
    const FIELDS: &'static [Field];

    fn name(&self) -> &str;

    /// Reference fields and their current values.
    fn references(&self) -> Vec<Reference> {
        Vec::new()
    }

    /// Current value of a field rendered as text.
    fn field(&self, key: &str) -> Option<String>;

    /// Parses `value` into the field named `key`.
    fn set_field(&mut self, key: &str, value: &str) -> Result<(), DraftError>;

    /// Stored photo path, for drafts that carry one.
    fn photo_mut(&mut self) -> Option<&mut Option<String>> {
        None
    }

    /// Resources this draft's form needs to pick references from.
    fn dependencies() -> Vec<Resource> {
        let mut deps = Vec::new();
        for field in Self::FIELDS {
            if let FieldKind::Reference(resource) = field.kind {
                if !deps.contains(&resource) {
                    deps.push(resource);
                }
            }
        }
        deps
    }
}

pub(crate) fn field_label<D: Draft>(key: &str) -> &'static str {
    D::FIELDS
        .iter()
        .find(|f| f.key == key)
        .map(|f| f.label)
        .unwrap_or("Value")
}

/// Number inputs treat empty text as zero.
pub(crate) fn parse_integer(label: &'static str, value: &str) -> Result<i64, DraftError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }
    trimmed.parse().map_err(|_| DraftError::InvalidNumber {
        label,
        value: value.to_string(),
    })
}

pub(crate) fn parse_id(label: &'static str, value: &str) -> Result<EntityId, DraftError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }
    trimmed.parse().map_err(|_| DraftError::InvalidNumber {
        label,
        value: value.to_string(),
    })
}
