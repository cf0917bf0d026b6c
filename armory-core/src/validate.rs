use crate::draft::{Draft, DraftError};
use crate::entity::{EntityId, UNSET_ID};
use crate::resource::Resource;

/// Lookup of previously fetched identifiers.
pub trait KnownIds {
    /// `None` when the collection of `resource` has not been fetched.
    fn contains(&self, resource: Resource, id: EntityId) -> Option<bool>;
}

/// Skips the membership check.
pub struct NoLookup;

impl KnownIds for NoLookup {
    fn contains(&self, _resource: Resource, _id: EntityId) -> Option<bool> {
        None
    }
}

/// Checks a draft before it is submitted.
///
/// Every reference must be set, the name must not be blank, and references
/// into collections that are already known must point at existing entities.
pub fn validate<D: Draft>(
    resource: Resource,
    draft: &D,
    known: &dyn KnownIds,
) -> Result<(), DraftError> {
    let references = draft.references();

    let missing: Vec<&'static str> = references
        .iter()
        .filter(|r| r.id == UNSET_ID)
        .map(|r| r.label)
        .collect();
    if !missing.is_empty() {
        return Err(DraftError::MissingReferences(missing));
    }

    if draft.name().trim().is_empty() {
        return Err(DraftError::BlankName(resource.singular()));
    }

    for reference in &references {
        if known.contains(reference.resource, reference.id) == Some(false) {
            return Err(DraftError::UnknownReference {
                label: reference.label,
                id: reference.id,
            });
        }
    }

    Ok(())
}
