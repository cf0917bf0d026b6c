use std::fmt::Debug;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::draft::Draft;
use crate::resource::Resource;

/// Server-assigned identifier.
pub type EntityId = u64;

/// Sentinel for a reference that has not been chosen yet.
pub const UNSET_ID: EntityId = 0;

/// A nested reference as the server embeds it, e.g. `"type": {"id": 3, "name": "Rifle"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRef {
    pub id: EntityId,
    pub name: String,
}

/// A record of one managed resource.
pub trait Entity: Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static {
    const RESOURCE: Resource;

    type Draft: Draft;

    fn id(&self) -> EntityId;

    /// Display field, used for search and listing.
    fn name(&self) -> &str;

    /// Seeds a draft from this entity, flattening nested references to ids.
    fn to_draft(&self) -> Self::Draft;

    /// Labelled detail lines shown next to the selected entity.
    fn details(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }

    /// Stored photo path, for resources that have one.
    fn photo(&self) -> Option<&str> {
        None
    }

    fn to_ref(&self) -> EntityRef {
        EntityRef {
            id: self.id(),
            name: self.name().to_string(),
        }
    }
}

/// Flattens an optional nested reference to its id.
pub(crate) fn ref_id(reference: &Option<EntityRef>) -> EntityId {
    reference.as_ref().map(|r| r.id).unwrap_or(UNSET_ID)
}
