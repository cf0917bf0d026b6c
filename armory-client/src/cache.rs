use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use armory_core::{Entity, EntityId, EntityRef, KnownIds, Resource};

struct CacheEntry {
    entities: Arc<dyn Any + Send + Sync>,
    refs: Arc<Vec<EntityRef>>,
}

/// Last fetched collection of each resource.
///
/// Entries are stored typed, plus an `(id, name)` index that callers can
/// use without knowing the entity type (pickers, reference checks).
#[derive(Default)]
pub struct CollectionCache {
    entries: HashMap<Resource, CacheEntry>,
    /// Error of the last fetch, for resources whose fetch failed since they were last stored.
    failures: HashMap<Resource, String>,
}

impl CollectionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get<E: Entity>(&self) -> Option<Arc<Vec<E>>> {
        let entry = self.entries.get(&E::RESOURCE)?;
        Arc::clone(&entry.entities).downcast::<Vec<E>>().ok()
    }

    /// Replaces the cached collection of `E`.
    pub fn store<E: Entity>(&mut self, entities: Vec<E>) -> Arc<Vec<E>> {
        let refs = Arc::new(entities.iter().map(Entity::to_ref).collect());
        let entities = Arc::new(entities);
        self.failures.remove(&E::RESOURCE);
        self.entries.insert(
            E::RESOURCE,
            CacheEntry {
                entities: Arc::clone(&entities) as Arc<dyn Any + Send + Sync>,
                refs,
            },
        );
        entities
    }

    pub fn refs(&self, resource: Resource) -> Option<Arc<Vec<EntityRef>>> {
        self.entries.get(&resource).map(|e| Arc::clone(&e.refs))
    }

    pub fn name_of(&self, resource: Resource, id: EntityId) -> Option<String> {
        self.entries
            .get(&resource)?
            .refs
            .iter()
            .find(|r| r.id == id)
            .map(|r| r.name.clone())
    }

    pub fn record_failure(&mut self, resource: Resource, message: impl Into<String>) {
        self.failures.insert(resource, message.into());
    }

    pub fn load_failure(&self, resource: Resource) -> Option<&str> {
        self.failures.get(&resource).map(String::as_str)
    }

    pub fn is_cached(&self, resource: Resource) -> bool {
        self.entries.contains_key(&resource)
    }

    /// Discards the cached collection. Returns whether there was one.
    pub fn invalidate(&mut self, resource: Resource) -> bool {
        self.entries.remove(&resource).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.failures.clear();
    }
}

impl KnownIds for CollectionCache {
    fn contains(&self, resource: Resource, id: EntityId) -> Option<bool> {
        self.entries
            .get(&resource)
            .map(|e| e.refs.iter().any(|r| r.id == id))
    }
}

impl std::fmt::Debug for CollectionCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(r, e)| (r, e.refs.len())))
            .finish()
    }
}

/// Cache shared by all resource managers of one session.
pub type SharedCache = Arc<RwLock<CollectionCache>>;

pub fn shared_cache() -> SharedCache {
    Arc::new(RwLock::new(CollectionCache::new()))
}

pub(crate) fn read(cache: &SharedCache) -> RwLockReadGuard<'_, CollectionCache> {
    cache.read().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn write(cache: &SharedCache) -> RwLockWriteGuard<'_, CollectionCache> {
    cache.write().unwrap_or_else(PoisonError::into_inner)
}
