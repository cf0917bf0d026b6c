use std::marker::PhantomData;
use std::path::Path;
use std::sync::Arc;

use armory_core::{validate, Draft, Editor, EditorMode, Entity, EntityId};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::backend::{Backend, PhotoFile};
use crate::cache::{self, SharedCache};
use crate::convert::merge_payload;
use crate::error::{ClientError, Operation, ResourceError};

/// List, create, update and delete for one resource.
///
/// Every successful mutation invalidates the resource's cached collection
/// and refetches it; no local patching of the cache ever happens.
pub struct ResourceManager<E, B> {
    backend: Arc<B>,
    cache: SharedCache,
    _entity: PhantomData<fn() -> E>,
}

impl<E, B> Clone for ResourceManager<E, B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            cache: Arc::clone(&self.cache),
            _entity: PhantomData,
        }
    }
}

impl<E: Entity, B: Backend> ResourceManager<E, B> {
    pub fn new(backend: Arc<B>, cache: SharedCache) -> Self {
        Self {
            backend,
            cache,
            _entity: PhantomData,
        }
    }

    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    pub fn cache(&self) -> &SharedCache {
        &self.cache
    }

    /// The cached collection, without fetching.
    pub fn cached(&self) -> Option<Arc<Vec<E>>> {
        cache::read(&self.cache).get::<E>()
    }

    /// The cached collection, fetched first if there is none.
    pub async fn list(&self) -> Result<Arc<Vec<E>>, ResourceError> {
        if let Some(entities) = self.cached() {
            return Ok(entities);
        }
        self.fetch().await
    }

    /// Fetches the collection and stores it in the cache.
    #[instrument(skip(self), fields(resource = %E::RESOURCE))]
    pub async fn fetch(&self) -> Result<Arc<Vec<E>>, ResourceError> {
        let fetch_error = |source| ResourceError::Fetch {
            resource: E::RESOURCE,
            source,
        };

        let fetched = self.backend.list(E::RESOURCE).await.and_then(|values| {
            serde_json::from_value::<Vec<E>>(Value::Array(values)).map_err(ClientError::Json)
        });
        let entities = match fetched {
            Ok(entities) => entities,
            Err(e) => {
                cache::write(&self.cache).record_failure(E::RESOURCE, e.to_string());
                return Err(fetch_error(e));
            }
        };
        debug!(count = entities.len(), "Fetched collection");

        Ok(cache::write(&self.cache).store(entities))
    }

    /// Discards the cached collection and fetches it again.
    pub async fn refresh(&self) -> Result<Arc<Vec<E>>, ResourceError> {
        cache::write(&self.cache).invalidate(E::RESOURCE);
        self.fetch().await
    }

    /// Applies the shared draft rule against the currently cached collections.
    pub fn validate(&self, draft: &E::Draft) -> Result<(), ResourceError> {
        let cache = cache::read(&self.cache);
        validate(E::RESOURCE, draft, &*cache)?;
        Ok(())
    }

    pub async fn create(&self, draft: &E::Draft) -> Result<E, ResourceError> {
        self.validate(draft)?;
        self.send_create(draft).await
    }

    /// Full-object replace of `current` with the draft's fields.
    pub async fn update(&self, current: &E, draft: &E::Draft) -> Result<E, ResourceError> {
        self.validate(draft)?;
        self.send_update(current, draft).await
    }

    #[instrument(skip(self), fields(resource = %E::RESOURCE))]
    pub async fn delete(&self, id: EntityId) -> Result<(), ResourceError> {
        self.backend
            .delete(E::RESOURCE, id)
            .await
            .map_err(|e| ResourceError::from_mutation(Operation::Delete, E::RESOURCE, e))?;
        info!(id, "Deleted");
        self.after_mutation().await;
        Ok(())
    }

    /// Submits an editor: validate, upload the pending photo, then create or update.
    ///
    /// A rejected draft or a failed upload aborts before the entity request is sent.
    #[instrument(skip_all, fields(resource = %E::RESOURCE, target = ?editor.target_id()))]
    pub async fn submit(&self, editor: &Editor<E>) -> Result<E, ResourceError> {
        self.validate(&editor.draft)?;

        let mut draft = editor.draft.clone();
        if let Some(path) = &editor.photo_file {
            if draft.photo_mut().is_some() {
                let stored = self.upload_photo(path).await?;
                if let Some(slot) = draft.photo_mut() {
                    *slot = Some(stored);
                }
            } else {
                warn!(path = %path.display(), "Ignoring photo for a resource without photos");
            }
        }

        match &editor.mode {
            EditorMode::Create => self.send_create(&draft).await,
            EditorMode::Update(current) => self.send_update(current, &draft).await,
        }
    }

    async fn upload_photo(&self, path: &Path) -> Result<String, ResourceError> {
        let photo = PhotoFile::read(path).map_err(ResourceError::Upload)?;
        let stored = self
            .backend
            .upload(photo)
            .await
            .map_err(ResourceError::Upload)?;
        debug!(%stored, "Uploaded photo");
        Ok(stored)
    }

    #[instrument(skip_all, fields(resource = %E::RESOURCE))]
    async fn send_create(&self, draft: &E::Draft) -> Result<E, ResourceError> {
        let op = Operation::Create;
        let payload = serde_json::to_value(draft)
            .map_err(|e| ResourceError::from_mutation(op, E::RESOURCE, e.into()))?;
        let created = self
            .backend
            .create(E::RESOURCE, &payload)
            .await
            .map_err(|e| ResourceError::from_mutation(op, E::RESOURCE, e))?;
        self.after_mutation().await;
        let created = self.parse(op, created)?;
        info!(id = created.id(), "Created");
        Ok(created)
    }

    #[instrument(skip_all, fields(resource = %E::RESOURCE, id = current.id()))]
    async fn send_update(&self, current: &E, draft: &E::Draft) -> Result<E, ResourceError> {
        let op = Operation::Update;
        let payload = serde_json::to_value(current)
            .and_then(|base| Ok(merge_payload(base, serde_json::to_value(draft)?)))
            .map_err(|e| ResourceError::from_mutation(op, E::RESOURCE, e.into()))?;
        let updated = self
            .backend
            .update(E::RESOURCE, current.id(), &payload)
            .await
            .map_err(|e| ResourceError::from_mutation(op, E::RESOURCE, e))?;
        self.after_mutation().await;
        let updated = self.parse(op, updated)?;
        info!("Updated");
        Ok(updated)
    }

    fn parse(&self, op: Operation, value: Value) -> Result<E, ResourceError> {
        serde_json::from_value(value)
            .map_err(|e| ResourceError::from_mutation(op, E::RESOURCE, e.into()))
    }

    /// Invalidate and refetch. A failed refetch leaves the entry invalidated,
    /// so the next `list()` tries again.
    async fn after_mutation(&self) {
        if let Err(e) = self.refresh().await {
            warn!(error = %e, "Refetch after mutation failed");
        }
    }
}
