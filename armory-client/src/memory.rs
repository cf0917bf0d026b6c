use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use armory_core::{EntityId, Resource};
use serde_json::{json, Map, Value};

use crate::backend::{Backend, PhotoFile};
use crate::error::ClientError;

/// Reference fields the server expands into nested `{ id, name }` objects.
const RELATIONS: &[(&str, &str, Resource)] = &[
    ("type_id", "type", Resource::Types),
    ("rarity_id", "rarity", Resource::Rarities),
    ("category_id", "category", Resource::Categories),
    ("collection_id", "collection", Resource::Collections),
    ("weapon_id", "weapon", Resource::Weapons),
];

#[derive(Debug, Default)]
struct MemoryState {
    collections: HashMap<Resource, Vec<Value>>,
    next_ids: HashMap<Resource, EntityId>,
    uploads: Vec<String>,
    fail_uploads: bool,
}

impl MemoryState {
    fn allocate_id(&mut self, resource: Resource) -> EntityId {
        let next = self.next_ids.entry(resource).or_insert(1);
        let id = *next;
        *next += 1;
        id
    }

    fn name_taken(&self, resource: Resource, name: &str, except: Option<EntityId>) -> bool {
        self.collections
            .get(&resource)
            .into_iter()
            .flatten()
            .filter(|e| except.is_none() || entity_id(e) != except)
            .any(|e| e.get("name").and_then(Value::as_str) == Some(name))
    }

    /// Adds nested reference objects for every `*_id` field.
    fn expand(&self, object: &mut Map<String, Value>) {
        for (id_field, nested_field, target) in RELATIONS {
            let Some(id) = object.get(*id_field).and_then(Value::as_u64) else {
                continue;
            };
            let nested = self
                .collections
                .get(target)
                .and_then(|entities| entities.iter().find(|e| entity_id(e) == Some(id)))
                .map(|e| json!({ "id": id, "name": e.get("name").cloned().unwrap_or(Value::Null) }))
                .unwrap_or(Value::Null);
            object.insert(nested_field.to_string(), nested);
        }
    }
}

/// In-process backend with the same contract as the REST server.
///
/// Ids are assigned per resource starting at 1, names are unique per
/// resource, and reference ids are expanded into nested objects the way
/// the server returns them. Useful for tests and offline demos.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    state: Mutex<MemoryState>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Stores an entity directly, assigning an id if it has none.
    pub fn insert(&self, resource: Resource, entity: Value) -> EntityId {
        let mut state = self.state();
        let mut object = match entity {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        let id = match object.get("id").and_then(Value::as_u64) {
            Some(id) => {
                let next = state.next_ids.entry(resource).or_insert(1);
                *next = (*next).max(id + 1);
                id
            }
            None => state.allocate_id(resource),
        };
        object.insert("id".to_string(), json!(id));
        state.expand(&mut object);
        state
            .collections
            .entry(resource)
            .or_default()
            .push(Value::Object(object));
        id
    }

    /// Makes every following upload fail with a server error.
    pub fn set_fail_uploads(&self, fail: bool) {
        self.state().fail_uploads = fail;
    }

    /// Paths of all successful uploads, oldest first.
    pub fn uploads(&self) -> Vec<String> {
        self.state().uploads.clone()
    }

    fn object_payload(payload: &Value) -> Result<Map<String, Value>, ClientError> {
        match payload {
            Value::Object(map) => Ok(map.clone()),
            _ => Err(ClientError::Api {
                status: 422,
                detail: Some("Request body must be a JSON object".to_string()),
            }),
        }
    }

    fn check_name(
        state: &MemoryState,
        resource: Resource,
        object: &Map<String, Value>,
        except: Option<EntityId>,
    ) -> Result<(), ClientError> {
        let Some(name) = object.get("name").and_then(Value::as_str) else {
            return Ok(());
        };
        if state.name_taken(resource, name, except) {
            return Err(ClientError::Api {
                status: 400,
                detail: Some(format!(
                    "{} with name '{}' already exists",
                    resource.singular(),
                    name
                )),
            });
        }
        Ok(())
    }
}

fn entity_id(entity: &Value) -> Option<EntityId> {
    entity.get("id").and_then(Value::as_u64)
}

fn not_found(resource: Resource) -> ClientError {
    ClientError::Api {
        status: 404,
        detail: Some(format!("{} not found", resource.singular())),
    }
}

impl Backend for MemoryBackend {
    async fn list(&self, resource: Resource) -> Result<Vec<Value>, ClientError> {
        Ok(self
            .state()
            .collections
            .get(&resource)
            .cloned()
            .unwrap_or_default())
    }

    async fn create(&self, resource: Resource, payload: &Value) -> Result<Value, ClientError> {
        let mut object = Self::object_payload(payload)?;
        let mut state = self.state();
        Self::check_name(&state, resource, &object, None)?;

        let id = state.allocate_id(resource);
        object.insert("id".to_string(), json!(id));
        state.expand(&mut object);

        let created = Value::Object(object);
        state
            .collections
            .entry(resource)
            .or_default()
            .push(created.clone());
        Ok(created)
    }

    async fn update(
        &self,
        resource: Resource,
        id: EntityId,
        payload: &Value,
    ) -> Result<Value, ClientError> {
        let mut object = Self::object_payload(payload)?;
        let mut state = self.state();
        Self::check_name(&state, resource, &object, Some(id))?;

        object.insert("id".to_string(), json!(id));
        state.expand(&mut object);

        let slot = state
            .collections
            .get_mut(&resource)
            .and_then(|entities| entities.iter_mut().find(|e| entity_id(e) == Some(id)))
            .ok_or_else(|| not_found(resource))?;
        *slot = Value::Object(object);
        Ok(slot.clone())
    }

    async fn delete(&self, resource: Resource, id: EntityId) -> Result<(), ClientError> {
        let mut state = self.state();
        let entities = state.collections.entry(resource).or_default();
        let before = entities.len();
        entities.retain(|e| entity_id(e) != Some(id));
        if entities.len() == before {
            return Err(not_found(resource));
        }
        Ok(())
    }

    async fn upload(&self, photo: PhotoFile) -> Result<String, ClientError> {
        let mut state = self.state();
        if state.fail_uploads {
            return Err(ClientError::Api {
                status: 500,
                detail: Some("Upload storage unavailable".to_string()),
            });
        }
        let path = format!("uploads/{}", photo.file_name);
        state.uploads.push(path.clone());
        Ok(path)
    }

    fn photo_url(&self, path: &str) -> String {
        format!("memory://{}", path.trim_start_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block_on<F: std::future::Future>(future: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap()
            .block_on(future)
    }

    #[test]
    fn create_assigns_sequential_ids() {
        let backend = MemoryBackend::new();
        let a = block_on(backend.create(Resource::Types, &json!({ "name": "Rifle" }))).unwrap();
        let b = block_on(backend.create(Resource::Types, &json!({ "name": "Pistol" }))).unwrap();
        let c = block_on(backend.create(Resource::Rarities, &json!({ "name": "Covert" }))).unwrap();
        assert_eq!(a["id"], json!(1));
        assert_eq!(b["id"], json!(2));
        assert_eq!(c["id"], json!(1));
    }

    #[test]
    fn insert_respects_explicit_ids() {
        let backend = MemoryBackend::new();
        assert_eq!(backend.insert(Resource::Types, json!({ "id": 10, "name": "Rifle" })), 10);
        let next = block_on(backend.create(Resource::Types, &json!({ "name": "SMG" }))).unwrap();
        assert_eq!(next["id"], json!(11));
    }

    #[test]
    fn duplicate_names_are_refused() {
        let backend = MemoryBackend::new();
        backend.insert(Resource::Categories, json!({ "name": "Rifles" }));
        let err = block_on(backend.create(Resource::Categories, &json!({ "name": "Rifles" })))
            .unwrap_err();
        assert_eq!(err.status(), Some(400));
        assert_eq!(err.detail(), Some("Category with name 'Rifles' already exists"));

        // Renaming an entity to its own name is fine.
        let ok = block_on(backend.update(Resource::Categories, 1, &json!({ "name": "Rifles" })));
        assert!(ok.is_ok());
    }

    #[test]
    fn references_are_expanded() {
        let backend = MemoryBackend::new();
        backend.insert(Resource::Weapons, json!({ "name": "AWP" }));
        let item = block_on(backend.create(
            Resource::Items,
            &json!({ "name": "Asiimov", "weapon_id": 1, "type_id": 9 }),
        ))
        .unwrap();
        assert_eq!(item["weapon"], json!({ "id": 1, "name": "AWP" }));
        assert_eq!(item["type"], Value::Null);
    }

    #[test]
    fn missing_ids_are_not_found() {
        let backend = MemoryBackend::new();
        let err = block_on(backend.delete(Resource::Items, 3)).unwrap_err();
        assert_eq!(err.status(), Some(404));
        let err = block_on(backend.update(Resource::Items, 3, &json!({ "name": "x" }))).unwrap_err();
        assert_eq!(err.detail(), Some("Item not found"));
    }

    #[test]
    fn uploads_can_fail() {
        let backend = MemoryBackend::new();
        let path = block_on(backend.upload(PhotoFile::new("awp.png", vec![1, 2, 3]))).unwrap();
        assert_eq!(path, "uploads/awp.png");

        backend.set_fail_uploads(true);
        assert!(block_on(backend.upload(PhotoFile::new("m4.png", vec![]))).is_err());
        assert_eq!(backend.uploads(), vec!["uploads/awp.png".to_string()]);
    }
}
