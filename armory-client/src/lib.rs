//! Client side of the armory admin panel.
//!
//! A [`Backend`] speaks to the catalog server ([`HttpBackend`]) or stands in
//! for it ([`MemoryBackend`]). A [`ResourceManager`] wraps a backend for one
//! entity type and keeps the shared [`CollectionCache`] in step with the
//! server by refetching after every successful mutation.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use armory_client::{shared_cache, HttpBackend, ResourceManager};
//! use armory_core::{Category, NameDraft};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), armory_client::ResourceError> {
//!     let backend = Arc::new(HttpBackend::new("http://localhost:8000"));
//!     let categories: ResourceManager<Category, _> =
//!         ResourceManager::new(backend, shared_cache());
//!
//!     let created = categories
//!         .create(&NameDraft { name: "Rifles".to_string() })
//!         .await?;
//!     println!("created #{}", created.id);
//!
//!     for category in categories.list().await?.iter() {
//!         println!("{}: {}", category.id, category.name);
//!     }
//!     Ok(())
//! }
//! ```

mod backend;
mod cache;
mod convert;
mod error;
mod http;
mod manager;
mod memory;

pub use backend::{Backend, PhotoFile};
pub use cache::{shared_cache, CollectionCache, SharedCache};
pub use convert::{extract_detail, merge_payload};
pub use error::{ClientError, Operation, ResourceError};
pub use http::{HttpBackend, DEFAULT_API_PREFIX, DEFAULT_BASE_URL};
pub use manager::ResourceManager;
pub use memory::MemoryBackend;
