//! Armory catalog model.
//!
//! Core concepts:
//! - **Resource**: one REST collection of the catalog (items, weapons, ...)
//! - **Entity**: a record of a resource, as returned by the server
//! - **Draft**: the editable, unsaved shape of an entity (references flattened to ids)
//! - **Editor**: a draft plus the mode it was opened in
//! - **Screen**: the per-resource list/edit/delete state machine
//!
//! Nothing in this crate performs I/O; `armory-client` drives these types
//! against a backend.
//!
//! # Example
//!
//! ```
//! use armory_core::{filter, Category, Editor, Entity};
//!
//! let categories = vec![
//!     Category { id: 1, name: "Rifles".to_string() },
//!     Category { id: 2, name: "Pistols".to_string() },
//! ];
//!
//! let visible = filter(&categories, "rif");
//! assert_eq!(visible.len(), 1);
//!
//! let editor = Editor::open(Some(&categories[0]));
//! assert_eq!(editor.draft.name, "Rifles");
//! ```

mod catalog;
mod draft;
mod editor;
mod entity;
mod filter;
mod resource;
mod screen;
mod validate;

pub use catalog::{
    BodyDamage, CatalogType, Category, Collection, DamageInfo, Item, ItemDraft, NameDraft,
    Rarity, Weapon, WeaponDraft,
};
pub use draft::{Draft, DraftError, Field, FieldKind, Reference};
pub use editor::{Editor, EditorMode};
pub use entity::{Entity, EntityId, EntityRef, UNSET_ID};
pub use filter::{filter, matches};
pub use resource::{DeletePolicy, Resource};
pub use screen::{Phase, Screen};
pub use validate::{KnownIds, NoLookup, validate};
