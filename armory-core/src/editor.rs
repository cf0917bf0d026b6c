use std::path::PathBuf;

use crate::draft::{Draft, DraftError, FieldKind};
use crate::entity::{Entity, EntityId};

/// What submitting the editor does.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorMode<E> {
    Create,
    /// Full-object replace of the entity the editor was opened with.
    Update(E),
}

/// A draft being edited in a dialog.
#[derive(Debug, Clone)]
pub struct Editor<E: Entity> {
    pub mode: EditorMode<E>,
    pub draft: E::Draft,
    /// Local file to upload before the draft is sent.
    pub photo_file: Option<PathBuf>,
    /// Inline error shown under the form.
    pub error: Option<String>,
}

impl<E: Entity> Editor<E> {
    /// Opens an editor seeded from `entity`, or an empty one for creation.
    pub fn open(entity: Option<&E>) -> Self {
        match entity {
            Some(e) => Self {
                mode: EditorMode::Update(e.clone()),
                draft: e.to_draft(),
                photo_file: None,
                error: None,
            },
            None => Self {
                mode: EditorMode::Create,
                draft: E::Draft::default(),
                photo_file: None,
                error: None,
            },
        }
    }

    pub fn is_update(&self) -> bool {
        matches!(self.mode, EditorMode::Update(_))
    }

    pub fn target_id(&self) -> Option<EntityId> {
        match &self.mode {
            EditorMode::Create => None,
            EditorMode::Update(e) => Some(e.id()),
        }
    }

    /// Dialog title, e.g. "Edit Weapon".
    pub fn title(&self) -> String {
        let verb = if self.is_update() { "Edit" } else { "Add" };
        format!("{} {}", verb, E::RESOURCE.singular())
    }

    pub fn action_label(&self) -> &'static str {
        if self.is_update() { "Update" } else { "Create" }
    }

    /// Writes a form value. Photo fields name a local file to upload.
    pub fn set_field(&mut self, key: &str, value: &str) -> Result<(), DraftError> {
        let kind = E::Draft::FIELDS
            .iter()
            .find(|f| f.key == key)
            .map(|f| f.kind)
            .ok_or_else(|| DraftError::UnknownField(key.to_string()))?;

        if kind == FieldKind::Photo {
            let trimmed = value.trim();
            self.photo_file = (!trimmed.is_empty()).then(|| PathBuf::from(trimmed));
            return Ok(());
        }
        self.draft.set_field(key, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Category, Item, ItemDraft};

    #[test]
    fn create_editor_is_empty() {
        let editor = Editor::<Item>::open(None);
        assert_eq!(editor.draft, ItemDraft::default());
        assert_eq!(editor.title(), "Add Item");
        assert_eq!(editor.action_label(), "Create");
        assert_eq!(editor.target_id(), None);
    }

    #[test]
    fn update_editor_is_seeded() {
        let category = Category { id: 3, name: "Rifles".to_string() };
        let editor = Editor::open(Some(&category));
        assert_eq!(editor.draft.name, "Rifles");
        assert_eq!(editor.title(), "Edit Category");
        assert_eq!(editor.action_label(), "Update");
        assert_eq!(editor.target_id(), Some(3));
    }

    #[test]
    fn photo_field_names_a_local_file() {
        let mut editor = Editor::<Item>::open(None);
        editor.set_field("photo", " /tmp/awp.png ").unwrap();
        assert_eq!(editor.photo_file, Some(PathBuf::from("/tmp/awp.png")));
        assert_eq!(editor.draft.photo, None);

        editor.set_field("photo", "").unwrap();
        assert_eq!(editor.photo_file, None);
    }

    #[test]
    fn unknown_field() {
        let mut editor = Editor::<Category>::open(None);
        assert!(matches!(
            editor.set_field("slug", "x"),
            Err(DraftError::UnknownField(_))
        ));
    }
}
