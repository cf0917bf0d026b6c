use std::sync::Arc;

use armory_core::{Draft, DraftError, Editor, Entity, EntityId, EntityRef, Field, FieldKind, Resource};

/// Single-line text buffer with a byte cursor on a char boundary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineInput {
    text: String,
    cursor: usize,
}

impl LineInput {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let cursor = text.len();
        Self { text, cursor }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Cursor position in characters, for placing the terminal cursor.
    pub fn cursor_column(&self) -> usize {
        self.text[..self.cursor].chars().count()
    }

    pub fn set(&mut self, text: impl Into<String>) {
        *self = Self::new(text);
    }

    pub fn insert(&mut self, c: char) {
        self.text.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            let prev = self.prev_boundary();
            self.text.remove(prev);
            self.cursor = prev;
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.text.len() {
            self.text.remove(self.cursor);
        }
    }

    pub fn left(&mut self) {
        self.cursor = self.prev_boundary();
    }

    pub fn right(&mut self) {
        if self.cursor < self.text.len() {
            self.cursor = self.text[self.cursor..]
                .char_indices()
                .nth(1)
                .map(|(i, _)| self.cursor + i)
                .unwrap_or(self.text.len());
        }
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.text.len();
    }

    fn prev_boundary(&self) -> usize {
        self.text[..self.cursor]
            .char_indices()
            .next_back()
            .map(|(i, _)| i)
            .unwrap_or(0)
    }
}

/// Line buffers for every field of a draft, applied to the editor on submit.
#[derive(Debug, Clone)]
pub struct Form {
    fields: &'static [Field],
    inputs: Vec<LineInput>,
    focus: usize,
}

impl Form {
    pub fn for_editor<E: Entity>(editor: &Editor<E>) -> Self {
        let fields = <E::Draft as Draft>::FIELDS;
        let inputs = fields
            .iter()
            .map(|field| LineInput::new(initial_text(editor, field)))
            .collect();
        Self {
            fields,
            inputs,
            focus: 0,
        }
    }

    pub fn fields(&self) -> &'static [Field] {
        self.fields
    }

    pub fn inputs(&self) -> &[LineInput] {
        &self.inputs
    }

    pub fn focus(&self) -> usize {
        self.focus
    }

    pub fn focused_field(&self) -> Option<&'static Field> {
        self.fields.get(self.focus)
    }

    pub fn focused_input(&mut self) -> Option<&mut LineInput> {
        self.inputs.get_mut(self.focus)
    }

    pub fn focus_next(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + 1) % self.fields.len();
        }
    }

    pub fn focus_prev(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + self.fields.len() - 1) % self.fields.len();
        }
    }

    /// The resource the focused field picks from, if it is a reference.
    pub fn focused_reference(&self) -> Option<Resource> {
        match self.focused_field()?.kind {
            FieldKind::Reference(resource) => Some(resource),
            _ => None,
        }
    }

    /// Sets the reference the picker chose on the focused field.
    pub fn pick(&mut self, id: EntityId) {
        if let Some(input) = self.focused_input() {
            input.set(id.to_string());
        }
    }

    /// Writes every buffer into the editor. Stops at the first unparsable value.
    pub fn apply<E: Entity>(&self, editor: &mut Editor<E>) -> Result<(), DraftError> {
        for (field, input) in self.fields.iter().zip(&self.inputs) {
            editor.set_field(field.key, input.text())?;
        }
        Ok(())
    }
}

fn initial_text<E: Entity>(editor: &Editor<E>, field: &Field) -> String {
    match field.kind {
        FieldKind::Photo => editor
            .photo_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default(),
        FieldKind::Reference(_) => editor
            .draft
            .field(field.key)
            .filter(|id| id != "0")
            .unwrap_or_default(),
        FieldKind::Text | FieldKind::Integer => editor.draft.field(field.key).unwrap_or_default(),
    }
}

/// Popup list of the cached entities a reference field can point at.
#[derive(Debug, Clone)]
pub struct Picker {
    pub resource: Resource,
    pub options: Arc<Vec<EntityRef>>,
    pub selected: usize,
}

impl Picker {
    /// Opens on the currently chosen id, or the first option.
    pub fn new(resource: Resource, options: Arc<Vec<EntityRef>>, current: &str) -> Self {
        let selected = current
            .trim()
            .parse::<EntityId>()
            .ok()
            .and_then(|id| options.iter().position(|o| o.id == id))
            .unwrap_or(0);
        Self {
            resource,
            options,
            selected,
        }
    }

    pub fn up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn down(&mut self) {
        if self.selected + 1 < self.options.len() {
            self.selected += 1;
        }
    }

    pub fn chosen(&self) -> Option<&EntityRef> {
        self.options.get(self.selected)
    }
}
