//! Per-resource screen state machine.
//!
//! The screen never performs requests itself. Transitions that need a
//! round trip hand back what to send (`begin_submit`, `request_delete`, ...)
//! and the caller reports the outcome with the matching `finish_*`.

use std::mem;

use crate::editor::Editor;
use crate::entity::{Entity, EntityId};
use crate::filter::filter;
use crate::resource::DeletePolicy;

#[derive(Debug, Clone)]
pub enum Phase<E: Entity> {
    Idle,
    Loading,
    Ready,
    Failed(String),
    Editing(Editor<E>),
    Submitting(Editor<E>),
    ConfirmingDelete { target: E, error: Option<String> },
    Deleting { target: E },
}

impl<E: Entity> Phase<E> {
    /// A request started from this phase is still in flight.
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            Phase::Loading | Phase::Submitting(_) | Phase::Deleting { .. }
        )
    }

    /// Short name for status lines and logs.
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Loading => "loading",
            Phase::Ready => "ready",
            Phase::Failed(_) => "failed",
            Phase::Editing(_) => "editing",
            Phase::Submitting(_) => "submitting",
            Phase::ConfirmingDelete { .. } => "confirming-delete",
            Phase::Deleting { .. } => "deleting",
        }
    }
}

/// List, search, edit and delete state of one resource.
#[derive(Debug, Clone)]
pub struct Screen<E: Entity> {
    phase: Phase<E>,
    entities: Vec<E>,
    query: String,
    selected: usize,
    policy: DeletePolicy,
    notice: Option<String>,
}

impl<E: Entity> Screen<E> {
    pub fn new(policy: DeletePolicy) -> Self {
        Self {
            phase: Phase::Idle,
            entities: Vec::new(),
            query: String::new(),
            selected: 0,
            policy,
            notice: None,
        }
    }

    pub fn phase(&self) -> &Phase<E> {
        &self.phase
    }

    pub fn policy(&self) -> DeletePolicy {
        self.policy
    }

    pub fn entities(&self) -> &[E] {
        &self.entities
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Message about the last failed operation that has no dialog to show it in.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn set_notice(&mut self, notice: impl Into<String>) {
        self.notice = Some(notice.into());
    }

    pub fn clear_notice(&mut self) {
        self.notice = None;
    }

    // ---- collection ----

    /// Starts the initial (or a manual) fetch. Only from Idle, Ready or Failed.
    pub fn begin_load(&mut self) -> bool {
        match self.phase {
            Phase::Idle | Phase::Ready | Phase::Failed(_) => {
                self.phase = Phase::Loading;
                true
            }
            _ => false,
        }
    }

    pub fn finish_load(&mut self, result: Result<Vec<E>, String>) {
        if !matches!(self.phase, Phase::Loading) {
            return;
        }
        match result {
            Ok(entities) => {
                self.replace_entities(entities);
                self.phase = Phase::Ready;
            }
            Err(message) => self.phase = Phase::Failed(message),
        }
    }

    /// Swaps in a refetched collection without leaving the current phase.
    pub fn replace_entities(&mut self, entities: Vec<E>) {
        self.entities = entities;
        self.clamp_selection();
    }

    // ---- search and selection ----

    /// Entities matching the current query.
    pub fn visible(&self) -> Vec<&E> {
        filter(&self.entities, &self.query)
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected(&self) -> Option<&E> {
        self.visible().get(self.selected).copied()
    }

    pub fn select_next(&mut self) {
        let len = self.visible().len();
        if self.selected + 1 < len {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.clamp_selection();
    }

    pub fn push_query(&mut self, c: char) {
        self.query.push(c);
        self.clamp_selection();
    }

    pub fn pop_query(&mut self) {
        self.query.pop();
        self.clamp_selection();
    }

    fn clamp_selection(&mut self) {
        let len = self.visible().len();
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
    }

    // ---- editor ----

    /// Opens the editor for `entity`, or an empty one. Only from Ready.
    pub fn open_editor(&mut self, entity: Option<&E>) -> bool {
        if !matches!(self.phase, Phase::Ready) {
            return false;
        }
        self.notice = None;
        self.phase = Phase::Editing(Editor::open(entity));
        true
    }

    pub fn editor(&self) -> Option<&Editor<E>> {
        match &self.phase {
            Phase::Editing(editor) | Phase::Submitting(editor) => Some(editor),
            _ => None,
        }
    }

    pub fn editor_mut(&mut self) -> Option<&mut Editor<E>> {
        match &mut self.phase {
            Phase::Editing(editor) => Some(editor),
            _ => None,
        }
    }

    /// Moves Editing to Submitting and returns the editor to send.
    pub fn begin_submit(&mut self) -> Option<Editor<E>> {
        match mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Editing(mut editor) => {
                editor.error = None;
                self.phase = Phase::Submitting(editor.clone());
                Some(editor)
            }
            other => {
                self.phase = other;
                None
            }
        }
    }

    /// Success closes the editor; failure reopens it with the error attached.
    pub fn finish_submit(&mut self, result: Result<(), String>) {
        match mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Submitting(mut editor) => match result {
                Ok(()) => self.phase = Phase::Ready,
                Err(message) => {
                    editor.error = Some(message);
                    self.phase = Phase::Editing(editor);
                }
            },
            other => self.phase = other,
        }
    }

    // ---- delete ----

    /// Starts deleting `target`.
    ///
    /// Returns the id to delete right away under [`DeletePolicy::Immediate`];
    /// under [`DeletePolicy::Confirm`] the screen waits for [`Screen::confirm_delete`].
    pub fn request_delete(&mut self, target: &E) -> Option<EntityId> {
        if !matches!(self.phase, Phase::Ready) {
            return None;
        }
        self.notice = None;
        match self.policy {
            DeletePolicy::Confirm => {
                self.phase = Phase::ConfirmingDelete {
                    target: target.clone(),
                    error: None,
                };
                None
            }
            DeletePolicy::Immediate => {
                self.phase = Phase::Deleting {
                    target: target.clone(),
                };
                Some(target.id())
            }
        }
    }

    pub fn confirm_delete(&mut self) -> Option<EntityId> {
        match mem::replace(&mut self.phase, Phase::Idle) {
            Phase::ConfirmingDelete { target, .. } => {
                let id = target.id();
                self.phase = Phase::Deleting { target };
                Some(id)
            }
            other => {
                self.phase = other;
                None
            }
        }
    }

    pub fn finish_delete(&mut self, result: Result<(), String>) {
        match mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Deleting { target } => match result {
                Ok(()) => self.phase = Phase::Ready,
                Err(message) => match self.policy {
                    DeletePolicy::Confirm => {
                        self.phase = Phase::ConfirmingDelete {
                            target,
                            error: Some(message),
                        }
                    }
                    DeletePolicy::Immediate => {
                        self.notice = Some(message);
                        self.phase = Phase::Ready;
                    }
                },
            },
            other => self.phase = other,
        }
    }

    /// Dismisses the open dialog. The draft is discarded.
    pub fn cancel(&mut self) -> bool {
        match self.phase {
            Phase::Editing(_) | Phase::ConfirmingDelete { .. } => {
                self.phase = Phase::Ready;
                true
            }
            _ => false,
        }
    }
}
