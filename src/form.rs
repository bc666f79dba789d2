//! The playlist screen's form buffer.
//!
//! A form is either adding a new entry (`Idle`) or editing an existing one
//! (`Editing`). Nothing here talks to the network.

use crate::types::{EntryId, TrackEntry, TrackField, TrackFields};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EditState {
    /// No editing target; submitting creates a new entry.
    #[default]
    Idle,
    /// Submitting updates the entry with this id.
    Editing(EntryId),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormBuffer {
    fields: TrackFields,
    state: EditState,
}

impl FormBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fields(&self) -> &TrackFields {
        &self.fields
    }

    pub fn state(&self) -> &EditState {
        &self.state
    }

    pub fn editing_target(&self) -> Option<&EntryId> {
        match &self.state {
            EditState::Idle => None,
            EditState::Editing(id) => Some(id),
        }
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.state, EditState::Editing(_))
    }

    pub fn is_empty(&self) -> bool {
        TrackField::ALL
            .into_iter()
            .all(|field| self.fields.get(field).is_empty())
    }

    pub fn set(&mut self, field: TrackField, value: impl Into<String>) {
        self.fields.set(field, value);
    }

    /// Copy an entry into the form and make it the editing target.
    pub fn load_entry(&mut self, entry: &TrackEntry) {
        self.fields = entry.fields();
        self.state = EditState::Editing(entry.id.clone());
    }

    /// Empty every field and drop the editing target.
    pub fn clear(&mut self) {
        self.fields = TrackFields::default();
        self.state = EditState::Idle;
    }

    /// Label of the submit action in the current state.
    pub fn submit_label(&self) -> &'static str {
        if self.is_editing() {
            "Update"
        } else {
            "Add"
        }
    }
}
