//! Habitat plan lifecycle: `absent -> editing(new) -> saved` and
//! `saved -> editing(existing) -> saved | absent`. One plan is editable at a
//! time; every mutation triggers one full synchronous recomputation.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::Catalog;
use crate::envelope::{aggregate, HabitatEnvelope};
use crate::notes::{generate, Note};
use crate::selection::{FoodGrade, Selection, SelectionEntry};
use crate::store::{generate_id, HabitatStore, SavedHabitat, StoreError};

/// Envelope plus notes: what one recomputation returns, and what gets frozen
/// into the store on save.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanOutputs {
    pub envelope: HabitatEnvelope,
    pub notes: Vec<Note>,
}

impl PlanOutputs {
    pub fn compute(catalog: &Catalog, selection: &Selection) -> Self {
        let envelope = aggregate(catalog, selection);
        let notes = generate(catalog, selection, &envelope);
        Self { envelope, notes }
    }
}

#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("finish or cancel the current habitat first")]
    AlreadyEditing,
    #[error("no habitat is being edited")]
    NotEditing,
    #[error("habitat '{0}' not found")]
    UnknownHabitat(String),
    #[error("species '{0}' not found in the catalog")]
    UnknownSpecies(String),
    #[error("species '{0}' has already been added")]
    DuplicateSpecies(String),
    #[error("no delete is pending confirmation")]
    NoPendingDelete,
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CancelOutcome {
    /// A never-saved habitat was discarded entirely.
    Discarded,
    /// An existing habitat reverted to its pre-edit snapshot.
    Restored(String),
}

struct EditSession {
    id: String,
    name: String,
    selection: Selection,
    /// Deep copy of the saved state for cancellation; `None` while editing a
    /// brand new habitat.
    snapshot: Option<SavedHabitat>,
}

/// One planner session: the catalog, the persistent store, and at most one
/// habitat under edit.
pub struct Planner {
    catalog: Arc<Catalog>,
    store: HabitatStore,
    editing: Option<EditSession>,
    pending_delete: Option<String>,
}

impl Planner {
    pub fn new(catalog: Arc<Catalog>, store: HabitatStore) -> Self {
        Self {
            catalog,
            store,
            editing: None,
            pending_delete: None,
        }
    }

    pub fn store(&self) -> &HabitatStore {
        &self.store
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    pub fn editing_id(&self) -> Option<&str> {
        self.editing.as_ref().map(|session| session.id.as_str())
    }

    pub fn editing_name(&self) -> Option<&str> {
        self.editing.as_ref().map(|session| session.name.as_str())
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.editing.as_ref().map(|session| &session.selection)
    }

    /// Opens a fresh habitat for editing.
    pub fn start_new(&mut self) -> Result<(), PlannerError> {
        if self.editing.is_some() {
            return Err(PlannerError::AlreadyEditing);
        }
        self.editing = Some(EditSession {
            id: generate_id(),
            name: String::new(),
            selection: Selection::new(),
            snapshot: None,
        });
        Ok(())
    }

    /// Reopens a saved habitat for editing, keeping a deep snapshot for
    /// cancellation. Entries naming species missing from the catalog are
    /// dropped from the working selection.
    pub fn edit(&mut self, id: &str) -> Result<(), PlannerError> {
        if self.editing.is_some() {
            return Err(PlannerError::AlreadyEditing);
        }
        let saved = self
            .store
            .get(id)
            .cloned()
            .ok_or_else(|| PlannerError::UnknownHabitat(id.to_string()))?;
        let entries: Vec<SelectionEntry> = saved
            .animals
            .iter()
            .filter(|entry| self.catalog.contains(&entry.species))
            .cloned()
            .collect();
        self.editing = Some(EditSession {
            id: saved.id.clone(),
            name: saved.name.clone(),
            selection: Selection::from_entries(entries),
            snapshot: Some(saved),
        });
        Ok(())
    }

    pub fn rename(&mut self, name: impl Into<String>) -> Result<(), PlannerError> {
        let session = self.editing.as_mut().ok_or(PlannerError::NotEditing)?;
        session.name = name.into();
        Ok(())
    }

    pub fn add_species(&mut self, species: &str) -> Result<PlanOutputs, PlannerError> {
        if !self.catalog.contains(species) {
            return Err(PlannerError::UnknownSpecies(species.to_string()));
        }
        let session = self.editing.as_mut().ok_or(PlannerError::NotEditing)?;
        if !session.selection.add(species) {
            return Err(PlannerError::DuplicateSpecies(species.to_string()));
        }
        Ok(self.recompute())
    }

    pub fn remove_species(&mut self, species: &str) -> Result<PlanOutputs, PlannerError> {
        let session = self.editing.as_mut().ok_or(PlannerError::NotEditing)?;
        session.selection.remove(species);
        Ok(self.recompute())
    }

    pub fn set_counts(
        &mut self,
        species: &str,
        males: u32,
        females: u32,
        juveniles: u32,
    ) -> Result<PlanOutputs, PlannerError> {
        let session = self.editing.as_mut().ok_or(PlannerError::NotEditing)?;
        let entry = session
            .selection
            .entry_mut(species)
            .ok_or_else(|| PlannerError::UnknownSpecies(species.to_string()))?;
        entry.males = males;
        entry.females = females;
        entry.juveniles = juveniles;
        Ok(self.recompute())
    }

    pub fn set_food_grade(
        &mut self,
        species: &str,
        grade: FoodGrade,
    ) -> Result<PlanOutputs, PlannerError> {
        let session = self.editing.as_mut().ok_or(PlannerError::NotEditing)?;
        let entry = session
            .selection
            .entry_mut(species)
            .ok_or_else(|| PlannerError::UnknownSpecies(species.to_string()))?;
        entry.food_grade = grade;
        Ok(self.recompute())
    }

    /// Recomputes the outputs for the habitat under edit without mutating it.
    pub fn outputs(&self) -> Result<PlanOutputs, PlannerError> {
        let session = self.editing.as_ref().ok_or(PlannerError::NotEditing)?;
        Ok(PlanOutputs::compute(&self.catalog, &session.selection))
    }

    /// Persists the habitat under edit with its outputs frozen as rendered,
    /// and leaves editing mode.
    pub fn save(&mut self) -> Result<SavedHabitat, PlannerError> {
        let session = self.editing.take().ok_or(PlannerError::NotEditing)?;
        let outputs = PlanOutputs::compute(&self.catalog, &session.selection);
        let name = if session.name.trim().is_empty() {
            "Habitat".to_string()
        } else {
            session.name.trim().to_string()
        };
        let saved = SavedHabitat {
            id: session.id,
            name,
            animals: session.selection.entries().to_vec(),
            outputs,
            saved_at: chrono::Utc::now(),
        };
        self.store.upsert(saved.clone())?;
        Ok(saved)
    }

    /// Abandons the current edit. A new habitat disappears; an existing one
    /// stays as it was saved (the store was never touched while editing).
    pub fn cancel(&mut self) -> Result<CancelOutcome, PlannerError> {
        let session = self.editing.take().ok_or(PlannerError::NotEditing)?;
        match session.snapshot {
            Some(snapshot) => Ok(CancelOutcome::Restored(snapshot.id)),
            None => Ok(CancelOutcome::Discarded),
        }
    }

    /// First step of deletion; nothing is removed until confirmed.
    pub fn request_delete(&mut self, id: &str) -> Result<&SavedHabitat, PlannerError> {
        if self.store.get(id).is_none() {
            return Err(PlannerError::UnknownHabitat(id.to_string()));
        }
        self.pending_delete = Some(id.to_string());
        Ok(self.store.get(id).expect("checked above"))
    }

    pub fn confirm_delete(&mut self) -> Result<(), PlannerError> {
        let id = self
            .pending_delete
            .take()
            .ok_or(PlannerError::NoPendingDelete)?;
        self.store.remove(&id)?;
        if self.editing_id() == Some(id.as_str()) {
            self.editing = None;
        }
        Ok(())
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    fn recompute(&self) -> PlanOutputs {
        match &self.editing {
            Some(session) => PlanOutputs::compute(&self.catalog, &session.selection),
            None => PlanOutputs::default(),
        }
    }
}
