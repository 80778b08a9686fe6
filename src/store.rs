use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::planner::PlanOutputs;
use crate::selection::SelectionEntry;

/// A saved habitat plan: the selection plus the outputs frozen at save time.
/// Saved plans are never recomputed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedHabitat {
    pub id: String,
    pub name: String,
    pub animals: Vec<SelectionEntry>,
    pub outputs: PlanOutputs,
    pub saved_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access habitat store {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode habitat store")]
    Encode(#[from] serde_json::Error),
}

/// On-disk collection of saved habitats, most recent first. One JSON blob,
/// rewritten whole on every change; the planner session is its only writer.
pub struct HabitatStore {
    path: PathBuf,
    habitats: Vec<SavedHabitat>,
}

impl HabitatStore {
    /// Opens the store at `path`. A missing file starts empty; an
    /// unreadable one is treated the same rather than blocking the session.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let habitats = match fs::read_to_string(&path) {
            Ok(data) => match serde_json::from_str(&data) {
                Ok(habitats) => habitats,
                Err(err) => {
                    eprintln!(
                        "[store] Ignoring unreadable habitat store {}: {err}",
                        path.display()
                    );
                    Vec::new()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => Vec::new(),
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        Ok(Self { path, habitats })
    }

    pub fn habitats(&self) -> &[SavedHabitat] {
        &self.habitats
    }

    pub fn get(&self, id: &str) -> Option<&SavedHabitat> {
        self.habitats.iter().find(|habitat| habitat.id == id)
    }

    pub fn len(&self) -> usize {
        self.habitats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.habitats.is_empty()
    }

    /// Saves a habitat: an existing id is replaced in place, a new one goes
    /// to the front so the listing stays most-recent-first.
    pub fn upsert(&mut self, habitat: SavedHabitat) -> Result<(), StoreError> {
        match self.habitats.iter_mut().find(|h| h.id == habitat.id) {
            Some(existing) => *existing = habitat,
            None => self.habitats.insert(0, habitat),
        }
        self.persist()
    }

    pub fn remove(&mut self, id: &str) -> Result<bool, StoreError> {
        let before = self.habitats.len();
        self.habitats.retain(|habitat| habitat.id != id);
        if self.habitats.len() == before {
            return Ok(false);
        }
        self.persist()?;
        Ok(true)
    }

    fn persist(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                    path: self.path.clone(),
                    source,
                })?;
            }
        }
        let json = serde_json::to_string_pretty(&self.habitats)?;
        fs::write(&self.path, json).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

/// Opaque identifier for a saved habitat.
pub fn generate_id() -> String {
    format!("{:016x}", rand::random::<u64>())
}
