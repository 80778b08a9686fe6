use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, SpeciesRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum FoodGrade {
    #[default]
    Grade1,
    Grade2,
    Grade3,
}

impl TryFrom<u8> for FoodGrade {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(FoodGrade::Grade1),
            2 => Ok(FoodGrade::Grade2),
            3 => Ok(FoodGrade::Grade3),
            other => Err(format!("food grade must be 1, 2 or 3, got {other}")),
        }
    }
}

impl From<FoodGrade> for u8 {
    fn from(value: FoodGrade) -> Self {
        match value {
            FoodGrade::Grade1 => 1,
            FoodGrade::Grade2 => 2,
            FoodGrade::Grade3 => 3,
        }
    }
}

/// One user-chosen species with its population counts and food grade.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionEntry {
    #[serde(rename = "name")]
    pub species: String,
    #[serde(default)]
    pub males: u32,
    #[serde(default)]
    pub females: u32,
    #[serde(default)]
    pub juveniles: u32,
    #[serde(default)]
    pub food_grade: FoodGrade,
}

impl SelectionEntry {
    pub fn new(species: impl Into<String>) -> Self {
        Self {
            species: species.into(),
            males: 0,
            females: 0,
            juveniles: 0,
            food_grade: FoodGrade::default(),
        }
    }

    pub fn total_adults(&self) -> u32 {
        self.males + self.females
    }
}

/// The working set the planner session assembles. One entry per species;
/// the aggregator reads it fresh on every call and never mutates it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Selection {
    entries: Vec<SelectionEntry>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<SelectionEntry>) -> Self {
        let mut selection = Self::new();
        for entry in entries {
            if !selection.contains(&entry.species) {
                selection.entries.push(entry);
            }
        }
        selection
    }

    pub fn entries(&self) -> &[SelectionEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn contains(&self, species: &str) -> bool {
        self.entries.iter().any(|entry| entry.species == species)
    }

    /// Adds a species with zeroed counts. Returns false when it is already
    /// present; a species appears at most once in a selection.
    pub fn add(&mut self, species: impl Into<String>) -> bool {
        let species = species.into();
        if self.contains(&species) {
            return false;
        }
        self.entries.push(SelectionEntry::new(species));
        true
    }

    pub fn remove(&mut self, species: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.species != species);
        self.entries.len() != before
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entry_mut(&mut self, species: &str) -> Option<&mut SelectionEntry> {
        self.entries
            .iter_mut()
            .find(|entry| entry.species == species)
    }

    /// Pairs each entry with its catalog record. Entries referencing a
    /// species absent from the catalog are skipped, never an error.
    pub fn resolve<'a>(&'a self, catalog: &'a Catalog) -> Vec<(&'a SelectionEntry, &'a SpeciesRecord)> {
        self.entries
            .iter()
            .filter_map(|entry| catalog.get(&entry.species).map(|record| (entry, record)))
            .collect()
    }
}

/// A habitat plan as stored on disk: a display name plus the selection.
#[derive(Debug, Clone, Deserialize)]
pub struct PlanFile {
    #[serde(default)]
    pub name: Option<String>,
    pub animals: Vec<SelectionEntry>,
}

pub struct PlanLoader {
    base_dir: PathBuf,
}

impl PlanLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<PlanFile> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read plan file {}", path.display()))?;
        let plan: PlanFile = serde_yaml::from_str(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(plan)
    }
}
