use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

fn default_percentage_band() -> Range {
    Range {
        min: 0.0,
        max: 100.0,
    }
}

/// An inclusive `{min, max}` pair as stored on a species record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerrainKind {
    ShortGrass,
    LongGrass,
    Soil,
    Rock,
    Sand,
    Snow,
}

impl TerrainKind {
    pub const ALL: [TerrainKind; 6] = [
        TerrainKind::ShortGrass,
        TerrainKind::LongGrass,
        TerrainKind::Soil,
        TerrainKind::Rock,
        TerrainKind::Sand,
        TerrainKind::Snow,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TerrainKind::ShortGrass => "Grass (Short)",
            TerrainKind::LongGrass => "Grass (Long)",
            TerrainKind::Soil => "Soil",
            TerrainKind::Rock => "Rock",
            TerrainKind::Sand => "Sand",
            TerrainKind::Snow => "Snow",
        }
    }
}

/// Terrain percentage bands, one per terrain kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerrainRanges {
    pub short_grass: Range,
    pub long_grass: Range,
    pub soil: Range,
    pub rock: Range,
    pub sand: Range,
    pub snow: Range,
}

impl TerrainRanges {
    pub fn get(&self, kind: TerrainKind) -> Range {
        match kind {
            TerrainKind::ShortGrass => self.short_grass,
            TerrainKind::LongGrass => self.long_grass,
            TerrainKind::Soil => self.soil,
            TerrainKind::Rock => self.rock,
            TerrainKind::Sand => self.sand,
            TerrainKind::Snow => self.snow,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AreaKind {
    Land,
    Climbing,
    Water,
    DeepWater,
}

impl AreaKind {
    pub const ALL: [AreaKind; 4] = [
        AreaKind::Land,
        AreaKind::Climbing,
        AreaKind::Water,
        AreaKind::DeepWater,
    ];

    pub fn label(self) -> &'static str {
        match self {
            AreaKind::Land => "Land",
            AreaKind::Climbing => "Climbing",
            AreaKind::Water => "Water",
            AreaKind::DeepWater => "Deep Water",
        }
    }
}

/// Area demand for one area kind: a base minimum for the first breeding
/// unit plus per-head increments.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct AreaModel {
    #[serde(default)]
    pub minimum: f64,
    #[serde(default)]
    pub per_additional_adult: f64,
    #[serde(default)]
    pub per_additional_juvenile: f64,
}

/// A named compatibility tag (continent, biome, DLC pack) with its icon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    #[serde(default)]
    pub icon: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Barrier {
    pub grade: u8,
    pub height: f64,
    #[serde(default)]
    pub climb_proof: bool,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct FoodGradeCost {
    pub adult: f64,
    pub juvenile: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FoodCosts {
    pub grade1: FoodGradeCost,
    pub grade2: FoodGradeCost,
    pub grade3: FoodGradeCost,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dominance {
    #[default]
    None,
    AlphaMale,
    AlphaFemale,
    AlphaCouple,
    LeaderMale,
    LeaderFemale,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocialModel {
    pub group_size_min: u32,
    pub group_mixed_max: u32,
    pub max_males_mixed: u32,
    pub max_females_mixed: u32,
    pub max_males_bachelor: u32,
    pub max_females_bachelor: u32,
    #[serde(default)]
    pub dominance: Dominance,
    #[serde(default)]
    pub predator: bool,
    #[serde(default)]
    pub burrower: bool,
}

/// Reproduction parameters. A missing `interbirth_months` means the species
/// mates once per lifetime; a missing `sterility_age` means females stay
/// fertile until death and the life expectancy is used in its place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreedingModel {
    #[serde(default)]
    pub gestation_months: Option<f64>,
    #[serde(default)]
    pub interbirth_months: Option<f64>,
    #[serde(default)]
    pub offspring_per_mating: Option<Range>,
    pub maturity_age: f64,
    #[serde(default)]
    pub sterility_age: Option<f64>,
    pub life_expectancy: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimalType {
    #[default]
    Habitat,
    Exhibit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConservationStatus {
    ExtinctInTheWild,
    CriticallyEndangered,
    Endangered,
    Vulnerable,
    NearThreatened,
    LeastConcern,
    Domesticated,
    DataDeficient,
}

impl ConservationStatus {
    pub fn label(self) -> &'static str {
        match self {
            ConservationStatus::ExtinctInTheWild => "Extinct in the Wild",
            ConservationStatus::CriticallyEndangered => "Critically Endangered",
            ConservationStatus::Endangered => "Endangered",
            ConservationStatus::Vulnerable => "Vulnerable",
            ConservationStatus::NearThreatened => "Near Threatened",
            ConservationStatus::LeastConcern => "Least Concern",
            ConservationStatus::Domesticated => "Domesticated",
            ConservationStatus::DataDeficient => "Data Deficient",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationWithHumans {
    Shy,
    #[default]
    Neutral,
    Confident,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Taxonomy {
    #[serde(default)]
    pub class: String,
    #[serde(default)]
    pub order: String,
    #[serde(default)]
    pub family: String,
    #[serde(default)]
    pub genus: String,
}

/// One immutable catalog entry describing a species' habitat, social and
/// breeding constraints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeciesRecord {
    pub name: String,
    #[serde(default)]
    pub latin: String,
    #[serde(default)]
    pub taxonomy: Taxonomy,
    #[serde(default, rename = "type")]
    pub animal_type: AnimalType,
    #[serde(default)]
    pub dlc: Vec<Tag>,
    pub iucn: ConservationStatus,
    #[serde(default)]
    pub relation_with_humans: RelationWithHumans,
    #[serde(default)]
    pub species_appeal: f64,
    #[serde(default)]
    pub can_wade: bool,
    #[serde(default)]
    pub can_swim: bool,
    #[serde(default)]
    pub can_dive: bool,
    pub temperature: Range,
    #[serde(default = "default_percentage_band")]
    pub humidity: Range,
    pub plant_coverage: Range,
    pub terrain: TerrainRanges,
    pub land: AreaModel,
    #[serde(default)]
    pub climbing: AreaModel,
    #[serde(default)]
    pub water: AreaModel,
    #[serde(default)]
    pub deep_water: AreaModel,
    pub continents: Vec<Tag>,
    pub biomes: Vec<Tag>,
    pub barrier: Barrier,
    pub food: FoodCosts,
    pub social: SocialModel,
    pub breeding: BreedingModel,
    #[serde(default)]
    pub guests_enter: bool,
    #[serde(default)]
    pub guests_interact: bool,
}

impl SpeciesRecord {
    pub fn area(&self, kind: AreaKind) -> &AreaModel {
        match kind {
            AreaKind::Land => &self.land,
            AreaKind::Climbing => &self.climbing,
            AreaKind::Water => &self.water,
            AreaKind::DeepWater => &self.deep_water,
        }
    }

    pub fn food_cost(&self, grade: crate::selection::FoodGrade) -> FoodGradeCost {
        match grade {
            crate::selection::FoodGrade::Grade1 => self.food.grade1,
            crate::selection::FoodGrade::Grade2 => self.food.grade2,
            crate::selection::FoodGrade::Grade3 => self.food.grade3,
        }
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse catalog file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("species '{0}' defined more than once")]
    Duplicate(String),
    #[error("invalid species '{species}': {reason}")]
    Validation { species: String, reason: String },
}

/// The read-only species table, keyed by species name.
#[derive(Debug)]
pub struct Catalog {
    records: Vec<SpeciesRecord>,
    by_name: HashMap<String, usize>,
}

impl Catalog {
    pub fn from_records(records: Vec<SpeciesRecord>) -> Result<Self, CatalogError> {
        let mut by_name = HashMap::with_capacity(records.len());
        for (index, record) in records.iter().enumerate() {
            validate_record(record)?;
            if by_name.insert(record.name.clone(), index).is_some() {
                return Err(CatalogError::Duplicate(record.name.clone()));
            }
        }
        Ok(Self { records, by_name })
    }

    pub fn get(&self, name: &str) -> Option<&SpeciesRecord> {
        self.by_name.get(name).map(|&index| &self.records[index])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SpeciesRecord> {
        self.records.iter()
    }

    /// Species placeable in a habitat (exhibit animals never enter the planner).
    pub fn habitat_species(&self) -> impl Iterator<Item = &SpeciesRecord> {
        self.records
            .iter()
            .filter(|record| record.animal_type == AnimalType::Habitat)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    species: Vec<SpeciesRecord>,
}

pub struct CatalogLoader {
    base_dir: PathBuf,
}

impl CatalogLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<Catalog, CatalogError> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path).map_err(|source| CatalogError::Io {
            path: path.clone(),
            source,
        })?;
        let parsed: CatalogFile =
            serde_yaml::from_str(&data).map_err(|source| CatalogError::Parse { path, source })?;
        Catalog::from_records(parsed.species)
    }
}

fn validate_record(record: &SpeciesRecord) -> Result<(), CatalogError> {
    let invalid = |reason: String| CatalogError::Validation {
        species: record.name.clone(),
        reason,
    };

    if record.name.trim().is_empty() {
        return Err(CatalogError::Validation {
            species: "<unnamed>".into(),
            reason: "species name must not be empty".into(),
        });
    }

    let mut ranges = vec![
        ("temperature", record.temperature),
        ("humidity", record.humidity),
        ("plant_coverage", record.plant_coverage),
    ];
    for kind in TerrainKind::ALL {
        ranges.push((kind.label(), record.terrain.get(kind)));
    }
    if let Some(offspring) = record.breeding.offspring_per_mating {
        ranges.push(("offspring_per_mating", offspring));
    }
    for (field, range) in ranges {
        if range.min > range.max {
            return Err(invalid(format!(
                "{field} range has min {} greater than max {}",
                range.min, range.max
            )));
        }
    }

    for kind in AreaKind::ALL {
        let area = record.area(kind);
        if area.minimum < 0.0
            || area.per_additional_adult < 0.0
            || area.per_additional_juvenile < 0.0
        {
            return Err(invalid(format!(
                "{} area values must be non-negative",
                kind.label()
            )));
        }
    }

    for (grade, cost) in [
        ("grade 1", record.food.grade1),
        ("grade 2", record.food.grade2),
        ("grade 3", record.food.grade3),
    ] {
        if cost.adult < 0.0 || cost.juvenile < 0.0 {
            return Err(invalid(format!("{grade} food costs must be non-negative")));
        }
    }

    Ok(())
}
