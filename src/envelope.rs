//! The requirements aggregator: pure reduction of a selection against the
//! catalog into the habitat envelope the whole group must share.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::{AreaKind, Barrier, Catalog, Range, SpeciesRecord, Tag, TerrainKind};
use crate::selection::{Selection, SelectionEntry};

/// An intersected `{min, max}` band. Both ends are `None` when the selection
/// is empty. `min > max` is a representable "no match" condition, not an
/// error; rendering decides how to show it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl Band {
    pub fn of(min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    pub fn is_unset(&self) -> bool {
        self.min.is_none() || self.max.is_none()
    }

    pub fn is_conflict(&self) -> bool {
        matches!((self.min, self.max), (Some(min), Some(max)) if min > max)
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.min, self.max) {
            (Some(min), Some(max)) if min > max => write!(f, "No Match"),
            (Some(min), Some(max)) => write!(f, "{min} to {max}"),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TerrainBands {
    pub short_grass: Band,
    pub long_grass: Band,
    pub soil: Band,
    pub rock: Band,
    pub sand: Band,
    pub snow: Band,
}

impl TerrainBands {
    pub fn get(&self, kind: TerrainKind) -> Band {
        match kind {
            TerrainKind::ShortGrass => self.short_grass,
            TerrainKind::LongGrass => self.long_grass,
            TerrainKind::Soil => self.soil,
            TerrainKind::Rock => self.rock,
            TerrainKind::Sand => self.sand,
            TerrainKind::Snow => self.snow,
        }
    }

    fn set(&mut self, kind: TerrainKind, band: Band) {
        match kind {
            TerrainKind::ShortGrass => self.short_grass = band,
            TerrainKind::LongGrass => self.long_grass = band,
            TerrainKind::Soil => self.soil = band,
            TerrainKind::Rock => self.rock = band,
            TerrainKind::Sand => self.sand = band,
            TerrainKind::Snow => self.snow = band,
        }
    }

    /// Sum of the intersected minimums across all six kinds. Over 100 the
    /// combination is infeasible: no percentage split satisfies everyone.
    pub fn minimum_total(&self) -> f64 {
        TerrainKind::ALL
            .iter()
            .filter_map(|kind| self.get(*kind).min)
            .sum()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaTotals {
    pub land: u64,
    pub climbing: u64,
    pub water: u64,
    pub deep_water: u64,
}

impl AreaTotals {
    pub fn get(&self, kind: AreaKind) -> u64 {
        match kind {
            AreaKind::Land => self.land,
            AreaKind::Climbing => self.climbing,
            AreaKind::Water => self.water,
            AreaKind::DeepWater => self.deep_water,
        }
    }

    fn set(&mut self, kind: AreaKind, value: u64) {
        match kind {
            AreaKind::Land => self.land = value,
            AreaKind::Climbing => self.climbing = value,
            AreaKind::Water => self.water = value,
            AreaKind::DeepWater => self.deep_water = value,
        }
    }
}

/// The aggregated habitat requirement, rebuilt from scratch on every call.
/// Infeasibility lives inside it as data; there is no error path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HabitatEnvelope {
    pub temperature: Band,
    pub humidity: Band,
    pub plant_coverage: Band,
    pub terrain: TerrainBands,
    pub terrain_overcommitted: bool,
    pub areas: AreaTotals,
    pub continents: Vec<Tag>,
    pub biomes: Vec<Tag>,
    pub barrier: Barrier,
    pub food_cost: f64,
}

/// Reduces the current selection into its habitat envelope. Entries naming a
/// species missing from the catalog are skipped; an empty (or fully skipped)
/// selection yields unset bands and zero totals.
pub fn aggregate(catalog: &Catalog, selection: &Selection) -> HabitatEnvelope {
    let resolved = selection.resolve(catalog);
    let species = distinct_species(&resolved);

    let mut envelope = HabitatEnvelope {
        temperature: intersect(&species, |record| record.temperature),
        humidity: intersect(&species, |record| record.humidity),
        plant_coverage: intersect(&species, |record| record.plant_coverage),
        ..HabitatEnvelope::default()
    };

    for kind in TerrainKind::ALL {
        let band = intersect(&species, |record| record.terrain.get(kind));
        envelope.terrain.set(kind, band);
    }
    envelope.terrain_overcommitted = envelope.terrain.minimum_total() > 100.0;

    for kind in AreaKind::ALL {
        envelope.areas.set(kind, area_requirement(&resolved, kind));
    }

    envelope.continents = intersect_tags(&species, |record| record.continents.as_slice());
    envelope.biomes = intersect_tags(&species, |record| record.biomes.as_slice());
    envelope.barrier = barrier_requirement(&species);
    envelope.food_cost = total_food_cost(&resolved);

    envelope
}

/// Species present in the selection, one per name regardless of population.
fn distinct_species<'a>(
    resolved: &[(&'a SelectionEntry, &'a SpeciesRecord)],
) -> Vec<&'a SpeciesRecord> {
    let mut seen = HashSet::new();
    resolved
        .iter()
        .filter(|(_, record)| seen.insert(record.name.as_str()))
        .map(|(_, record)| *record)
        .collect()
}

/// `{max of mins, min of maxes}` across the given species. The tightest
/// shared band; empty input gives an unset band.
fn intersect(species: &[&SpeciesRecord], pick: impl Fn(&SpeciesRecord) -> Range) -> Band {
    let mut result = Band::default();
    for record in species {
        let range = pick(record);
        result.min = Some(result.min.map_or(range.min, |min: f64| min.max(range.min)));
        result.max = Some(result.max.map_or(range.max, |max: f64| max.min(range.max)));
    }
    result
}

/// One shared enclosure is sized for its most demanding occupant: the
/// per-kind requirement is the maximum across species, not a sum.
fn area_requirement(resolved: &[(&SelectionEntry, &SpeciesRecord)], kind: AreaKind) -> u64 {
    let mut needed: f64 = 0.0;
    for (entry, record) in resolved {
        let adults = entry.total_adults();
        if adults == 0 {
            continue;
        }
        let area = record.area(kind);
        let required = area.minimum
            + f64::from(adults - 1) * area.per_additional_adult
            + f64::from(entry.juveniles) * area.per_additional_juvenile;
        needed = needed.max(required);
    }
    needed.ceil() as u64
}

/// A tag survives only when every species carries one of the same name.
fn intersect_tags(
    species: &[&SpeciesRecord],
    pick: impl Fn(&SpeciesRecord) -> &[Tag],
) -> Vec<Tag> {
    let Some((first, rest)) = species.split_first() else {
        return Vec::new();
    };
    pick(first)
        .iter()
        .filter(|tag| {
            rest.iter()
                .all(|record| pick(record).iter().any(|other| other.name == tag.name))
        })
        .cloned()
        .collect()
}

/// The strictest requirement governs a shared enclosure.
fn barrier_requirement(species: &[&SpeciesRecord]) -> Barrier {
    species.iter().fold(Barrier::default(), |acc, record| Barrier {
        grade: acc.grade.max(record.barrier.grade),
        height: acc.height.max(record.barrier.height),
        climb_proof: acc.climb_proof || record.barrier.climb_proof,
    })
}

fn total_food_cost(resolved: &[(&SelectionEntry, &SpeciesRecord)]) -> f64 {
    resolved
        .iter()
        .map(|(entry, record)| {
            let cost = record.food_cost(entry.food_grade);
            f64::from(entry.total_adults()) * cost.adult
                + f64::from(entry.juveniles) * cost.juvenile
        })
        .sum()
}
