//! Zoopedia filtering. Criteria are one immutable value threaded through a
//! pure function; event handlers build a new value instead of mutating
//! shared state.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::catalog::{AnimalType, Catalog, ConservationStatus, SpeciesRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxonomyLevel {
    Class,
    Order,
    Family,
    Genus,
}

impl TaxonomyLevel {
    pub const ALL: [TaxonomyLevel; 4] = [
        TaxonomyLevel::Class,
        TaxonomyLevel::Order,
        TaxonomyLevel::Family,
        TaxonomyLevel::Genus,
    ];

    /// Each level maps explicitly to its accessor; there is no dynamic
    /// field-name dispatch anywhere in the filter path.
    pub fn value(self, record: &SpeciesRecord) -> &str {
        match self {
            TaxonomyLevel::Class => &record.taxonomy.class,
            TaxonomyLevel::Order => &record.taxonomy.order,
            TaxonomyLevel::Family => &record.taxonomy.family,
            TaxonomyLevel::Genus => &record.taxonomy.genus,
        }
    }
}

/// An optional constraint per taxonomy level; `None` means "all".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxonomyFilter {
    pub class: Option<String>,
    pub order: Option<String>,
    pub family: Option<String>,
    pub genus: Option<String>,
}

impl TaxonomyFilter {
    fn constraint(&self, level: TaxonomyLevel) -> Option<&str> {
        match level {
            TaxonomyLevel::Class => self.class.as_deref(),
            TaxonomyLevel::Order => self.order.as_deref(),
            TaxonomyLevel::Family => self.family.as_deref(),
            TaxonomyLevel::Genus => self.genus.as_deref(),
        }
    }

    fn matches(&self, record: &SpeciesRecord) -> bool {
        TaxonomyLevel::ALL.iter().all(|level| {
            self.constraint(*level)
                .map_or(true, |wanted| level.value(record) == wanted)
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwimmingFilter {
    #[default]
    Any,
    CannotSwim,
    WadesOnly,
    CanSwim,
    CanDive,
}

impl SwimmingFilter {
    fn matches(self, record: &SpeciesRecord) -> bool {
        match self {
            SwimmingFilter::Any => true,
            SwimmingFilter::CannotSwim => {
                !record.can_wade && !record.can_swim && !record.can_dive
            }
            SwimmingFilter::WadesOnly => {
                record.can_wade && !record.can_swim && !record.can_dive
            }
            SwimmingFilter::CanSwim => record.can_swim,
            SwimmingFilter::CanDive => record.can_dive,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Name,
    Appeal,
    FoodCost,
    LifeExpectancy,
}

/// Every active criterion must pass for a species to be listed. Empty lists
/// and `None` values mean "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterCriteria {
    pub animal_type: Option<AnimalType>,
    pub dlcs: Vec<String>,
    /// A species must carry every selected continent.
    pub continents: Vec<String>,
    /// A species must carry every selected biome.
    pub biomes: Vec<String>,
    pub statuses: Vec<ConservationStatus>,
    /// Ceiling filters: the requirement must be present, non-zero and at or
    /// below the given value.
    pub max_barrier_grade: Option<u8>,
    pub max_barrier_height: Option<f64>,
    pub max_land_area: Option<f64>,
    pub max_water_area: Option<f64>,
    /// Point-in-band filters: the given value must fall inside the species'
    /// range.
    pub temperature_at: Option<f64>,
    pub plant_coverage_at: Option<f64>,
    pub predator: Option<bool>,
    pub burrower: Option<bool>,
    pub guests_enter: Option<bool>,
    pub guests_interact: Option<bool>,
    pub swimming: SwimmingFilter,
    pub taxonomy: TaxonomyFilter,
    pub sort: SortKey,
    pub descending: bool,
}

impl FilterCriteria {
    fn matches(&self, record: &SpeciesRecord) -> bool {
        if let Some(animal_type) = self.animal_type {
            if record.animal_type != animal_type {
                return false;
            }
        }
        if !self.dlcs.is_empty()
            && !record.dlc.iter().any(|tag| self.dlcs.contains(&tag.name))
        {
            return false;
        }
        if !self
            .continents
            .iter()
            .all(|wanted| record.continents.iter().any(|tag| &tag.name == wanted))
        {
            return false;
        }
        if !self
            .biomes
            .iter()
            .all(|wanted| record.biomes.iter().any(|tag| &tag.name == wanted))
        {
            return false;
        }
        if !self.statuses.is_empty() && !self.statuses.contains(&record.iucn) {
            return false;
        }

        if let Some(ceiling) = self.max_barrier_grade {
            if record.barrier.grade == 0 || record.barrier.grade > ceiling {
                return false;
            }
        }
        if let Some(ceiling) = self.max_barrier_height {
            if record.barrier.height == 0.0 || record.barrier.height > ceiling {
                return false;
            }
        }
        if let Some(ceiling) = self.max_land_area {
            if record.land.minimum == 0.0 || record.land.minimum > ceiling {
                return false;
            }
        }
        if let Some(ceiling) = self.max_water_area {
            if record.water.minimum == 0.0 || record.water.minimum > ceiling {
                return false;
            }
        }

        if let Some(value) = self.temperature_at {
            if value < record.temperature.min || value > record.temperature.max {
                return false;
            }
        }
        if let Some(value) = self.plant_coverage_at {
            if value < record.plant_coverage.min || value > record.plant_coverage.max {
                return false;
            }
        }

        if let Some(wanted) = self.predator {
            if record.social.predator != wanted {
                return false;
            }
        }
        if let Some(wanted) = self.burrower {
            if record.social.burrower != wanted {
                return false;
            }
        }
        if let Some(wanted) = self.guests_enter {
            if record.guests_enter != wanted {
                return false;
            }
        }
        if let Some(wanted) = self.guests_interact {
            if record.guests_interact != wanted {
                return false;
            }
        }

        self.swimming.matches(record) && self.taxonomy.matches(record)
    }
}

/// Applies every criterion conjunctively, then sorts the survivors. Name is
/// always the final tiebreak so the listing is stable.
pub fn filter_species<'a>(
    criteria: &FilterCriteria,
    catalog: &'a Catalog,
) -> Vec<&'a SpeciesRecord> {
    let mut matches: Vec<&SpeciesRecord> = catalog
        .iter()
        .filter(|record| criteria.matches(record))
        .collect();

    matches.sort_by(|a, b| {
        let ordering = match criteria.sort {
            SortKey::Name => a.name.cmp(&b.name),
            SortKey::Appeal => compare_f64(a.species_appeal, b.species_appeal),
            SortKey::FoodCost => compare_f64(a.food.grade1.adult, b.food.grade1.adult),
            SortKey::LifeExpectancy => {
                compare_f64(a.breeding.life_expectancy, b.breeding.life_expectancy)
            }
        };
        let ordering = if criteria.descending {
            ordering.reverse()
        } else {
            ordering
        };
        ordering.then_with(|| a.name.cmp(&b.name))
    });

    matches
}

/// Distinct values for one taxonomy level among species matching the levels
/// above it. Drives cascading selectors: a level's options never depend on
/// its own or lower selections.
pub fn taxonomy_values(
    catalog: &Catalog,
    level: TaxonomyLevel,
    filter: &TaxonomyFilter,
) -> Vec<String> {
    let higher = TaxonomyFilter {
        class: filter.class.clone(),
        order: (level == TaxonomyLevel::Family || level == TaxonomyLevel::Genus)
            .then(|| filter.order.clone())
            .flatten(),
        family: (level == TaxonomyLevel::Genus)
            .then(|| filter.family.clone())
            .flatten(),
        genus: None,
    };
    let higher = match level {
        TaxonomyLevel::Class => TaxonomyFilter::default(),
        _ => higher,
    };

    let mut values: Vec<String> = catalog
        .iter()
        .filter(|record| higher.matches(record))
        .map(|record| level.value(record).to_string())
        .filter(|value| !value.is_empty())
        .collect();
    values.sort();
    values.dedup();
    values
}

fn compare_f64(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_criteria_have_no_constraints() {
        let criteria = FilterCriteria::default();
        assert!(criteria.animal_type.is_none());
        assert!(criteria.continents.is_empty());
        assert_eq!(criteria.swimming, SwimmingFilter::Any);
        assert_eq!(criteria.sort, SortKey::Name);
    }

    #[test]
    fn criteria_deserialize_with_partial_fields() {
        let criteria: FilterCriteria =
            serde_json::from_str(r#"{"predator": true, "sort": "appeal"}"#).unwrap();
        assert_eq!(criteria.predator, Some(true));
        assert_eq!(criteria.sort, SortKey::Appeal);
        assert!(!criteria.descending);
    }
}
