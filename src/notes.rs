//! Advisory note generation: a second pass over the envelope plus each
//! species' social and breeding metadata. Notes are classified data; the
//! presentation layer decides styling.

use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, Dominance, SpeciesRecord};
use crate::envelope::HabitatEnvelope;
use crate::selection::{Selection, SelectionEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub severity: Severity,
    pub text: String,
}

impl Note {
    fn info(text: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            text: text.into(),
        }
    }

    fn warning(text: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            text: text.into(),
        }
    }

    fn error(text: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            text: text.into(),
        }
    }
}

/// Produces the ordered advisory list for the current selection. Empty when
/// nothing resolvable is selected; the caller renders its own placeholder.
pub fn generate(
    catalog: &Catalog,
    selection: &Selection,
    envelope: &HabitatEnvelope,
) -> Vec<Note> {
    let resolved = selection.resolve(catalog);
    if resolved.is_empty() {
        return Vec::new();
    }

    let mut notes = Vec::new();

    if envelope.terrain_overcommitted {
        notes.push(Note::error(
            "The total for minimum terrain requirements exceeds 100%! Can't satisfy all the animals!",
        ));
    }

    // A species needing zero plant coverage does not actually require the
    // geographic match, so an empty intersection is only informational.
    if envelope.plant_coverage.min == Some(0.0) {
        let continents_empty = envelope.continents.is_empty();
        let biomes_empty = envelope.biomes.is_empty();
        if continents_empty && biomes_empty {
            notes.push(Note::warning(
                "There is no match in continents and biomes, but the species do not require plant coverage.",
            ));
        } else if continents_empty {
            notes.push(Note::warning(
                "There is no match in continents, but the species do not require plant coverage.",
            ));
        } else if biomes_empty {
            notes.push(Note::warning(
                "There is no match in biomes, but the species do not require plant coverage.",
            ));
        }
    }

    for (entry, record) in &resolved {
        species_notes(entry, record, &mut notes);
    }

    if resolved.iter().all(|(_, record)| record.guests_enter) {
        notes.push(Note::info("Guests can enter this habitat."));
        for (_, record) in &resolved {
            if record.guests_interact {
                notes.push(Note::info(format!(
                    "Animal encounters available for {}!",
                    record.name
                )));
            }
        }
    }

    notes
}

fn species_notes(entry: &SelectionEntry, record: &SpeciesRecord, notes: &mut Vec<Note>) {
    let name = record.name.as_str();
    let social = &record.social;
    let adults = entry.total_adults();

    if adults == 0 {
        notes.push(Note::info(format!(
            "Please add an adult {name} for more data."
        )));
    } else {
        if adults < social.group_size_min {
            notes.push(Note::warning(format!(
                "At least {} adult {name}s are required.",
                social.group_size_min
            )));
        }
        if adults > social.group_mixed_max {
            notes.push(Note::warning(format!(
                "You shouldn't keep more than {} adult {name}s in the habitat!",
                social.group_mixed_max
            )));
        }

        if entry.males > 0 && entry.females == 0 && entry.males > social.max_males_bachelor {
            notes.push(Note::warning(format!(
                "There shouldn't be more than {} male {name}s in a male only habitat!",
                social.max_males_bachelor
            )));
        } else if entry.females > 0 && entry.males == 0 && entry.females > social.max_females_bachelor
        {
            notes.push(Note::warning(format!(
                "There shouldn't be more than {} female {name}s in a female only habitat!",
                social.max_females_bachelor
            )));
        } else if entry.males > 0 && entry.females > 0 {
            let males_over = entry.males > social.max_males_mixed;
            let females_over = entry.females > social.max_females_mixed;
            if males_over && females_over {
                notes.push(Note::warning(format!(
                    "You shouldn't keep more than {} male and {} female {name}s in a habitat!",
                    social.max_males_mixed, social.max_females_mixed
                )));
            } else {
                if males_over {
                    notes.push(Note::warning(format!(
                        "There shouldn't be more than {} male {name}s in a mixed gender habitat!",
                        social.max_males_mixed
                    )));
                }
                if females_over {
                    notes.push(Note::warning(format!(
                        "There shouldn't be more than {} female {name}s in a mixed gender habitat!",
                        social.max_females_mixed
                    )));
                }
            }
        }
    }

    if entry.juveniles > 0 && adults == 0 {
        notes.push(Note::error(format!(
            "{name} requires an adult of the same species!"
        )));
    }
    if social.predator {
        notes.push(Note::warning(format!("{name} is a predator!")));
    }
    if social.burrower {
        notes.push(Note::info(format!("{name} can use burrows!")));
    }

    if entry.males > 0 && entry.females > 0 {
        match social.dominance {
            Dominance::AlphaMale => notes.push(Note::info(format!(
                "Only the {name} alpha male can mate!"
            ))),
            Dominance::AlphaFemale => notes.push(Note::info(format!(
                "Only the {name} alpha female can mate!"
            ))),
            Dominance::AlphaCouple => notes.push(Note::info(format!(
                "Only the {name} alpha couple can mate!"
            ))),
            _ => {}
        }
    }

    offspring_projection(entry, record, notes);
}

/// Lifetime offspring projection. Requires gestation, interbirth and litter
/// size to be defined; a missing sterility age falls back to the life
/// expectancy (fertile until death).
fn offspring_projection(entry: &SelectionEntry, record: &SpeciesRecord, notes: &mut Vec<Note>) {
    let breeding = &record.breeding;
    let (Some(gestation), Some(interbirth), Some(offspring)) = (
        breeding.gestation_months,
        breeding.interbirth_months,
        breeding.offspring_per_mating,
    ) else {
        return;
    };
    if entry.females == 0 {
        return;
    }

    let sterile_at = breeding.sterility_age.unwrap_or(breeding.life_expectancy);
    if sterile_at < 0.0 {
        return;
    }

    let reproductive_months = (sterile_at - breeding.maturity_age) * 12.0;
    let cycles = (reproductive_months / (gestation + interbirth)).round();
    let min_per_female = (cycles * offspring.min).round() as i64;
    let max_per_female = (cycles * offspring.max).round() as i64;

    let name = record.name.as_str();
    match record.social.dominance {
        // Breeding is restricted to a single female or couple: one
        // projection for that breeder, independent of the female count.
        Dominance::AlphaCouple | Dominance::AlphaFemale => {
            if entry.males > 0 {
                let breeder = if record.social.dominance == Dominance::AlphaCouple {
                    "alpha couple"
                } else {
                    "alpha female"
                };
                let text = if min_per_female == max_per_female {
                    format!(
                        "The {name} {breeder} can have about {min_per_female} offspring in their lifetime!"
                    )
                } else {
                    format!(
                        "The {name} {breeder} can have between {min_per_female} and {max_per_female} offspring in their lifetime!"
                    )
                };
                notes.push(Note::info(text));
            }
        }
        _ => {
            if entry.males > 0 {
                let females = i64::from(entry.females);
                let total_min = min_per_female * females;
                let total_max = max_per_female * females;
                let text = if entry.females == 1 {
                    if min_per_female == max_per_female {
                        format!(
                            "The female {name} added can have about {total_min} offspring in her lifetime!"
                        )
                    } else {
                        format!(
                            "The female {name} added can have between {total_min} and {total_max} offspring in her lifetime!"
                        )
                    }
                } else if min_per_female == max_per_female {
                    format!(
                        "The female {name}s added can have about {total_min} offspring in their lifetime! ({min_per_female} per female)"
                    )
                } else {
                    format!(
                        "The female {name}s added can have between {total_min} and {total_max} offspring in their lifetime! ({min_per_female}-{max_per_female} per female)"
                    )
                };
                notes.push(Note::info(text));
            }
        }
    }
}
