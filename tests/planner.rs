use std::sync::Arc;

use tempfile::TempDir;

use zooplanner::{
    catalog::{Catalog, CatalogLoader},
    planner::{CancelOutcome, Planner, PlannerError},
    selection::{FoodGrade, SelectionEntry},
    store::{generate_id, HabitatStore, SavedHabitat},
};

fn fixture_catalog() -> Arc<Catalog> {
    Arc::new(
        CatalogLoader::new(env!("CARGO_MANIFEST_DIR"))
            .load("data/species.yaml")
            .expect("catalog fixture parses"),
    )
}

fn planner_in(dir: &TempDir) -> Planner {
    let store = HabitatStore::open(dir.path().join("habitats.json")).unwrap();
    Planner::new(fixture_catalog(), store)
}

#[test]
fn new_habitat_saves_and_lists_most_recent_first() {
    let dir = tempfile::tempdir().unwrap();
    let mut planner = planner_in(&dir);

    planner.start_new().unwrap();
    planner.rename("Wolf Woods").unwrap();
    planner.add_species("Grey Wolf").unwrap();
    planner.set_counts("Grey Wolf", 2, 2, 0).unwrap();
    let first = planner.save().unwrap();

    planner.start_new().unwrap();
    planner.rename("Savanna").unwrap();
    planner.add_species("Springbok").unwrap();
    planner.set_counts("Springbok", 2, 5, 0).unwrap();
    planner.save().unwrap();

    let names: Vec<&str> = planner
        .store()
        .habitats()
        .iter()
        .map(|habitat| habitat.name.as_str())
        .collect();
    assert_eq!(names, ["Savanna", "Wolf Woods"]);
    assert_eq!(planner.store().get(&first.id).unwrap().name, "Wolf Woods");
}

#[test]
fn only_one_habitat_may_be_editing_at_a_time() {
    let dir = tempfile::tempdir().unwrap();
    let mut planner = planner_in(&dir);

    planner.start_new().unwrap();
    assert!(matches!(
        planner.start_new(),
        Err(PlannerError::AlreadyEditing)
    ));
    planner.add_species("Grey Wolf").unwrap();
    let saved = planner.save().unwrap();

    planner.edit(&saved.id).unwrap();
    assert!(matches!(
        planner.edit(&saved.id),
        Err(PlannerError::AlreadyEditing)
    ));
}

#[test]
fn mutations_recompute_the_outputs_each_time() {
    let dir = tempfile::tempdir().unwrap();
    let mut planner = planner_in(&dir);

    planner.start_new().unwrap();
    let outputs = planner.add_species("Grey Wolf").unwrap();
    assert!(
        outputs
            .notes
            .iter()
            .any(|note| note.text == "Please add an adult Grey Wolf for more data."),
        "zero-count species should prompt for an adult"
    );
    assert_eq!(outputs.envelope.areas.land, 0);

    let outputs = planner.set_counts("Grey Wolf", 2, 2, 0).unwrap();
    assert_eq!(outputs.envelope.areas.land, 1050 + 3 * 105);

    let before = planner.outputs().unwrap().envelope.food_cost;
    let outputs = planner.set_food_grade("Grey Wolf", FoodGrade::Grade3).unwrap();
    assert!(outputs.envelope.food_cost > before);
}

#[test]
fn save_freezes_the_rendered_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let mut planner = planner_in(&dir);

    planner.start_new().unwrap();
    planner.add_species("Polar Bear").unwrap();
    planner.set_counts("Polar Bear", 1, 1, 0).unwrap();
    let saved = planner.save().unwrap();

    assert_eq!(saved.outputs.envelope.areas.land, 2500);
    assert_eq!(saved.outputs.envelope.areas.water, 950);
    assert!(saved
        .outputs
        .notes
        .iter()
        .any(|note| note.text == "Polar Bear is a predator!"));
    assert_eq!(saved.animals.len(), 1);
}

#[test]
fn unnamed_habitats_get_a_default_name() {
    let dir = tempfile::tempdir().unwrap();
    let mut planner = planner_in(&dir);
    planner.start_new().unwrap();
    planner.add_species("Springbok").unwrap();
    let saved = planner.save().unwrap();
    assert_eq!(saved.name, "Habitat");
}

#[test]
fn cancelling_a_new_habitat_discards_it() {
    let dir = tempfile::tempdir().unwrap();
    let mut planner = planner_in(&dir);

    planner.start_new().unwrap();
    planner.add_species("Grey Wolf").unwrap();
    assert_eq!(planner.cancel().unwrap(), CancelOutcome::Discarded);
    assert!(planner.store().is_empty());
    assert!(!planner.is_editing());
}

#[test]
fn cancelling_an_edit_leaves_the_saved_state_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let mut planner = planner_in(&dir);

    planner.start_new().unwrap();
    planner.rename("Savanna").unwrap();
    planner.add_species("Springbok").unwrap();
    planner.set_counts("Springbok", 2, 5, 0).unwrap();
    let saved = planner.save().unwrap();

    planner.edit(&saved.id).unwrap();
    planner.set_counts("Springbok", 0, 0, 0).unwrap();
    planner.remove_species("Springbok").unwrap();
    assert_eq!(
        planner.cancel().unwrap(),
        CancelOutcome::Restored(saved.id.clone())
    );

    let stored = planner.store().get(&saved.id).unwrap();
    assert_eq!(stored.animals.len(), 1);
    assert_eq!(stored.animals[0].males, 2);
    assert_eq!(stored.animals[0].females, 5);
}

#[test]
fn editing_reopens_the_saved_selection() {
    let dir = tempfile::tempdir().unwrap();
    let mut planner = planner_in(&dir);

    planner.start_new().unwrap();
    planner.add_species("Gharial").unwrap();
    planner.set_counts("Gharial", 1, 4, 2).unwrap();
    let saved = planner.save().unwrap();

    planner.edit(&saved.id).unwrap();
    let selection = planner.selection().unwrap();
    assert_eq!(selection.len(), 1);
    let entry = &selection.entries()[0];
    assert_eq!((entry.males, entry.females, entry.juveniles), (1, 4, 2));
    assert_eq!(planner.editing_name(), Some("Habitat"));
}

#[test]
fn editing_skips_species_missing_from_the_catalog() {
    let dir = tempfile::tempdir().unwrap();
    let store_path = dir.path().join("habitats.json");
    let mut store = HabitatStore::open(&store_path).unwrap();
    let mut dodo = SelectionEntry::new("Dodo");
    dodo.males = 2;
    store
        .upsert(SavedHabitat {
            id: generate_id(),
            name: "Aviary".into(),
            animals: vec![dodo, SelectionEntry::new("Grey Wolf")],
            outputs: Default::default(),
            saved_at: chrono::Utc::now(),
        })
        .unwrap();
    let id = store.habitats()[0].id.clone();

    let mut planner = Planner::new(fixture_catalog(), store);
    planner.edit(&id).unwrap();
    let selection = planner.selection().unwrap();
    assert_eq!(selection.len(), 1, "the extinct entry is dropped");
    assert_eq!(selection.entries()[0].species, "Grey Wolf");
}

#[test]
fn delete_requires_explicit_confirmation() {
    let dir = tempfile::tempdir().unwrap();
    let mut planner = planner_in(&dir);

    planner.start_new().unwrap();
    planner.add_species("Grey Wolf").unwrap();
    let saved = planner.save().unwrap();

    assert!(matches!(
        planner.confirm_delete(),
        Err(PlannerError::NoPendingDelete)
    ));

    planner.request_delete(&saved.id).unwrap();
    planner.cancel_delete();
    assert!(matches!(
        planner.confirm_delete(),
        Err(PlannerError::NoPendingDelete)
    ));
    assert_eq!(planner.store().len(), 1, "cancelled delete keeps the plan");

    planner.request_delete(&saved.id).unwrap();
    planner.confirm_delete().unwrap();
    assert!(planner.store().is_empty());
}

#[test]
fn unknown_ids_and_species_error_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    let mut planner = planner_in(&dir);

    assert!(matches!(
        planner.edit("nope"),
        Err(PlannerError::UnknownHabitat(_))
    ));
    assert!(matches!(
        planner.request_delete("nope"),
        Err(PlannerError::UnknownHabitat(_))
    ));

    planner.start_new().unwrap();
    assert!(matches!(
        planner.add_species("Dodo"),
        Err(PlannerError::UnknownSpecies(_))
    ));
    planner.add_species("Grey Wolf").unwrap();
    assert!(matches!(
        planner.add_species("Grey Wolf"),
        Err(PlannerError::DuplicateSpecies(_))
    ));
}

#[test]
fn saved_habitats_survive_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let store_path = dir.path().join("habitats.json");

    {
        let store = HabitatStore::open(&store_path).unwrap();
        let mut planner = Planner::new(fixture_catalog(), store);
        planner.start_new().unwrap();
        planner.rename("Tundra Shore").unwrap();
        planner.add_species("Polar Bear").unwrap();
        planner.set_counts("Polar Bear", 1, 1, 0).unwrap();
        planner.save().unwrap();
    }

    let store = HabitatStore::open(&store_path).unwrap();
    assert_eq!(store.len(), 1);
    let habitat = &store.habitats()[0];
    assert_eq!(habitat.name, "Tundra Shore");
    assert_eq!(habitat.outputs.envelope.areas.land, 2500);
}
