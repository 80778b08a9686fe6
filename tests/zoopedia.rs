use zooplanner::{
    catalog::{AnimalType, Catalog, CatalogLoader, ConservationStatus},
    filter::{
        filter_species, taxonomy_values, FilterCriteria, SortKey, SwimmingFilter, TaxonomyFilter,
        TaxonomyLevel,
    },
};

fn fixture_catalog() -> Catalog {
    CatalogLoader::new(env!("CARGO_MANIFEST_DIR"))
        .load("data/species.yaml")
        .expect("catalog fixture parses")
}

fn names(catalog: &Catalog, criteria: &FilterCriteria) -> Vec<String> {
    filter_species(criteria, catalog)
        .into_iter()
        .map(|record| record.name.clone())
        .collect()
}

#[test]
fn default_criteria_list_everything_alphabetically() {
    let catalog = fixture_catalog();
    let listing = names(&catalog, &FilterCriteria::default());
    assert_eq!(listing.len(), 7);
    let mut sorted = listing.clone();
    sorted.sort();
    assert_eq!(listing, sorted);
}

#[test]
fn type_filter_separates_habitat_from_exhibit() {
    let catalog = fixture_catalog();
    let criteria = FilterCriteria {
        animal_type: Some(AnimalType::Exhibit),
        ..FilterCriteria::default()
    };
    assert_eq!(names(&catalog, &criteria), ["Goliath Birdeater"]);

    let criteria = FilterCriteria {
        animal_type: Some(AnimalType::Habitat),
        ..FilterCriteria::default()
    };
    assert_eq!(names(&catalog, &criteria).len(), 6);
}

#[test]
fn continent_filter_requires_every_selected_tag() {
    let catalog = fixture_catalog();
    let criteria = FilterCriteria {
        continents: vec!["Africa".into()],
        ..FilterCriteria::default()
    };
    assert_eq!(
        names(&catalog, &criteria),
        ["Plains Zebra", "Ring-tailed Lemur", "Springbok"]
    );

    // No species spans both Africa and Europe.
    let criteria = FilterCriteria {
        continents: vec!["Africa".into(), "Europe".into()],
        ..FilterCriteria::default()
    };
    assert!(names(&catalog, &criteria).is_empty());
}

#[test]
fn boolean_and_status_filters() {
    let catalog = fixture_catalog();
    let criteria = FilterCriteria {
        predator: Some(true),
        ..FilterCriteria::default()
    };
    assert_eq!(
        names(&catalog, &criteria),
        ["Gharial", "Grey Wolf", "Polar Bear"]
    );

    let criteria = FilterCriteria {
        statuses: vec![ConservationStatus::CriticallyEndangered],
        ..FilterCriteria::default()
    };
    assert_eq!(names(&catalog, &criteria), ["Gharial"]);

    let criteria = FilterCriteria {
        guests_interact: Some(true),
        ..FilterCriteria::default()
    };
    assert_eq!(names(&catalog, &criteria), ["Ring-tailed Lemur", "Springbok"]);
}

#[test]
fn swimming_filter_distinguishes_capabilities() {
    let catalog = fixture_catalog();
    let criteria = FilterCriteria {
        swimming: SwimmingFilter::CanDive,
        ..FilterCriteria::default()
    };
    assert_eq!(names(&catalog, &criteria), ["Gharial", "Polar Bear"]);

    let criteria = FilterCriteria {
        swimming: SwimmingFilter::WadesOnly,
        ..FilterCriteria::default()
    };
    assert_eq!(names(&catalog, &criteria), ["Grey Wolf"]);

    let criteria = FilterCriteria {
        swimming: SwimmingFilter::CannotSwim,
        ..FilterCriteria::default()
    };
    assert_eq!(
        names(&catalog, &criteria),
        ["Goliath Birdeater", "Plains Zebra", "Ring-tailed Lemur", "Springbok"]
    );
}

#[test]
fn ceiling_filters_exclude_heavier_requirements() {
    let catalog = fixture_catalog();
    let criteria = FilterCriteria {
        max_barrier_grade: Some(2),
        ..FilterCriteria::default()
    };
    let listing = names(&catalog, &criteria);
    assert!(!listing.contains(&"Polar Bear".to_string()));
    assert!(!listing.contains(&"Gharial".to_string()));
    assert!(listing.contains(&"Grey Wolf".to_string()));

    // Water ceiling only matches species that need water at all.
    let criteria = FilterCriteria {
        max_water_area: Some(1000.0),
        ..FilterCriteria::default()
    };
    assert_eq!(names(&catalog, &criteria), ["Gharial", "Polar Bear"]);
}

#[test]
fn point_in_band_filters_check_containment() {
    let catalog = fixture_catalog();
    let criteria = FilterCriteria {
        temperature_at: Some(0.0),
        ..FilterCriteria::default()
    };
    assert_eq!(names(&catalog, &criteria), ["Grey Wolf", "Polar Bear"]);
}

#[test]
fn dlc_filter_matches_any_owned_pack() {
    let catalog = fixture_catalog();
    let criteria = FilterCriteria {
        dlcs: vec!["Base Game".into()],
        ..FilterCriteria::default()
    };
    assert_eq!(
        names(&catalog, &criteria),
        ["Goliath Birdeater", "Grey Wolf", "Plains Zebra", "Ring-tailed Lemur"]
    );
}

#[test]
fn sorting_by_appeal_descending_leads_with_the_star_animal() {
    let catalog = fixture_catalog();
    let criteria = FilterCriteria {
        sort: SortKey::Appeal,
        descending: true,
        ..FilterCriteria::default()
    };
    let listing = names(&catalog, &criteria);
    assert_eq!(listing[0], "Polar Bear");
    assert_eq!(listing[listing.len() - 1], "Goliath Birdeater");
}

#[test]
fn taxonomy_filter_uses_explicit_levels() {
    let catalog = fixture_catalog();
    let criteria = FilterCriteria {
        taxonomy: TaxonomyFilter {
            class: Some("Mammalia".into()),
            order: Some("Carnivora".into()),
            ..TaxonomyFilter::default()
        },
        ..FilterCriteria::default()
    };
    assert_eq!(names(&catalog, &criteria), ["Grey Wolf", "Polar Bear"]);
}

#[test]
fn taxonomy_values_cascade_from_higher_levels_only() {
    let catalog = fixture_catalog();
    let filter = TaxonomyFilter {
        class: Some("Mammalia".into()),
        order: Some("Carnivora".into()),
        family: Some("Canidae".into()),
        ..TaxonomyFilter::default()
    };
    assert_eq!(
        taxonomy_values(&catalog, TaxonomyLevel::Family, &filter),
        ["Canidae", "Ursidae"],
        "a level's own selection must not narrow its options"
    );
    assert_eq!(
        taxonomy_values(&catalog, TaxonomyLevel::Genus, &filter),
        ["Canis"]
    );
    let all_classes = taxonomy_values(&catalog, TaxonomyLevel::Class, &filter);
    assert!(all_classes.contains(&"Reptilia".to_string()));
}
