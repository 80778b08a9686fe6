use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use zooplanner::{
    catalog::{AreaKind, CatalogLoader, TerrainKind},
    envelope::HabitatEnvelope,
    filter::{filter_species, FilterCriteria},
    notes::Severity,
    planner::PlanOutputs,
    selection::{PlanLoader, Selection},
    web::{self, WebServerConfig},
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Zoopedia and habitat planner")]
struct Cli {
    /// Path to the species catalog YAML
    #[arg(long, default_value = "data/species.yaml")]
    catalog: PathBuf,

    /// Evaluate a habitat plan file and print its requirements
    #[arg(long)]
    plan: Option<PathBuf>,

    /// Serve the planner UI to a local browser
    #[arg(long)]
    serve: bool,

    /// Habitat store file used by the web planner
    #[arg(long, default_value = "habitats.json")]
    store: PathBuf,

    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    #[arg(long, default_value_t = 8080)]
    port: u16,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let loader = CatalogLoader::new(".");
    let catalog = Arc::new(loader.load(&cli.catalog)?);

    if let Some(plan_path) = &cli.plan {
        let plan = PlanLoader::new(".").load(plan_path)?;
        let name = plan.name.clone().unwrap_or_else(|| "Habitat".to_string());
        let selection = Selection::from_entries(plan.animals);
        for entry in selection.entries() {
            if !catalog.contains(&entry.species) {
                eprintln!("[plan] Skipping unknown species '{}'", entry.species);
            }
        }
        let outputs = PlanOutputs::compute(&catalog, &selection);
        print_outputs(&name, &outputs);
        return Ok(());
    }

    if cli.serve {
        let runtime = tokio::runtime::Runtime::new()?;
        return runtime.block_on(web::run(WebServerConfig {
            catalog,
            store_path: cli.store,
            host: cli.host,
            port: cli.port,
        }));
    }

    // Default: print the zoopedia listing.
    let listing = filter_species(&FilterCriteria::default(), &catalog);
    println!("{} species in the catalog:", listing.len());
    for record in listing {
        println!(
            "  {:<30} {:<28} {}",
            record.name,
            record.latin,
            record.iucn.label()
        );
    }
    Ok(())
}

fn print_outputs(name: &str, outputs: &PlanOutputs) {
    println!("Habitat: {name}");
    println!();
    print_envelope(&outputs.envelope);
    println!();
    if outputs.notes.is_empty() {
        println!("No advisories; add an animal to see habitat requirements.");
    } else {
        println!("Advisories:");
        for note in &outputs.notes {
            let tag = match note.severity {
                Severity::Info => "info",
                Severity::Warning => "warning",
                Severity::Error => "error",
            };
            println!("  [{tag}] {}", note.text);
        }
    }
}

fn print_envelope(envelope: &HabitatEnvelope) {
    println!("Temperature:     {} °C", envelope.temperature);
    println!("Humidity:        {} %", envelope.humidity);
    println!("Plant coverage:  {} %", envelope.plant_coverage);
    let continents: Vec<&str> = envelope
        .continents
        .iter()
        .map(|tag| tag.name.as_str())
        .collect();
    let biomes: Vec<&str> = envelope
        .biomes
        .iter()
        .map(|tag| tag.name.as_str())
        .collect();
    // An empty selection renders as unset, not as a mismatch.
    let nothing_selected = envelope.temperature.is_unset();
    println!(
        "Continents:      {}",
        join_or_no_match(&continents, nothing_selected)
    );
    println!(
        "Biomes:          {}",
        join_or_no_match(&biomes, nothing_selected)
    );
    let barrier = &envelope.barrier;
    if barrier.grade > 0 || barrier.height > 0.0 {
        println!(
            "Barrier:         Grade: {}, Height: {}m{}",
            barrier.grade,
            barrier.height,
            if barrier.climb_proof {
                ", Climb Proof"
            } else {
                ""
            }
        );
    }
    println!("Minimum area:");
    for kind in AreaKind::ALL {
        println!(
            "  {:<13} {} m²",
            format!("{}:", kind.label()),
            envelope.areas.get(kind)
        );
    }
    println!("Terrain:");
    for kind in TerrainKind::ALL {
        let band = envelope.terrain.get(kind);
        let flag = if envelope.terrain_overcommitted && !band.is_unset() {
            "  (overcommitted)"
        } else {
            ""
        };
        println!("  {:<13} {}{}", format!("{}:", kind.label()), band, flag);
    }
    println!("Food costs per feed: ${:.2}", envelope.food_cost);
}

fn join_or_no_match(names: &[&str], nothing_selected: bool) -> String {
    if names.is_empty() {
        if nothing_selected {
            String::new()
        } else {
            "No Match".to_string()
        }
    } else {
        names.join(", ")
    }
}
