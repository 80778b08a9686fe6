mod assets;

use std::{
    convert::Infallible,
    net::SocketAddr,
    path::PathBuf,
    sync::{Arc, Mutex},
    time::Duration,
};

use anyhow::Result;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{
        sse::{Event, KeepAlive, Sse},
        Html, IntoResponse, Response,
    },
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::broadcast};
use tokio_stream::{wrappers::BroadcastStream, Stream, StreamExt};

use crate::{
    catalog::{Catalog, SpeciesRecord},
    filter::{filter_species, FilterCriteria},
    planner::{PlanOutputs, Planner, PlannerError},
    selection::{Selection, SelectionEntry},
    store::{HabitatStore, SavedHabitat},
};

pub struct WebServerConfig {
    pub catalog: Arc<Catalog>,
    pub store_path: PathBuf,
    pub host: String,
    pub port: u16,
}

#[derive(Clone)]
struct AppState {
    catalog: Arc<Catalog>,
    planner: Arc<Mutex<Planner>>,
    broadcaster: broadcast::Sender<String>,
}

pub async fn run(config: WebServerConfig) -> Result<()> {
    let WebServerConfig {
        catalog,
        store_path,
        host,
        port,
    } = config;

    let store = HabitatStore::open(&store_path)?;
    let planner = Planner::new(catalog.clone(), store);
    let (tx, _) = broadcast::channel::<String>(128);

    let state = AppState {
        catalog,
        planner: Arc::new(Mutex::new(planner)),
        broadcaster: tx,
    };

    let router = Router::new()
        .route("/", get(index))
        .route("/styles.css", get(styles))
        .route("/app.js", get(script))
        .route("/api/species", get(list_species))
        .route("/api/species/:name", get(species_detail))
        .route("/api/filter", post(filter_listing))
        .route("/api/requirements", post(requirements))
        .route("/api/habitats", get(list_habitats).post(save_habitat))
        .route("/api/habitats/:id", delete(delete_habitat))
        .route("/api/events", get(stream_events))
        .with_state(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    println!(
        "Habitat planner live at http://{}:{} (Ctrl+C to stop)",
        host, port
    );

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    println!("Shutting down planner...");
}

async fn index() -> Html<&'static str> {
    Html(assets::INDEX_HTML)
}

async fn styles() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        assets::STYLES_CSS,
    )
}

async fn script() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript; charset=utf-8")],
        assets::APP_JS,
    )
}

#[derive(Serialize)]
struct SpeciesSummary {
    name: String,
    latin: String,
    iucn: &'static str,
    species_appeal: f64,
    life_expectancy: f64,
}

impl SpeciesSummary {
    fn from_record(record: &SpeciesRecord) -> Self {
        Self {
            name: record.name.clone(),
            latin: record.latin.clone(),
            iucn: record.iucn.label(),
            species_appeal: record.species_appeal,
            life_expectancy: record.breeding.life_expectancy,
        }
    }
}

async fn list_species(State(state): State<AppState>) -> Json<Vec<SpeciesSummary>> {
    let listing = filter_species(&FilterCriteria::default(), &state.catalog)
        .into_iter()
        .map(SpeciesSummary::from_record)
        .collect();
    Json(listing)
}

async fn species_detail(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    match state.catalog.get(&name) {
        Some(record) => Json(record.clone()).into_response(),
        None => (StatusCode::NOT_FOUND, format!("unknown species '{name}'")).into_response(),
    }
}

async fn filter_listing(
    State(state): State<AppState>,
    Json(criteria): Json<FilterCriteria>,
) -> Json<Vec<SpeciesSummary>> {
    let listing = filter_species(&criteria, &state.catalog)
        .into_iter()
        .map(SpeciesSummary::from_record)
        .collect();
    Json(listing)
}

/// The core contract: a selection in, the envelope and notes out. Stateless;
/// the browser calls this on every edit.
async fn requirements(
    State(state): State<AppState>,
    Json(entries): Json<Vec<SelectionEntry>>,
) -> Json<PlanOutputs> {
    let selection = Selection::from_entries(entries);
    Json(PlanOutputs::compute(&state.catalog, &selection))
}

async fn list_habitats(State(state): State<AppState>) -> Json<Vec<SavedHabitat>> {
    let planner = state.planner.lock().expect("planner lock poisoned");
    Json(planner.store().habitats().to_vec())
}

#[derive(Deserialize)]
struct SaveRequest {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: String,
    animals: Vec<SelectionEntry>,
}

async fn save_habitat(State(state): State<AppState>, Json(request): Json<SaveRequest>) -> Response {
    let saved = {
        let mut planner = state.planner.lock().expect("planner lock poisoned");
        apply_and_save(&mut planner, request)
    };
    match saved {
        Ok(habitat) => {
            broadcast_change(&state, "saved", &habitat.id);
            Json(habitat).into_response()
        }
        Err(err) => planner_error_response(err),
    }
}

async fn delete_habitat(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let result = {
        let mut planner = state.planner.lock().expect("planner lock poisoned");
        // The browser's confirm dialog is the explicit confirmation step.
        planner
            .request_delete(&id)
            .map(|_| ())
            .and_then(|()| planner.confirm_delete())
    };
    match result {
        Ok(()) => {
            broadcast_change(&state, "deleted", &id);
            StatusCode::NO_CONTENT.into_response()
        }
        Err(err) => planner_error_response(err),
    }
}

/// Runs one full edit session under the planner's lifecycle rules: open,
/// replace the selection, save. Unknown species are skipped, never fatal.
fn apply_and_save(
    planner: &mut Planner,
    request: SaveRequest,
) -> Result<SavedHabitat, PlannerError> {
    match &request.id {
        Some(id) => planner.edit(id)?,
        None => planner.start_new()?,
    }
    let result = apply_entries(planner, &request.name, &request.animals);
    if result.is_err() {
        let _ = planner.cancel();
    }
    result
}

fn apply_entries(
    planner: &mut Planner,
    name: &str,
    animals: &[SelectionEntry],
) -> Result<SavedHabitat, PlannerError> {
    planner.rename(name)?;
    let existing: Vec<String> = planner
        .selection()
        .map(|selection| {
            selection
                .entries()
                .iter()
                .map(|entry| entry.species.clone())
                .collect()
        })
        .unwrap_or_default();
    for species in existing {
        planner.remove_species(&species)?;
    }
    for entry in animals {
        match planner.add_species(&entry.species) {
            Ok(_) => {
                planner.set_counts(&entry.species, entry.males, entry.females, entry.juveniles)?;
                planner.set_food_grade(&entry.species, entry.food_grade)?;
            }
            Err(PlannerError::UnknownSpecies(_)) | Err(PlannerError::DuplicateSpecies(_)) => {
                continue;
            }
            Err(err) => return Err(err),
        }
    }
    planner.save()
}

fn planner_error_response(err: PlannerError) -> Response {
    let status = match &err {
        PlannerError::UnknownHabitat(_) | PlannerError::UnknownSpecies(_) => StatusCode::NOT_FOUND,
        PlannerError::AlreadyEditing | PlannerError::DuplicateSpecies(_) => StatusCode::CONFLICT,
        PlannerError::NotEditing | PlannerError::NoPendingDelete => StatusCode::BAD_REQUEST,
        PlannerError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, err.to_string()).into_response()
}

#[derive(Serialize)]
struct ChangeEvent<'a> {
    event: &'a str,
    id: &'a str,
}

fn broadcast_change(state: &AppState, event: &str, id: &str) {
    if let Ok(payload) = serde_json::to_string(&ChangeEvent { event, id }) {
        let _ = state.broadcaster.send(payload);
    }
}

async fn stream_events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.broadcaster.subscribe();
    let stream = BroadcastStream::new(rx).filter_map(|msg| match msg {
        Ok(payload) => Some(Ok(Event::default().data(payload))),
        Err(_) => None,
    });
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(2))
            .text("keep-alive"),
    )
}
