//! Search server for nearby medical facilities.
//!
//! Exposes the search pipeline to the presentation layer as a single
//! HTTP operation; map and list rendering live entirely on the client.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use tamarack::geocode::NominatimGeocoder;
use tamarack::overpass::OverpassClient;
use tamarack::{
    Facility, GeoPoint, SearchConfig, SearchCoordinator, SearchError, SearchOrchestrator,
    SearchOutcome,
};

#[derive(Parser, Debug)]
#[command(name = "server")]
#[command(about = "Nearby facility search server")]
struct Args {
    /// Listen address
    #[arg(short, long, default_value = "0.0.0.0:3000")]
    listen: String,

    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Geocoding service URL (overrides config)
    #[arg(long)]
    nominatim_url: Option<String>,

    /// POI service URL (overrides config)
    #[arg(long)]
    overpass_url: Option<String>,
}

/// Application state shared across handlers
struct AppState {
    coordinator: SearchCoordinator<NominatimGeocoder, OverpassClient>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => SearchConfig::load_from_file(path)?,
        None => SearchConfig::default(),
    };
    if let Some(url) = args.nominatim_url {
        config.nominatim_url = url;
    }
    if let Some(url) = args.overpass_url {
        config.overpass_url = url;
    }

    info!("Tamarack Search Server");
    info!("Geocoder: {}", config.nominatim_url);
    info!("POI service: {}", config.overpass_url);

    let geocoder =
        NominatimGeocoder::new(&config).context("Failed to create geocoding client")?;
    let poi = OverpassClient::new(&config).context("Failed to create POI client")?;
    let coordinator = SearchCoordinator::new(SearchOrchestrator::new(geocoder, poi, config));

    let state = Arc::new(AppState { coordinator });

    // Build router
    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/v1/search", get(search_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    info!("Starting server on {}", args.listen);

    let listener = tokio::net::TcpListener::bind(&args.listen).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint
async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

/// Facility search: one operation, the whole contract the UI depends on.
///
/// Zero matches is a success-shaped "empty" response, never an error.
async fn search_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchQueryParams>,
) -> Result<Json<SearchResponse>, (StatusCode, String)> {
    let outcome = state.coordinator.search(&params.text).await;

    match outcome {
        SearchOutcome::Success {
            origin,
            facilities,
            attempts,
        } => Ok(Json(SearchResponse {
            status: "ok",
            message: None,
            origin: Some(origin),
            features: facilities.iter().map(to_feature).collect(),
            attempts: attempts.len(),
        })),
        SearchOutcome::Exhausted { origin, attempts } => Ok(Json(SearchResponse {
            status: "empty",
            message: Some("No facilities nearby."),
            origin: Some(origin),
            features: Vec::new(),
            attempts: attempts.len(),
        })),
        SearchOutcome::Failed { error } => {
            tracing::error!(%error, "search failed");
            Err((error_status(&error), error.user_message().to_string()))
        }
    }
}

#[derive(Deserialize)]
struct SearchQueryParams {
    /// Free-text place name
    text: String,
}

#[derive(Serialize)]
struct SearchResponse {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    origin: Option<GeoPoint>,
    features: Vec<FacilityFeature>,
    attempts: usize,
}

/// Facility in GeoJSON-like format
#[derive(Serialize)]
struct FacilityFeature {
    #[serde(rename = "type")]
    feature_type: &'static str,
    geometry: FeatureGeometry,
    properties: FeatureProperties,
}

#[derive(Serialize)]
struct FeatureGeometry {
    #[serde(rename = "type")]
    geo_type: &'static str,
    coordinates: [f64; 2],
}

#[derive(Serialize)]
struct FeatureProperties {
    id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    tags: HashMap<String, String>,
}

fn to_feature(facility: &Facility) -> FacilityFeature {
    FacilityFeature {
        feature_type: "Feature",
        geometry: FeatureGeometry {
            geo_type: "Point",
            coordinates: [facility.location.lon, facility.location.lat],
        },
        properties: FeatureProperties {
            id: facility.source_id(),
            name: facility.name().map(String::from),
            tags: facility.tags.clone(),
        },
    }
}

/// Distinct status per failure family; these must not collapse into one
/// generic error.
fn error_status(error: &SearchError) -> StatusCode {
    match error {
        SearchError::PlaceNotFound => StatusCode::NOT_FOUND,
        SearchError::Timeout => StatusCode::GATEWAY_TIMEOUT,
        SearchError::Superseded => StatusCode::CONFLICT,
        SearchError::Service(_) | SearchError::Transport(_) | SearchError::InvalidPayload(_) => {
            StatusCode::BAD_GATEWAY
        }
    }
}
