//! Tamarack - nearby medical facility search
//!
//! Resolves a free-text place name to coordinates, derives a search
//! radius from the match's extent, then widens a category POI query
//! until facilities are found, normalizing, deduplicating and ranking
//! the results. This library provides the pipeline; the `server` binary
//! exposes it over HTTP.

pub mod config;
pub mod error;
pub mod geocode;
pub mod models;
pub mod overpass;
pub mod search;

pub use config::SearchConfig;
pub use error::SearchError;
pub use models::{ElementKind, Facility, GeoBbox, GeoPoint, RawElement};
pub use search::{SearchCoordinator, SearchOrchestrator, SearchOutcome};
