//! Pipeline configuration.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Configuration for the search pipeline.
///
/// Defaults target the public OSM services; a TOML file or CLI flags can
/// override any field.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Geocoding service base URL (Nominatim-compatible)
    pub nominatim_url: String,

    /// POI service base URL (Overpass-compatible)
    pub overpass_url: String,

    /// Client identification sent with every request, required by the
    /// providers' usage policies
    pub user_agent: String,

    /// Amenity categories to search
    pub categories: Vec<String>,

    /// Client-side deadline for one geocoding call, seconds
    pub geocode_deadline_secs: u64,

    /// Client-side deadline for one POI query, seconds
    pub query_deadline_secs: u64,

    /// Server-side processing allowance for POI queries, seconds.
    /// Kept above the client deadline.
    pub overpass_server_timeout_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            nominatim_url: "https://nominatim.openstreetmap.org".to_string(),
            overpass_url: "https://overpass-api.de".to_string(),
            user_agent: "Tamarack/0.1 (facility search; https://github.com/example/tamarack)"
                .to_string(),
            categories: vec![
                "hospital".to_string(),
                "clinic".to_string(),
                "doctors".to_string(),
            ],
            geocode_deadline_secs: 10,
            query_deadline_secs: 20,
            overpass_server_timeout_secs: 25,
        }
    }
}

impl SearchConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config: SearchConfig = toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }

    pub fn geocode_deadline(&self) -> Duration {
        Duration::from_secs(self.geocode_deadline_secs)
    }

    pub fn query_deadline(&self) -> Duration {
        Duration::from_secs(self.query_deadline_secs)
    }
}
