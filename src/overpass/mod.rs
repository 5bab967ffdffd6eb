//! Radius-bounded POI queries against an Overpass-compatible API.
//!
//! One query program covers every requested category, with `out center;`
//! so area features arrive with a representative coordinate.

use std::collections::HashMap;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::models::{ElementKind, GeoPoint, RawElement};

/// Executes a single radius-bounded category query.
///
/// Implementations are stateless and never retry internally; widening
/// and retries belong to the orchestrator.
#[async_trait]
pub trait PoiClient: Send + Sync {
    async fn query(
        &self,
        origin: GeoPoint,
        radius_m: u32,
        categories: &[String],
        deadline: Duration,
    ) -> Result<Vec<RawElement>, SearchError>;
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    elements: Vec<WireElement>,
}

/// Provider element before geometry resolution.
#[derive(Debug, Deserialize)]
struct WireElement {
    #[serde(rename = "type")]
    kind: String,
    id: i64,
    lat: Option<f64>,
    lon: Option<f64>,
    center: Option<WireCenter>,
    #[serde(default)]
    tags: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct WireCenter {
    lat: f64,
    lon: f64,
}

impl WireElement {
    /// Resolve the element's geometry shape, or drop it.
    ///
    /// Point features carry direct coordinates, area features a center;
    /// an element with neither is unusable.
    fn into_raw(self) -> Option<RawElement> {
        let kind = match self.kind.as_str() {
            "node" => ElementKind::Node,
            "way" => ElementKind::Way,
            "relation" => ElementKind::Relation,
            other => {
                debug!(kind = other, id = self.id, "skipping element of unknown kind");
                return None;
            }
        };

        match (self.lat, self.lon, self.center) {
            (Some(lat), Some(lon), _) => Some(RawElement::Point {
                kind,
                id: self.id,
                lat,
                lon,
                tags: self.tags,
            }),
            (_, _, Some(center)) => Some(RawElement::Area {
                kind,
                id: self.id,
                center: GeoPoint::new(center.lat, center.lon),
                tags: self.tags,
            }),
            _ => {
                debug!(%kind, id = self.id, "skipping element without usable geometry");
                None
            }
        }
    }
}

/// POI client backed by an Overpass-compatible HTTP API.
pub struct OverpassClient {
    client: Client,
    interpreter_url: Url,
    server_timeout_secs: u64,
}

impl OverpassClient {
    pub fn new(config: &SearchConfig) -> Result<Self> {
        let interpreter_url = Url::parse(&config.overpass_url)?.join("api/interpreter")?;
        let client = Client::builder().user_agent(&config.user_agent).build()?;

        Ok(Self {
            client,
            interpreter_url,
            server_timeout_secs: config.overpass_server_timeout_secs,
        })
    }

    async fn fetch(&self, program: String) -> Result<Vec<RawElement>, SearchError> {
        let response = self
            .client
            .post(self.interpreter_url.clone())
            .form(&[("data", program)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Service(status.as_u16()));
        }

        // Zero matches is a successful, empty response, never an error.
        let body: QueryResponse = response.json().await?;
        Ok(body
            .elements
            .into_iter()
            .filter_map(WireElement::into_raw)
            .collect())
    }
}

#[async_trait]
impl PoiClient for OverpassClient {
    async fn query(
        &self,
        origin: GeoPoint,
        radius_m: u32,
        categories: &[String],
        deadline: Duration,
    ) -> Result<Vec<RawElement>, SearchError> {
        let program = build_program(origin, radius_m, categories, self.server_timeout_secs);
        debug!(radius_m, %program, "querying POI service");

        match tokio::time::timeout(deadline, self.fetch(program)).await {
            Ok(result) => result,
            Err(_) => Err(SearchError::Timeout),
        }
    }
}

/// Build one query program covering every category, each over all three
/// geometry shapes. The client-side deadline stays below the server
/// allowance written into the program header.
fn build_program(
    origin: GeoPoint,
    radius_m: u32,
    categories: &[String],
    server_timeout_secs: u64,
) -> String {
    use std::fmt::Write;

    let mut program = format!("[out:json][timeout:{server_timeout_secs}];(");
    for category in categories {
        for shape in ["node", "way", "relation"] {
            let _ = write!(
                program,
                "{shape}[\"amenity\"=\"{category}\"](around:{radius_m},{lat},{lon});",
                lat = origin.lat,
                lon = origin.lon,
            );
        }
    }
    program.push_str(");out center;");
    program
}
