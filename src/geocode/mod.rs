//! Free-text place resolution via a Nominatim-compatible geocoder.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::models::{GeoBbox, GeoPoint};

/// Best-match resolution of a free-text place name.
#[derive(Debug, Clone)]
pub struct ResolvedPlace {
    pub point: GeoPoint,
    /// Extent of the match, used as a city-size proxy. Absent when the
    /// provider omitted it or returned something unusable.
    pub bbox: Option<GeoBbox>,
    pub label: String,
}

/// Resolves place names to coordinates.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn resolve(&self, place: &str) -> Result<ResolvedPlace, SearchError>;
}

/// Candidate as returned by the provider. Coordinates arrive as numeric
/// strings; `boundingbox` is `[south, north, west, east]`.
#[derive(Debug, Deserialize)]
struct Candidate {
    lat: String,
    lon: String,
    boundingbox: Option<Vec<String>>,
    display_name: Option<String>,
}

/// Geocoder backed by a Nominatim-compatible HTTP API.
///
/// Requests exactly one candidate; ranking among matches is the
/// provider's responsibility. No caching, no retries.
pub struct NominatimGeocoder {
    client: Client,
    search_url: Url,
    deadline: Duration,
}

impl NominatimGeocoder {
    pub fn new(config: &SearchConfig) -> Result<Self> {
        let search_url = Url::parse(&config.nominatim_url)?.join("search")?;
        let client = Client::builder().user_agent(&config.user_agent).build()?;

        Ok(Self {
            client,
            search_url,
            deadline: config.geocode_deadline(),
        })
    }

    async fn fetch(&self, place: &str) -> Result<ResolvedPlace, SearchError> {
        let response = self
            .client
            .get(self.search_url.clone())
            .query(&[("q", place), ("format", "jsonv2"), ("limit", "1")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Service(status.as_u16()));
        }

        let candidates: Vec<Candidate> = response.json().await?;
        best_match(candidates)
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn resolve(&self, place: &str) -> Result<ResolvedPlace, SearchError> {
        debug!(place, "resolving place name");
        match tokio::time::timeout(self.deadline, self.fetch(place)).await {
            Ok(result) => result,
            Err(_) => Err(SearchError::Timeout),
        }
    }
}

fn best_match(candidates: Vec<Candidate>) -> Result<ResolvedPlace, SearchError> {
    let candidate = candidates
        .into_iter()
        .next()
        .ok_or(SearchError::PlaceNotFound)?;
    resolve_candidate(candidate)
}

fn resolve_candidate(candidate: Candidate) -> Result<ResolvedPlace, SearchError> {
    let lat = parse_coord(&candidate.lat)?;
    let lon = parse_coord(&candidate.lon)?;
    let point = GeoPoint::new(lat, lon);
    if !point.is_valid() {
        return Err(SearchError::InvalidPayload(format!(
            "coordinates out of range: {}, {}",
            candidate.lat, candidate.lon
        )));
    }

    // A broken extent degrades to "no extent"; radius estimation falls
    // back to its default.
    let bbox = candidate.boundingbox.as_deref().and_then(parse_bbox);
    if candidate.boundingbox.is_some() && bbox.is_none() {
        debug!("discarding unusable boundingbox");
    }

    Ok(ResolvedPlace {
        point,
        bbox,
        label: candidate.display_name.unwrap_or_default(),
    })
}

fn parse_coord(raw: &str) -> Result<f64, SearchError> {
    raw.parse()
        .map_err(|_| SearchError::InvalidPayload(format!("unparsable coordinate: {raw}")))
}

/// Parse `[south, north, west, east]` numeric strings.
fn parse_bbox(raw: &[String]) -> Option<GeoBbox> {
    if raw.len() != 4 {
        return None;
    }
    let mut degrees = [0.0f64; 4];
    for (slot, value) in degrees.iter_mut().zip(raw) {
        *slot = value.parse().ok()?;
    }
    let bbox = GeoBbox::new(degrees[0], degrees[1], degrees[2], degrees[3]);
    bbox.is_valid().then_some(bbox)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(lat: &str, lon: &str, bbox: Option<Vec<&str>>) -> Candidate {
        Candidate {
            lat: lat.to_string(),
            lon: lon.to_string(),
            boundingbox: bbox.map(|b| b.into_iter().map(String::from).collect()),
            display_name: Some("Springfield, Illinois".to_string()),
        }
    }

    #[test]
    fn test_candidate_with_bbox() {
        let resolved = resolve_candidate(candidate(
            "39.78",
            "-89.65",
            Some(vec!["39.70", "39.85", "-89.70", "-89.55"]),
        ))
        .unwrap();

        assert_eq!(resolved.point, GeoPoint::new(39.78, -89.65));
        let bbox = resolved.bbox.unwrap();
        assert_eq!(bbox.south, 39.70);
        assert_eq!(bbox.east, -89.55);
        assert_eq!(resolved.label, "Springfield, Illinois");
    }

    #[test]
    fn test_unparsable_coordinate_is_invalid_payload() {
        let result = resolve_candidate(candidate("not-a-number", "-89.65", None));
        assert!(matches!(result, Err(SearchError::InvalidPayload(_))));
    }

    #[test]
    fn test_out_of_range_coordinate_is_invalid_payload() {
        let result = resolve_candidate(candidate("97.2", "-89.65", None));
        assert!(matches!(result, Err(SearchError::InvalidPayload(_))));
    }

    #[test]
    fn test_broken_bbox_degrades_to_none() {
        let resolved = resolve_candidate(candidate(
            "39.78",
            "-89.65",
            Some(vec!["39.70", "oops", "-89.70", "-89.55"]),
        ))
        .unwrap();
        assert!(resolved.bbox.is_none());

        let resolved =
            resolve_candidate(candidate("39.78", "-89.65", Some(vec!["39.70", "39.85"]))).unwrap();
        assert!(resolved.bbox.is_none());
    }

    #[test]
    fn test_zero_candidates_is_not_found() {
        assert!(matches!(best_match(vec![]), Err(SearchError::PlaceNotFound)));
    }
}
