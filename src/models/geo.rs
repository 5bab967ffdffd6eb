//! Geographic value types shared across the pipeline.

use serde::{Deserialize, Serialize};

/// Geographic point (lat/lon)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Whether both coordinates are finite and within legal WGS84 ranges.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

/// Bounding box extent in degrees, as returned alongside a geocoding match.
///
/// Only ever produced by the geocoder and consumed by radius estimation,
/// where its area serves as a crude city-size proxy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBbox {
    pub south: f64,
    pub north: f64,
    pub west: f64,
    pub east: f64,
}

impl GeoBbox {
    pub fn new(south: f64, north: f64, west: f64, east: f64) -> Self {
        Self {
            south,
            north,
            west,
            east,
        }
    }

    /// Extent area in square degrees. Not a geodesic area.
    pub fn area_deg2(&self) -> f64 {
        (self.north - self.south).abs() * (self.east - self.west).abs()
    }

    pub fn is_valid(&self) -> bool {
        self.south.is_finite()
            && self.north.is_finite()
            && self.west.is_finite()
            && self.east.is_finite()
            && (-90.0..=90.0).contains(&self.south)
            && (-90.0..=90.0).contains(&self.north)
            && (-180.0..=180.0).contains(&self.west)
            && (-180.0..=180.0).contains(&self.east)
    }
}
