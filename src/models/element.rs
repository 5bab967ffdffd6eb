//! Raw elements returned by the spatial POI provider.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::geo::GeoPoint;

/// Geometry kind of a provider element
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Node,
    Way,
    Relation,
}

impl std::fmt::Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ElementKind::Node => write!(f, "node"),
            ElementKind::Way => write!(f, "way"),
            ElementKind::Relation => write!(f, "relation"),
        }
    }
}

/// A raw provider element with its geometry shape resolved.
///
/// The provider mixes point features (direct coordinates) and area
/// features (a representative center). The distinction is made once at
/// the wire boundary; downstream code never probes optional fields.
#[derive(Debug, Clone, PartialEq)]
pub enum RawElement {
    Point {
        kind: ElementKind,
        id: i64,
        lat: f64,
        lon: f64,
        tags: HashMap<String, String>,
    },
    Area {
        kind: ElementKind,
        id: i64,
        center: GeoPoint,
        tags: HashMap<String, String>,
    },
}
