//! Raw element normalization.

use std::collections::HashSet;

use tracing::debug;

use crate::models::{ElementKind, Facility, GeoPoint, RawElement};

/// Convert raw provider elements into canonical facility records.
///
/// Per element, independently: resolve the coordinate source (direct
/// coordinates for points, the center for areas), drop anything outside
/// legal coordinate ranges, carry tags through unchanged, and keep only
/// the first occurrence of each `(kind, id)`.
pub fn normalize(raw: Vec<RawElement>) -> Vec<Facility> {
    let mut seen: HashSet<(ElementKind, i64)> = HashSet::with_capacity(raw.len());
    let mut facilities = Vec::with_capacity(raw.len());

    for element in raw {
        let (kind, id, location, tags) = match element {
            RawElement::Point {
                kind,
                id,
                lat,
                lon,
                tags,
            } => (kind, id, GeoPoint::new(lat, lon), tags),
            RawElement::Area {
                kind,
                id,
                center,
                tags,
            } => (kind, id, center, tags),
        };

        if !location.is_valid() {
            debug!(%kind, id, lat = location.lat, lon = location.lon, "dropping element with invalid coordinates");
            continue;
        }

        // The source may return both a feature and a reference to it;
        // the first occurrence wins.
        if !seen.insert((kind, id)) {
            continue;
        }

        facilities.push(Facility::new(kind, id, location, tags));
    }

    facilities
}
