//! Search radius heuristics.
//!
//! The tier table below is the single source of truth for mapping a
//! geocoding match's extent to an initial radius.

use crate::models::GeoBbox;

/// Radius used when the geocoder returned no usable extent.
pub const DEFAULT_RADIUS_M: u32 = 15_000;

/// Upper bound for any search radius.
pub const MAX_RADIUS_M: u32 = 50_000;

/// Extent area (square degrees) to radius, highest threshold first.
const AREA_TIERS: &[(f64, u32)] = &[(1.0, 50_000), (0.5, 30_000), (0.1, 20_000), (0.01, 10_000)];

/// Radius for extents below every tier threshold.
const MIN_TIER_RADIUS_M: u32 = 5_000;

/// Derive the initial search radius from a match extent.
///
/// The extent area is a crude, non-geodesic proxy for city size.
pub fn initial_radius(bbox: Option<&GeoBbox>) -> u32 {
    let Some(bbox) = bbox else {
        return DEFAULT_RADIUS_M;
    };

    let area = bbox.area_deg2();
    for (threshold, radius) in AREA_TIERS {
        if area > *threshold {
            return *radius;
        }
    }
    MIN_TIER_RADIUS_M
}

/// Build the expanding retry ladder for an initial radius.
///
/// Rungs are `[r0, min(2·r0, max), max]`, non-decreasing, with adjacent
/// duplicates collapsed.
pub fn ladder(initial: u32) -> Vec<u32> {
    let rungs = [
        initial.min(MAX_RADIUS_M),
        initial.saturating_mul(2).min(MAX_RADIUS_M),
        MAX_RADIUS_M,
    ];

    let mut out = Vec::with_capacity(rungs.len());
    for rung in rungs {
        if out.last() != Some(&rung) {
            out.push(rung);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bbox_with_area(side: f64) -> GeoBbox {
        GeoBbox::new(0.0, side, 0.0, 1.0)
    }

    #[test]
    fn test_absent_extent_uses_default() {
        assert_eq!(initial_radius(None), DEFAULT_RADIUS_M);
    }

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(initial_radius(Some(&bbox_with_area(1.5))), 50_000);
        // Thresholds are strict: an area exactly at a boundary falls
        // into the tier below it.
        assert_eq!(initial_radius(Some(&bbox_with_area(1.0))), 30_000);
        assert_eq!(initial_radius(Some(&bbox_with_area(0.7))), 30_000);
        assert_eq!(initial_radius(Some(&bbox_with_area(0.5))), 20_000);
        assert_eq!(initial_radius(Some(&bbox_with_area(0.2))), 20_000);
        assert_eq!(initial_radius(Some(&bbox_with_area(0.05))), 10_000);
        assert_eq!(initial_radius(Some(&bbox_with_area(0.001))), 5_000);
    }

    #[test]
    fn test_radius_is_monotonic_in_area() {
        let areas = [0.0, 0.005, 0.02, 0.09, 0.3, 0.6, 0.99, 1.01, 2.0];
        let radii: Vec<u32> = areas
            .iter()
            .map(|side| initial_radius(Some(&bbox_with_area(*side))))
            .collect();

        for pair in radii.windows(2) {
            assert!(pair[0] <= pair[1], "radii not monotonic: {radii:?}");
        }
    }

    #[test]
    fn test_springfield_extent_maps_to_ten_kilometres() {
        let bbox = GeoBbox::new(39.70, 39.85, -89.70, -89.55);
        assert_eq!(initial_radius(Some(&bbox)), 10_000);
    }

    #[test]
    fn test_ladder_expands_and_caps() {
        assert_eq!(ladder(10_000), vec![10_000, 20_000, 50_000]);
        assert_eq!(ladder(5_000), vec![5_000, 10_000, 50_000]);
    }

    #[test]
    fn test_ladder_collapses_duplicate_rungs() {
        assert_eq!(ladder(30_000), vec![30_000, 50_000]);
        assert_eq!(ladder(50_000), vec![50_000]);
    }
}
