//! Distance ranking of normalized facilities.

use geo::{Distance, Euclidean, Point};

use crate::models::{Facility, GeoPoint};

/// Order facilities nearest-first from the search origin.
///
/// Distance is planar, in degree space — an approximation, acceptable
/// only because search radii are bounded to tens of kilometres. Ties
/// break by ascending id, then geometry kind, for determinism.
pub fn rank(facilities: Vec<Facility>, origin: GeoPoint) -> Vec<Facility> {
    let origin = Point::new(origin.lon, origin.lat);

    let mut keyed: Vec<(f64, Facility)> = facilities
        .into_iter()
        .map(|facility| {
            let point = Point::new(facility.location.lon, facility.location.lat);
            (Euclidean.distance(origin, point), facility)
        })
        .collect();

    keyed.sort_by(|(da, a), (db, b)| {
        da.total_cmp(db)
            .then_with(|| a.id.cmp(&b.id))
            .then_with(|| a.kind.cmp(&b.kind))
    });

    keyed.into_iter().map(|(_, facility)| facility).collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::models::ElementKind;

    fn facility(id: i64, lat: f64, lon: f64) -> Facility {
        Facility::new(ElementKind::Node, id, GeoPoint::new(lat, lon), HashMap::new())
    }

    #[test]
    fn test_nearest_first() {
        let origin = GeoPoint::new(0.0, 0.0);
        let ranked = rank(
            vec![
                facility(1, 3.0, 0.0),
                facility(2, 1.0, 0.0),
                facility(3, 0.0, 2.0),
            ],
            origin,
        );

        let ids: Vec<i64> = ranked.iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn test_equal_distance_breaks_ties_by_id() {
        let origin = GeoPoint::new(0.0, 0.0);
        let ranked = rank(vec![facility(9, 1.0, 0.0), facility(4, 0.0, 1.0)], origin);

        let ids: Vec<i64> = ranked.iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![4, 9]);
    }

    #[test]
    fn test_equal_distance_and_id_breaks_ties_by_kind() {
        let origin = GeoPoint::new(0.0, 0.0);
        let way = Facility::new(
            ElementKind::Way,
            7,
            GeoPoint::new(1.0, 0.0),
            HashMap::new(),
        );
        let node = facility(7, 0.0, 1.0);

        let ranked = rank(vec![way, node], origin);
        assert_eq!(ranked[0].kind, ElementKind::Node);
        assert_eq!(ranked[1].kind, ElementKind::Way);
    }

    #[test]
    fn test_input_order_does_not_leak_into_output() {
        let origin = GeoPoint::new(0.0, 0.0);
        let forward = rank(
            vec![facility(1, 2.0, 0.0), facility(2, 1.0, 0.0)],
            origin,
        );
        let reversed = rank(
            vec![facility(2, 1.0, 0.0), facility(1, 2.0, 0.0)],
            origin,
        );

        assert_eq!(forward, reversed);
    }
}
