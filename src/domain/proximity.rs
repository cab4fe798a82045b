use serde::Serialize;

use crate::utils::geo::{distance_km, GeoPoint};

/// Anything that can be placed on the map.
pub trait Locatable {
    fn location(&self) -> GeoPoint;
}

impl Locatable for GeoPoint {
    fn location(&self) -> GeoPoint {
        *self
    }
}

/// An item annotated with its distance from the rider.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Nearby<T> {
    #[serde(flatten)]
    pub item: T,
    pub distance_km: f64,
}

/// Every item annotated with its distance from `origin`, closest first.
/// Equal distances keep their input order.
pub fn rank_by_distance<T: Locatable + Clone>(origin: GeoPoint, items: &[T]) -> Vec<Nearby<T>> {
    let mut ranked: Vec<Nearby<T>> = items
        .iter()
        .map(|item| Nearby {
            distance_km: distance_km(origin, item.location()),
            item: item.clone(),
        })
        .collect();

    // sort_by is stable
    ranked.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    ranked
}

/// Items within `radius_km` of `origin` (inclusive), closest first.
pub fn nearby<T: Locatable + Clone>(
    origin: GeoPoint,
    items: &[T],
    radius_km: f64,
) -> Vec<Nearby<T>> {
    let mut ranked = rank_by_distance(origin, items);
    ranked.retain(|n| n.distance_km <= radius_km);

    tracing::trace!(
        candidates = items.len(),
        kept = ranked.len(),
        radius_km,
        "Proximity filter applied"
    );

    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::vehicle::VehiclePosition;

    const ORIGIN: GeoPoint = GeoPoint::new(22.5726, 88.3639);

    fn vehicle(id: &str, lat: f64, lng: f64) -> VehiclePosition {
        VehiclePosition {
            vehicle_id: id.to_string(),
            position: GeoPoint::new(lat, lng),
        }
    }

    #[test]
    fn test_vehicle_at_origin_is_included() {
        let vehicles = vec![vehicle("AC12", ORIGIN.latitude, ORIGIN.longitude)];

        for radius in [0.001, 1.0, 20.0] {
            let result = nearby(ORIGIN, &vehicles, radius);
            assert_eq!(result.len(), 1);
            assert_eq!(result[0].distance_km, 0.0);
        }
    }

    #[test]
    fn test_filters_and_sorts_by_distance() {
        let vehicles = vec![
            vehicle("far", 22.66, 88.45),    // ~13 km
            vehicle("mid", 22.59, 88.3639),  // ~1.9 km
            vehicle("near", 22.575, 88.3639), // ~0.27 km
            vehicle("edge", 22.60, 88.3639), // ~3 km
        ];

        let result = nearby(ORIGIN, &vehicles, 5.0);
        let ids: Vec<&str> = result.iter().map(|n| n.item.vehicle_id.as_str()).collect();

        assert_eq!(ids, vec!["near", "mid", "edge"]);
        assert!(result.iter().all(|n| n.distance_km <= 5.0));
        assert!(result.windows(2).all(|w| w[0].distance_km <= w[1].distance_km));
    }

    #[test]
    fn test_equal_distances_keep_input_order() {
        let vehicles = vec![
            vehicle("second-far", 22.58, 88.3639),
            vehicle("b", 22.575, 88.3639),
            vehicle("a", 22.575, 88.3639),
            vehicle("c", 22.575, 88.3639),
        ];

        let result = nearby(ORIGIN, &vehicles, 2.0);
        let ids: Vec<&str> = result.iter().map(|n| n.item.vehicle_id.as_str()).collect();

        assert_eq!(ids, vec!["b", "a", "c", "second-far"]);
    }

    #[test]
    fn test_empty_input_yields_empty_output() {
        let vehicles: Vec<VehiclePosition> = Vec::new();
        assert!(nearby(ORIGIN, &vehicles, 5.0).is_empty());
    }

    #[test]
    fn test_rank_keeps_everything() {
        let vehicles = vec![
            vehicle("far", 23.5, 88.3639),
            vehicle("near", 22.575, 88.3639),
        ];

        let ranked = rank_by_distance(ORIGIN, &vehicles);

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].item.vehicle_id, "near");
        assert!(ranked[1].distance_km > 100.0);
    }
}
