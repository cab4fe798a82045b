use std::f64::consts::PI;
use std::sync::Arc;

use rand::Rng;

use crate::entities::route::{Route, RouteCatalog};
use crate::entities::vehicle::{ServiceStatus, VehiclePosition, VehicleSnapshot};
use crate::utils::geo::GeoPoint;

/// Roughly how many kilometres one degree of latitude spans.
const KM_PER_DEGREE: f64 = 111.0;

/// Source of live vehicle positions.
pub trait VehicleSource: Send + Sync {
    /// Latest snapshot of every vehicle. `near` is the rider's location when
    /// known, which sources are free to ignore.
    fn current_positions(&self, near: Option<GeoPoint>) -> Vec<VehicleSnapshot>;
}

/// Invents one bus per route on every call.
///
/// With a rider location the buses are scattered 0.5-2 km around it,
/// otherwise within about a kilometre of the city center.
#[derive(Debug, Clone)]
pub struct SimulatedFleet {
    catalog: Arc<RouteCatalog>,
    center: GeoPoint,
}

impl SimulatedFleet {
    pub fn new(catalog: Arc<RouteCatalog>, center: GeoPoint) -> Self {
        Self { catalog, center }
    }

    pub fn positions_with<R: Rng>(
        &self,
        rng: &mut R,
        near: Option<GeoPoint>,
    ) -> Vec<VehicleSnapshot> {
        self.catalog
            .all()
            .iter()
            .filter(|route| !route.stops.is_empty())
            .map(|route| self.simulate(rng, route, near))
            .collect()
    }

    fn simulate<R: Rng>(
        &self,
        rng: &mut R,
        route: &Route,
        near: Option<GeoPoint>,
    ) -> VehicleSnapshot {
        let position = match near {
            Some(rider) => {
                let distance = rng.gen_range(0.5..2.0);
                let bearing = rng.gen_range(0.0..2.0 * PI);
                offset(rider, distance, bearing)
            }
            None => GeoPoint::new(
                self.center.latitude + rng.gen_range(-0.01..0.01),
                self.center.longitude + rng.gen_range(-0.01..0.01),
            ),
        };

        let (current_stop, next_stop) = if route.stops.len() < 2 {
            (route.stops[0].clone(), route.stops[0].clone())
        } else {
            let at = rng.gen_range(0..route.stops.len() - 1);
            (route.stops[at].clone(), route.stops[at + 1].clone())
        };

        let status = if rng.gen_bool(0.8) {
            ServiceStatus::OnTime
        } else {
            ServiceStatus::SlightDelay
        };

        VehicleSnapshot {
            position: VehiclePosition {
                vehicle_id: route.id.clone(),
                position,
            },
            route_id: route.id.clone(),
            route_name: route.name.clone(),
            current_stop,
            next_stop,
            eta_minutes: rng.gen_range(0..15),
            status,
            occupancy_percent: rng.gen_range(0..80),
        }
    }
}

impl VehicleSource for SimulatedFleet {
    fn current_positions(&self, near: Option<GeoPoint>) -> Vec<VehicleSnapshot> {
        let vehicles = self.positions_with(&mut rand::thread_rng(), near);
        tracing::debug!(
            count = vehicles.len(),
            located = near.is_some(),
            "Simulated fleet refreshed"
        );
        vehicles
    }
}

/// Move `distance_km` from `origin` along `bearing` (radians from north),
/// using a flat-earth approximation that is fine for a few kilometres.
fn offset(origin: GeoPoint, distance_km: f64, bearing: f64) -> GeoPoint {
    let lat_offset = distance_km / KM_PER_DEGREE * bearing.cos();
    let lng_offset =
        distance_km / (KM_PER_DEGREE * origin.latitude.to_radians().cos()) * bearing.sin();

    GeoPoint::new(origin.latitude + lat_offset, origin.longitude + lng_offset)
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::utils::geo::distance_km;

    const KOLKATA: GeoPoint = GeoPoint::new(22.5726, 88.3639);

    fn fleet() -> SimulatedFleet {
        let routes = (1..=20)
            .map(|n| Route {
                id: format!("{n}"),
                name: format!("Route {n}"),
                stops: vec!["A".into(), "B".into(), "C".into()],
                departure_times: Vec::new(),
            })
            .collect();
        SimulatedFleet::new(Arc::new(RouteCatalog::new(routes).unwrap()), KOLKATA)
    }

    #[test]
    fn test_one_vehicle_per_route() {
        let mut rng = StdRng::seed_from_u64(7);
        let vehicles = fleet().positions_with(&mut rng, None);

        assert_eq!(vehicles.len(), 20);
        assert_eq!(vehicles[0].position.vehicle_id, "1");
    }

    #[test]
    fn test_vehicles_surround_rider() {
        let rider = GeoPoint::new(22.60, 88.40);
        let mut rng = StdRng::seed_from_u64(42);

        for vehicle in fleet().positions_with(&mut rng, Some(rider)) {
            let d = distance_km(rider, vehicle.position.position);
            // Flat-earth offsets drift a little from true distance
            assert!(d > 0.45 && d < 2.1, "vehicle {d} km away");
        }
    }

    #[test]
    fn test_vehicles_near_center_without_rider() {
        let mut rng = StdRng::seed_from_u64(3);

        for vehicle in fleet().positions_with(&mut rng, None) {
            let p = vehicle.position.position;
            assert!((p.latitude - KOLKATA.latitude).abs() <= 0.010_001);
            assert!((p.longitude - KOLKATA.longitude).abs() <= 0.010_001);
        }
    }

    #[test]
    fn test_next_stop_follows_current() {
        let mut rng = StdRng::seed_from_u64(11);

        for vehicle in fleet().positions_with(&mut rng, None) {
            let pair = (vehicle.current_stop.as_str(), vehicle.next_stop.as_str());
            assert!(pair == ("A", "B") || pair == ("B", "C"));
            assert!(vehicle.eta_minutes < 15);
            assert!(vehicle.occupancy_percent < 80);
        }
    }
}
