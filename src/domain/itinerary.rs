use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::domain::fare::{FareError, MAX_PASSENGERS, MIN_PASSENGERS};
use crate::entities::route::Route;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidPairReason {
    #[error("Pickup stop is not on this route")]
    PickupNotFound,
    #[error("Destination stop is not on this route")]
    DestinationNotFound,
    #[error("Destination must come after the pickup stop")]
    DestinationNotAfterPickup,
}

/// Zero-based positions of a validated pickup/destination pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StopPair {
    pub pickup_index: usize,
    pub destination_index: usize,
}

impl StopPair {
    pub fn stops_travelled(&self) -> usize {
        self.destination_index - self.pickup_index
    }
}

fn position<S: AsRef<str>>(stops: &[S], name: &str) -> Option<usize> {
    stops.iter().position(|s| s.as_ref() == name)
}

/// Check that `destination` strictly follows `pickup` in travel order.
pub fn validate_pair<S: AsRef<str>>(
    stops: &[S],
    pickup: &str,
    destination: &str,
) -> Result<StopPair, InvalidPairReason> {
    let pickup_index = position(stops, pickup).ok_or(InvalidPairReason::PickupNotFound)?;
    let destination_index =
        position(stops, destination).ok_or(InvalidPairReason::DestinationNotFound)?;

    if destination_index <= pickup_index {
        return Err(InvalidPairReason::DestinationNotAfterPickup);
    }

    Ok(StopPair {
        pickup_index,
        destination_index,
    })
}

/// Stops a rider boarding at `pickup` may travel to.
pub fn destinations_after<'a, S: AsRef<str>>(
    stops: &'a [S],
    pickup: &str,
) -> Result<&'a [S], InvalidPairReason> {
    let pickup_index = position(stops, pickup).ok_or(InvalidPairReason::PickupNotFound)?;
    Ok(&stops[pickup_index + 1..])
}

/// A rider's chosen route, stops and party size.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Itinerary {
    route: Arc<Route>,
    pickup_index: usize,
    destination_index: usize,
    passenger_count: u32,
}

impl Itinerary {
    pub fn new(
        route: Arc<Route>,
        pickup_index: usize,
        destination_index: usize,
        passenger_count: u32,
    ) -> Result<Self, FareError> {
        if pickup_index >= destination_index || destination_index >= route.stops.len() {
            return Err(FareError::InvalidItinerary(format!(
                "stops {pickup_index}..{destination_index} do not fit route {}",
                route.id
            )));
        }
        if !(MIN_PASSENGERS..=MAX_PASSENGERS).contains(&passenger_count) {
            return Err(FareError::InvalidItinerary(format!(
                "{passenger_count} passengers is outside {MIN_PASSENGERS}..={MAX_PASSENGERS}"
            )));
        }

        Ok(Self {
            route,
            pickup_index,
            destination_index,
            passenger_count,
        })
    }

    /// Resolve stop names against the route and build the itinerary.
    pub fn from_stops(
        route: Arc<Route>,
        pickup: &str,
        destination: &str,
        passenger_count: u32,
    ) -> Result<Self, ItineraryError> {
        let pair = validate_pair(&route.stops, pickup, destination)?;
        Ok(Self::new(
            route,
            pair.pickup_index,
            pair.destination_index,
            passenger_count,
        )?)
    }

    pub fn with_passengers(&self, passenger_count: u32) -> Result<Self, FareError> {
        Self::new(
            Arc::clone(&self.route),
            self.pickup_index,
            self.destination_index,
            passenger_count,
        )
    }

    pub fn route(&self) -> &Arc<Route> {
        &self.route
    }

    pub fn pickup_index(&self) -> usize {
        self.pickup_index
    }

    pub fn destination_index(&self) -> usize {
        self.destination_index
    }

    pub fn passenger_count(&self) -> u32 {
        self.passenger_count
    }

    pub fn pickup(&self) -> &str {
        &self.route.stops[self.pickup_index]
    }

    pub fn destination(&self) -> &str {
        &self.route.stops[self.destination_index]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ItineraryError {
    #[error(transparent)]
    Pair(#[from] InvalidPairReason),
    #[error(transparent)]
    Fare(#[from] FareError),
}

#[cfg(test)]
mod tests {
    use super::*;

    const STOPS: [&str; 4] = ["A", "B", "C", "D"];

    fn route() -> Arc<Route> {
        Arc::new(Route {
            id: "AC12".to_string(),
            name: "Test".to_string(),
            stops: STOPS.iter().map(|s| s.to_string()).collect(),
            departure_times: Vec::new(),
        })
    }

    #[test]
    fn test_valid_pair() {
        let pair = validate_pair(&STOPS, "B", "D").unwrap();

        assert_eq!(pair.pickup_index, 1);
        assert_eq!(pair.destination_index, 3);
        assert_eq!(pair.stops_travelled(), 2);
    }

    #[test]
    fn test_destination_before_pickup() {
        assert_eq!(
            validate_pair(&STOPS, "C", "B"),
            Err(InvalidPairReason::DestinationNotAfterPickup)
        );
    }

    #[test]
    fn test_destination_not_after_pickup_for_every_ordering() {
        for (p, pickup) in STOPS.iter().enumerate() {
            for (d, destination) in STOPS.iter().enumerate() {
                let result = validate_pair(&STOPS, pickup, destination);
                if d <= p {
                    assert_eq!(result, Err(InvalidPairReason::DestinationNotAfterPickup));
                } else {
                    assert!(result.is_ok());
                }
            }
        }
    }

    #[test]
    fn test_unknown_stops() {
        assert_eq!(
            validate_pair(&STOPS, "Z", "B"),
            Err(InvalidPairReason::PickupNotFound)
        );
        assert_eq!(
            validate_pair(&STOPS, "A", "Z"),
            Err(InvalidPairReason::DestinationNotFound)
        );
        // Pickup is checked first
        assert_eq!(
            validate_pair(&STOPS, "Y", "Z"),
            Err(InvalidPairReason::PickupNotFound)
        );
    }

    #[test]
    fn test_destinations_after() {
        assert_eq!(destinations_after(&STOPS, "B").unwrap(), &["C", "D"]);
        assert!(destinations_after(&STOPS, "D").unwrap().is_empty());
        assert_eq!(
            destinations_after(&STOPS, "Q"),
            Err(InvalidPairReason::PickupNotFound)
        );
    }

    #[test]
    fn test_itinerary_from_stops() {
        let itinerary = Itinerary::from_stops(route(), "A", "C", 2).unwrap();

        assert_eq!(itinerary.pickup(), "A");
        assert_eq!(itinerary.destination(), "C");
        assert_eq!(itinerary.passenger_count(), 2);
    }

    #[test]
    fn test_itinerary_rejects_bad_passenger_count() {
        assert!(matches!(
            Itinerary::from_stops(route(), "A", "C", 0),
            Err(ItineraryError::Fare(FareError::InvalidItinerary(_)))
        ));
        assert!(matches!(
            Itinerary::new(route(), 0, 1, 11),
            Err(FareError::InvalidItinerary(_))
        ));
    }

    #[test]
    fn test_itinerary_rejects_indices_outside_route() {
        assert!(Itinerary::new(route(), 2, 4, 1).is_err());
        assert!(Itinerary::new(route(), 2, 2, 1).is_err());
    }
}
