use std::fmt;

use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::domain::itinerary::Itinerary;

pub const MIN_PASSENGERS: u32 = 1;
pub const MAX_PASSENGERS: u32 = 10;

/// Route ids starting with this marker run air-conditioned coaches.
pub const PREMIUM_ROUTE_PREFIX: &str = "AC";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FareError {
    #[error("Invalid itinerary: {0}")]
    InvalidItinerary(String),
}

/// An amount of money in minor units (paise).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(u64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_minor(minor: u64) -> Self {
        Money(minor)
    }

    pub const fn from_major(major: u64) -> Self {
        Money(major * 100)
    }

    pub fn minor_units(self) -> u64 {
        self.0
    }

    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    pub fn checked_mul(self, factor: u64) -> Option<Money> {
        self.0.checked_mul(factor).map(Money)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Per-stop pricing rule selected by route category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FareClass {
    Premium,
    Standard,
}

impl FareClass {
    pub fn for_route(route_id: &str) -> Self {
        if route_id.starts_with(PREMIUM_ROUTE_PREFIX) {
            FareClass::Premium
        } else {
            FareClass::Standard
        }
    }

    fn flag_fall(self) -> Money {
        match self {
            FareClass::Premium => Money::from_major(20),
            FareClass::Standard => Money::from_major(10),
        }
    }

    fn per_stop(self) -> Money {
        match self {
            FareClass::Premium => Money::from_major(5),
            FareClass::Standard => Money::from_major(3),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FareQuote {
    pub fare_class: FareClass,
    pub stops_travelled: u64,
    pub base_fare_per_passenger: Money,
    pub passenger_count: u32,
    pub total_fare: Money,
}

fn invalid(message: impl Into<String>) -> FareError {
    FareError::InvalidItinerary(message.into())
}

/// Price a trip of `destination_index - pickup_index` stops for a party.
pub fn quote(
    route_id: &str,
    pickup_index: usize,
    destination_index: usize,
    passenger_count: u32,
) -> Result<FareQuote, FareError> {
    if pickup_index >= destination_index {
        return Err(invalid(format!(
            "destination stop {destination_index} does not follow pickup stop {pickup_index}"
        )));
    }
    if !(MIN_PASSENGERS..=MAX_PASSENGERS).contains(&passenger_count) {
        return Err(invalid(format!(
            "{passenger_count} passengers is outside {MIN_PASSENGERS}..={MAX_PASSENGERS}"
        )));
    }

    let fare_class = FareClass::for_route(route_id);
    let stops_travelled = (destination_index - pickup_index) as u64;

    let base_fare_per_passenger = fare_class
        .per_stop()
        .checked_mul(stops_travelled)
        .and_then(|distance_fare| distance_fare.checked_add(fare_class.flag_fall()))
        .ok_or_else(|| invalid("fare overflows"))?;
    let total_fare = base_fare_per_passenger
        .checked_mul(u64::from(passenger_count))
        .ok_or_else(|| invalid("fare overflows"))?;

    Ok(FareQuote {
        fare_class,
        stops_travelled,
        base_fare_per_passenger,
        passenger_count,
        total_fare,
    })
}

/// Quote an already validated itinerary.
pub fn quote_itinerary(itinerary: &Itinerary) -> Result<FareQuote, FareError> {
    quote(
        &itinerary.route().id,
        itinerary.pickup_index(),
        itinerary.destination_index(),
        itinerary.passenger_count(),
    )
}
