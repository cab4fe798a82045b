use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::fare::{
    quote_itinerary, FareError, FareQuote, Money, MAX_PASSENGERS, MIN_PASSENGERS,
};
use crate::domain::itinerary::{InvalidPairReason, Itinerary, ItineraryError};
use crate::entities::payment::{PaymentMethod, PaymentReceipt};
use crate::entities::route::Route;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookingError {
    #[error(transparent)]
    InvalidPair(#[from] InvalidPairReason),
    #[error(transparent)]
    Fare(#[from] FareError),
    #[error("Route {0} needs at least two stops and one departure")]
    RouteNotBookable(String),
    #[error("Route {route} has no departure at {departure}")]
    UnknownDeparture { route: String, departure: String },
    #[error("Cannot {event} while {step}")]
    OutOfOrder {
        event: &'static str,
        step: &'static str,
    },
    #[error("Booking has already been paid")]
    AlreadySettled,
    #[error("Payment of {paid} does not match the fare of {due}")]
    AmountMismatch { paid: Money, due: Money },
    #[error("Payment was made by {paid:?} but {chosen:?} is selected")]
    MethodMismatch {
        paid: PaymentMethod,
        chosen: PaymentMethod,
    },
    #[error("Receipt belongs to booking {receipt}, not {booking}")]
    ForeignReceipt { booking: Uuid, receipt: Uuid },
}

impl From<ItineraryError> for BookingError {
    fn from(err: ItineraryError) -> Self {
        match err {
            ItineraryError::Pair(reason) => BookingError::InvalidPair(reason),
            ItineraryError::Fare(err) => BookingError::Fare(err),
        }
    }
}

impl BookingError {
    /// Stable machine-readable code for clients.
    pub fn code(&self) -> &'static str {
        match self {
            BookingError::InvalidPair(InvalidPairReason::PickupNotFound) => "pickup_not_found",
            BookingError::InvalidPair(InvalidPairReason::DestinationNotFound) => {
                "destination_not_found"
            }
            BookingError::InvalidPair(InvalidPairReason::DestinationNotAfterPickup) => {
                "destination_not_after_pickup"
            }
            BookingError::Fare(FareError::InvalidItinerary(_)) => "invalid_itinerary",
            BookingError::RouteNotBookable(_) => "route_not_bookable",
            BookingError::UnknownDeparture { .. } => "unknown_departure",
            BookingError::OutOfOrder { .. } => "out_of_order",
            BookingError::AlreadySettled => "already_settled",
            BookingError::AmountMismatch { .. } => "amount_mismatch",
            BookingError::MethodMismatch { .. } => "method_mismatch",
            BookingError::ForeignReceipt { .. } => "foreign_receipt",
        }
    }
}

/// An itinerary that has a departure and a fare attached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricedTrip {
    pub itinerary: Itinerary,
    pub departure: String,
    pub quote: FareQuote,
}

impl PricedTrip {
    fn new(itinerary: Itinerary, departure: String) -> Result<Self, FareError> {
        let quote = quote_itinerary(&itinerary)?;
        Ok(Self {
            itinerary,
            departure,
            quote,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum BookingState {
    SelectingRoute {
        passengers: u32,
    },
    SelectingPickup {
        route: Arc<Route>,
        passengers: u32,
    },
    SelectingDestination {
        route: Arc<Route>,
        pickup: String,
        passengers: u32,
    },
    SelectingTime {
        itinerary: Itinerary,
    },
    QuoteShown {
        trip: PricedTrip,
    },
    PaymentMethodChosen {
        trip: PricedTrip,
        method: PaymentMethod,
    },
    PaymentSettled {
        trip: PricedTrip,
        method: PaymentMethod,
        receipt: PaymentReceipt,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum BookingEvent {
    SelectRoute(Arc<Route>),
    SelectPickup(String),
    SelectDestination(String),
    SelectDeparture(String),
    SetPassengers(u32),
    ChoosePaymentMethod(PaymentMethod),
    /// The provider's receipt for the session `booking_id`.
    PaymentSettled {
        booking_id: Uuid,
        receipt: PaymentReceipt,
    },
    /// Leave the fare screen, keeping the stop selections.
    BackToBooking,
    Reset,
}

impl BookingEvent {
    fn name(&self) -> &'static str {
        match self {
            BookingEvent::SelectRoute(_) => "select a route",
            BookingEvent::SelectPickup(_) => "select a pickup stop",
            BookingEvent::SelectDestination(_) => "select a destination",
            BookingEvent::SelectDeparture(_) => "select a departure",
            BookingEvent::SetPassengers(_) => "change passengers",
            BookingEvent::ChoosePaymentMethod(_) => "choose a payment method",
            BookingEvent::PaymentSettled { .. } => "settle payment",
            BookingEvent::BackToBooking => "go back to booking",
            BookingEvent::Reset => "reset",
        }
    }
}

/// Outcome of applying one event. The state is always the one to keep,
/// even when the event was rejected.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: BookingState,
    pub rejection: Option<BookingError>,
}

impl Transition {
    fn accept(state: BookingState) -> Self {
        Self {
            state,
            rejection: None,
        }
    }

    fn reject(state: BookingState, error: impl Into<BookingError>) -> Self {
        Self {
            state,
            rejection: Some(error.into()),
        }
    }
}

impl Default for BookingState {
    fn default() -> Self {
        BookingState::SelectingRoute {
            passengers: MIN_PASSENGERS,
        }
    }
}

impl BookingState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> &'static str {
        match self {
            BookingState::SelectingRoute { .. } => "selecting_route",
            BookingState::SelectingPickup { .. } => "selecting_pickup",
            BookingState::SelectingDestination { .. } => "selecting_destination",
            BookingState::SelectingTime { .. } => "selecting_time",
            BookingState::QuoteShown { .. } => "quote_shown",
            BookingState::PaymentMethodChosen { .. } => "payment_method_chosen",
            BookingState::PaymentSettled { .. } => "payment_settled",
        }
    }

    pub fn passengers(&self) -> u32 {
        match self {
            BookingState::SelectingRoute { passengers }
            | BookingState::SelectingPickup { passengers, .. }
            | BookingState::SelectingDestination { passengers, .. } => *passengers,
            BookingState::SelectingTime { itinerary } => itinerary.passenger_count(),
            BookingState::QuoteShown { trip }
            | BookingState::PaymentMethodChosen { trip, .. }
            | BookingState::PaymentSettled { trip, .. } => trip.itinerary.passenger_count(),
        }
    }

    pub fn itinerary(&self) -> Option<&Itinerary> {
        match self {
            BookingState::SelectingTime { itinerary } => Some(itinerary),
            BookingState::QuoteShown { trip }
            | BookingState::PaymentMethodChosen { trip, .. }
            | BookingState::PaymentSettled { trip, .. } => Some(&trip.itinerary),
            _ => None,
        }
    }

    pub fn route(&self) -> Option<&Arc<Route>> {
        match self {
            BookingState::SelectingRoute { .. } => None,
            BookingState::SelectingPickup { route, .. }
            | BookingState::SelectingDestination { route, .. } => Some(route),
            _ => self.itinerary().map(Itinerary::route),
        }
    }

    pub fn pickup(&self) -> Option<&str> {
        match self {
            BookingState::SelectingDestination { pickup, .. } => Some(pickup),
            _ => self.itinerary().map(Itinerary::pickup),
        }
    }

    pub fn destination(&self) -> Option<&str> {
        self.itinerary().map(Itinerary::destination)
    }

    pub fn quote(&self) -> Option<&FareQuote> {
        match self {
            BookingState::QuoteShown { trip }
            | BookingState::PaymentMethodChosen { trip, .. }
            | BookingState::PaymentSettled { trip, .. } => Some(&trip.quote),
            _ => None,
        }
    }

    pub fn is_settled(&self) -> bool {
        matches!(self, BookingState::PaymentSettled { .. })
    }

    /// Advance the flow by one event.
    pub fn apply(self, event: BookingEvent) -> Transition {
        if self.is_settled() && event != BookingEvent::Reset {
            return Transition::reject(self, BookingError::AlreadySettled);
        }

        match event {
            BookingEvent::Reset => Transition::accept(BookingState::new()),
            BookingEvent::SelectRoute(route) => self.select_route(route),
            BookingEvent::SelectPickup(stop) => self.select_pickup(stop),
            BookingEvent::SelectDestination(stop) => self.select_destination(stop),
            BookingEvent::SelectDeparture(label) => self.select_departure(label),
            BookingEvent::SetPassengers(count) => self.set_passengers(count),
            BookingEvent::ChoosePaymentMethod(method) => self.choose_method(method),
            BookingEvent::PaymentSettled {
                booking_id,
                receipt,
            } => self.settle(booking_id, receipt),
            BookingEvent::BackToBooking => self.back_to_booking(),
        }
    }

    fn out_of_order(self, event: &BookingEvent) -> Transition {
        let step = self.step();
        Transition::reject(
            self,
            BookingError::OutOfOrder {
                event: event.name(),
                step,
            },
        )
    }

    fn select_route(self, route: Arc<Route>) -> Transition {
        if !route.is_bookable() {
            let id = route.id.clone();
            return Transition::reject(self, BookingError::RouteNotBookable(id));
        }

        Transition::accept(BookingState::SelectingPickup {
            passengers: self.passengers(),
            route,
        })
    }

    fn select_pickup(self, pickup: String) -> Transition {
        let Some(route) = self.route().cloned() else {
            return self.out_of_order(&BookingEvent::SelectPickup(pickup));
        };
        let passengers = self.passengers();

        if !route.stops.contains(&pickup) {
            return Transition::reject(
                BookingState::SelectingPickup { route, passengers },
                InvalidPairReason::PickupNotFound,
            );
        }

        // A destination that still lies ahead of the new pickup is kept
        if let Some(destination) = self.destination() {
            if let Ok(itinerary) =
                Itinerary::from_stops(Arc::clone(&route), &pickup, destination, passengers)
            {
                return Transition::accept(BookingState::SelectingTime { itinerary });
            }
        }

        Transition::accept(BookingState::SelectingDestination {
            route,
            pickup,
            passengers,
        })
    }

    fn select_destination(self, destination: String) -> Transition {
        let (Some(route), Some(pickup)) = (self.route().cloned(), self.pickup().map(str::to_owned))
        else {
            return self.out_of_order(&BookingEvent::SelectDestination(destination));
        };
        let passengers = self.passengers();

        match Itinerary::from_stops(Arc::clone(&route), &pickup, &destination, passengers) {
            Ok(itinerary) => Transition::accept(BookingState::SelectingTime { itinerary }),
            Err(err) => Transition::reject(
                BookingState::SelectingDestination {
                    route,
                    pickup,
                    passengers,
                },
                err,
            ),
        }
    }

    fn select_departure(self, departure: String) -> Transition {
        let Some(route) = self.itinerary().map(|i| Arc::clone(i.route())) else {
            return self.out_of_order(&BookingEvent::SelectDeparture(departure));
        };

        if !route.has_departure(&departure) {
            let route = route.id.clone();
            return Transition::reject(
                self,
                BookingError::UnknownDeparture { route, departure },
            );
        }

        match self {
            BookingState::SelectingTime { itinerary } => {
                match PricedTrip::new(itinerary.clone(), departure) {
                    Ok(trip) => Transition::accept(BookingState::QuoteShown { trip }),
                    Err(err) => Transition::reject(BookingState::SelectingTime { itinerary }, err),
                }
            }
            // Departure does not affect the fare
            BookingState::QuoteShown { trip } => Transition::accept(BookingState::QuoteShown {
                trip: PricedTrip { departure, ..trip },
            }),
            BookingState::PaymentMethodChosen { trip, method } => {
                Transition::accept(BookingState::PaymentMethodChosen {
                    trip: PricedTrip { departure, ..trip },
                    method,
                })
            }
            other => other.out_of_order(&BookingEvent::SelectDeparture(departure)),
        }
    }

    fn set_passengers(self, passengers: u32) -> Transition {
        if !(MIN_PASSENGERS..=MAX_PASSENGERS).contains(&passengers) {
            return Transition::reject(
                self,
                FareError::InvalidItinerary(format!(
                    "{passengers} passengers is outside {MIN_PASSENGERS}..={MAX_PASSENGERS}"
                )),
            );
        }
        if passengers == self.passengers() {
            return Transition::accept(self);
        }

        match self {
            BookingState::SelectingRoute { .. } => {
                Transition::accept(BookingState::SelectingRoute { passengers })
            }
            BookingState::SelectingPickup { route, .. } => {
                Transition::accept(BookingState::SelectingPickup { route, passengers })
            }
            BookingState::SelectingDestination { route, pickup, .. } => {
                Transition::accept(BookingState::SelectingDestination {
                    route,
                    pickup,
                    passengers,
                })
            }
            BookingState::SelectingTime { itinerary } => {
                match itinerary.with_passengers(passengers) {
                    Ok(itinerary) => Transition::accept(BookingState::SelectingTime { itinerary }),
                    Err(err) => Transition::reject(BookingState::SelectingTime { itinerary }, err),
                }
            }
            // A new party size changes the amount due, so any chosen
            // payment method is dropped along with the old quote
            BookingState::QuoteShown { trip } | BookingState::PaymentMethodChosen { trip, .. } => {
                let requoted = trip
                    .itinerary
                    .with_passengers(passengers)
                    .and_then(|itinerary| PricedTrip::new(itinerary, trip.departure.clone()));
                match requoted {
                    Ok(trip) => Transition::accept(BookingState::QuoteShown { trip }),
                    Err(err) => Transition::reject(BookingState::QuoteShown { trip }, err),
                }
            }
            settled @ BookingState::PaymentSettled { .. } => {
                Transition::reject(settled, BookingError::AlreadySettled)
            }
        }
    }

    fn choose_method(self, method: PaymentMethod) -> Transition {
        match self {
            BookingState::QuoteShown { trip } | BookingState::PaymentMethodChosen { trip, .. } => {
                Transition::accept(BookingState::PaymentMethodChosen { trip, method })
            }
            other => other.out_of_order(&BookingEvent::ChoosePaymentMethod(method)),
        }
    }

    fn settle(self, booking_id: Uuid, receipt: PaymentReceipt) -> Transition {
        match self {
            BookingState::PaymentMethodChosen { trip, method } => {
                // The method or party size may have changed while the
                // provider was working
                let mismatch = if receipt.booking_id != booking_id {
                    Some(BookingError::ForeignReceipt {
                        booking: booking_id,
                        receipt: receipt.booking_id,
                    })
                } else if receipt.method != method {
                    Some(BookingError::MethodMismatch {
                        paid: receipt.method,
                        chosen: method,
                    })
                } else if receipt.amount != trip.quote.total_fare {
                    Some(BookingError::AmountMismatch {
                        paid: receipt.amount,
                        due: trip.quote.total_fare,
                    })
                } else {
                    None
                };
                if let Some(error) = mismatch {
                    return Transition::reject(
                        BookingState::PaymentMethodChosen { trip, method },
                        error,
                    );
                }

                Transition::accept(BookingState::PaymentSettled {
                    trip,
                    method,
                    receipt,
                })
            }
            other => other.out_of_order(&BookingEvent::PaymentSettled {
                booking_id,
                receipt,
            }),
        }
    }

    fn back_to_booking(self) -> Transition {
        match self {
            BookingState::QuoteShown { trip } | BookingState::PaymentMethodChosen { trip, .. } => {
                Transition::accept(BookingState::SelectingTime {
                    itinerary: trip.itinerary,
                })
            }
            other => other.out_of_order(&BookingEvent::BackToBooking),
        }
    }
}
