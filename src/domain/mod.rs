//! Pure booking and tracking rules. Nothing in here blocks or touches I/O.

pub mod booking;
pub mod fare;
pub mod itinerary;
pub mod proximity;
