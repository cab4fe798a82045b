pub mod bookings;
pub mod catalog;
pub mod fares;
pub mod tracking;
