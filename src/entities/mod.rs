pub mod payment;
pub mod route;
pub mod vehicle;
