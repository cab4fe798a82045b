pub mod fleet;
pub mod payment;
pub mod sessions;
