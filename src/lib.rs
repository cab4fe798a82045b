pub mod config;
pub mod dataset;
pub mod domain;
pub mod entities;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod utils;

use std::sync::Arc;

use entities::route::RouteCatalog;
use services::fleet::{SimulatedFleet, VehicleSource};
use services::payment::{PaymentProvider, SimulatedGateway};
use services::sessions::BookingSessions;

pub use config::Config;
pub use error::{AppError, AppResult};

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<RouteCatalog>,
    pub vehicles: Arc<dyn VehicleSource>,
    pub payments: Arc<dyn PaymentProvider>,
    pub bookings: Arc<BookingSessions>,
    pub config: Config,
}

impl AppState {
    /// Wire the simulated fleet and payment gateway around a catalog.
    pub fn simulated(catalog: RouteCatalog, config: Config) -> Self {
        let catalog = Arc::new(catalog);
        Self {
            vehicles: Arc::new(SimulatedFleet::new(
                Arc::clone(&catalog),
                config.default_center,
            )),
            payments: Arc::new(SimulatedGateway::new(config.payment_delay)),
            bookings: Arc::new(BookingSessions::with_idle_ttl(config.session_ttl)),
            catalog,
            config,
        }
    }
}
