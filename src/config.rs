use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{AppError, AppResult};
use crate::services::sessions::DEFAULT_IDLE_TTL;
use crate::utils::geo::GeoPoint;

#[derive(Clone, Debug)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    /// JSON route dataset; the built-in one is used when unset.
    pub routes_file: Option<PathBuf>,
    pub nearby_radius_km: f64,
    /// How many vehicles to show when the rider's location is unknown.
    pub fallback_vehicle_count: usize,
    pub default_center: GeoPoint,
    pub payment_delay: Duration,
    /// Booking sessions untouched this long are discarded.
    pub session_ttl: Duration,
    pub rate_limit_per_ms: u64,
    pub rate_limit_burst: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_host: "0.0.0.0".to_string(),
            server_port: 3000,
            routes_file: None,
            nearby_radius_km: 5.0,
            fallback_vehicle_count: 5,
            // Kolkata
            default_center: GeoPoint::new(22.5726, 88.3639),
            payment_delay: Duration::from_millis(2000),
            session_ttl: DEFAULT_IDLE_TTL,
            rate_limit_per_ms: 60,
            rate_limit_burst: 1000,
        }
    }
}

fn parse_var<T: FromStr>(key: &str, default: T) -> AppResult<T> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Config(format!("{key} must be a valid value, got {raw:?}"))),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();
        let config = Self {
            server_host: env::var("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port: parse_var("SERVER_PORT", defaults.server_port)?,
            routes_file: env::var("ROUTES_FILE").ok().map(PathBuf::from),
            nearby_radius_km: parse_var("NEARBY_RADIUS_KM", defaults.nearby_radius_km)?,
            fallback_vehicle_count: parse_var(
                "FALLBACK_VEHICLE_COUNT",
                defaults.fallback_vehicle_count,
            )?,
            default_center: GeoPoint::new(
                parse_var("DEFAULT_CENTER_LAT", defaults.default_center.latitude)?,
                parse_var("DEFAULT_CENTER_LNG", defaults.default_center.longitude)?,
            ),
            payment_delay: Duration::from_millis(parse_var(
                "PAYMENT_DELAY_MS",
                defaults.payment_delay.as_millis() as u64,
            )?),
            session_ttl: Duration::from_secs(parse_var(
                "SESSION_TTL_SECS",
                defaults.session_ttl.as_secs(),
            )?),
            rate_limit_per_ms: parse_var("RATE_LIMIT_PER_MS", defaults.rate_limit_per_ms)?,
            rate_limit_burst: parse_var("RATE_LIMIT_BURST", defaults.rate_limit_burst)?,
        };

        if config.nearby_radius_km.is_nan() || config.nearby_radius_km <= 0.0 {
            return Err(AppError::Config(
                "NEARBY_RADIUS_KM must be greater than zero".to_string(),
            ));
        }

        if config.session_ttl.is_zero() {
            return Err(AppError::Config(
                "SESSION_TTL_SECS must be greater than zero".to_string(),
            ));
        }

        Ok(config)
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}
