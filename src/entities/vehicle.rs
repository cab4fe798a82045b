use serde::{Deserialize, Serialize};

use crate::domain::proximity::Locatable;
use crate::utils::geo::GeoPoint;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VehiclePosition {
    pub vehicle_id: String,
    pub position: GeoPoint,
}

impl Locatable for VehiclePosition {
    fn location(&self) -> GeoPoint {
        self.position
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceStatus {
    OnTime,
    SlightDelay,
}

/// A vehicle position plus the live-looking details shown next to it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VehicleSnapshot {
    #[serde(flatten)]
    pub position: VehiclePosition,
    pub route_id: String,
    pub route_name: String,
    pub current_stop: String,
    pub next_stop: String,
    pub eta_minutes: u32,
    pub status: ServiceStatus,
    pub occupancy_percent: u8,
}

impl Locatable for VehicleSnapshot {
    fn location(&self) -> GeoPoint {
        self.position.position
    }
}
