use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// A bus route: ordered stops in travel order plus its departure labels.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub id: String,
    pub name: String,
    pub stops: Vec<String>,
    #[serde(default)]
    pub departure_times: Vec<String>,
}

impl Route {
    /// A route needs a boarding stop, an alighting stop and at least one
    /// departure to be booked.
    pub fn is_bookable(&self) -> bool {
        self.stops.len() >= 2 && !self.departure_times.is_empty()
    }

    pub fn has_departure(&self, label: &str) -> bool {
        self.departure_times.iter().any(|t| t == label)
    }

    fn matches(&self, needle: &str) -> bool {
        self.id.to_lowercase().contains(needle)
            || self.name.to_lowercase().contains(needle)
            || self.stops.iter().any(|s| s.to_lowercase().contains(needle))
    }
}

/// Read-only set of routes loaded once at startup.
#[derive(Clone, Debug, Default)]
pub struct RouteCatalog {
    routes: Vec<Arc<Route>>,
}

impl RouteCatalog {
    /// Build a catalog, rejecting duplicate route ids and duplicate stops
    /// within a route.
    pub fn new(routes: Vec<Route>) -> AppResult<Self> {
        let mut ids = HashSet::new();
        for route in &routes {
            if !ids.insert(route.id.as_str()) {
                return Err(AppError::Config(format!(
                    "Duplicate route id {}",
                    route.id
                )));
            }

            let mut stops = HashSet::new();
            if let Some(dup) = route.stops.iter().find(|s| !stops.insert(s.as_str())) {
                return Err(AppError::Config(format!(
                    "Route {} lists stop {} twice",
                    route.id, dup
                )));
            }
        }

        Ok(Self {
            routes: routes.into_iter().map(Arc::new).collect(),
        })
    }

    pub fn all(&self) -> &[Arc<Route>] {
        &self.routes
    }

    pub fn get(&self, id: &str) -> Option<Arc<Route>> {
        self.routes.iter().find(|r| r.id == id).cloned()
    }

    /// Case-insensitive match on route number, name or any stop.
    /// A blank query returns every route.
    pub fn search(&self, query: &str) -> Vec<Arc<Route>> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.routes.clone();
        }

        self.routes
            .iter()
            .filter(|r| r.matches(&needle))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
