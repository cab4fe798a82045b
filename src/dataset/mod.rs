use crate::config::Config;
use crate::entities::route::{Route, RouteCatalog};
use crate::error::{AppError, AppResult};

const BUILTIN_ROUTES: &str = include_str!("../../data/routes.json");

pub fn parse_routes(json: &str) -> AppResult<RouteCatalog> {
    let routes: Vec<Route> = serde_json::from_str(json)
        .map_err(|e| AppError::Config(format!("Invalid route dataset: {}", e)))?;
    RouteCatalog::new(routes)
}

/// Load the route dataset named by the config, or the built-in one.
pub async fn load(config: &Config) -> AppResult<RouteCatalog> {
    let catalog = match &config.routes_file {
        Some(path) => {
            let json = tokio::fs::read_to_string(path).await.map_err(|e| {
                AppError::Config(format!("Failed to read {}: {}", path.display(), e))
            })?;
            parse_routes(&json)?
        }
        None => parse_routes(BUILTIN_ROUTES)?,
    };

    let unbookable = catalog.all().iter().filter(|r| !r.is_bookable()).count();
    if unbookable > 0 {
        tracing::warn!(
            unbookable,
            "Some routes lack two stops or a departure and cannot be booked"
        );
    }

    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_dataset_is_valid() {
        let catalog = parse_routes(BUILTIN_ROUTES).unwrap();

        assert!(!catalog.is_empty());
        assert!(catalog.all().iter().all(|r| r.is_bookable()));
        assert!(catalog.get("AC12").is_some());
    }

    #[test]
    fn test_departure_times_are_optional() {
        let catalog = parse_routes(r#"[{"id":"7","name":"Seven","stops":["A","B"]}]"#).unwrap();

        let route = catalog.get("7").unwrap();
        assert!(route.departure_times.is_empty());
        assert!(!route.is_bookable());
    }

    #[test]
    fn test_malformed_dataset() {
        assert!(matches!(parse_routes("{"), Err(AppError::Config(_))));
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let config = Config {
            routes_file: Some("/nonexistent/routes.json".into()),
            ..Config::default()
        };

        assert!(matches!(load(&config).await, Err(AppError::Config(_))));
    }
}
