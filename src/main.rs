use std::net::SocketAddr;

use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use transit_rider::{
    config::Config,
    dataset,
    middleware::rate_limit::rate_limited,
    routes, AppError, AppResult, AppState,
};

#[tokio::main]
async fn main() -> AppResult<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "transit_rider=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Starting server at {}", config.server_addr());

    // Load the route dataset
    let catalog = dataset::load(&config).await?;
    tracing::info!(
        routes = catalog.len(),
        source = %config
            .routes_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "built-in".to_string()),
        "Route dataset loaded"
    );

    let state = AppState::simulated(catalog, config.clone());

    // Sweep abandoned booking sessions
    let sessions = state.bookings.clone();
    tokio::spawn(async move {
        let mut sweep = tokio::time::interval(sessions.idle_ttl());
        loop {
            sweep.tick().await;
            sessions.prune().await;
        }
    });

    // Create router with middleware; request logging sits outside the governor
    let app = routes::create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any));
    let app = rate_limited(app, &config)?;

    // Start server with socket address for rate limiting
    let addr: SocketAddr = config
        .server_addr()
        .parse()
        .map_err(|e| AppError::Config(format!("Invalid server address: {}", e)))?;
    let listener = TcpListener::bind(addr).await?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
