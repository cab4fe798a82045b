use axum::{
    body::Body,
    extract::{ConnectInfo, Request},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};

use crate::config::Config;
use crate::error::{AppError, AppResult};

/// Type alias for the global governor layer (IP-based rate limiting)
pub type GlobalGovernorLayer = GovernorLayer<
    tower_governor::key_extractor::PeerIpKeyExtractor,
    governor::middleware::NoOpMiddleware<governor::clock::QuantaInstant>,
    Body,
>;

/// Create a GovernorLayer for global rate limiting (per IP address)
/// - one token every `rate_limit_per_ms` milliseconds
/// - bursts of up to `rate_limit_burst` requests
pub fn create_global_governor(config: &Config) -> AppResult<GlobalGovernorLayer> {
    let governor_config = GovernorConfigBuilder::default()
        .per_millisecond(config.rate_limit_per_ms)
        .burst_size(config.rate_limit_burst)
        .finish()
        .ok_or_else(|| {
            AppError::Config("RATE_LIMIT_PER_MS and RATE_LIMIT_BURST must be non-zero".to_string())
        })?;

    Ok(GovernorLayer::new(Arc::new(governor_config)))
}

/// Put the governor around `router`, with request logging outside it so
/// that rejected requests are logged too.
pub fn rate_limited(router: Router, config: &Config) -> AppResult<Router> {
    let governor = create_global_governor(config)?;

    Ok(router
        .layer(governor)
        .layer(middleware::from_fn(log_request)))
}

/// Middleware to log rate limiting and request details
pub async fn log_request(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();

    tracing::debug!(
        client_ip = %addr.ip(),
        method = %method,
        uri = %uri,
        "Incoming request"
    );

    let response = next.run(request).await;
    let status = response.status();

    if status == StatusCode::TOO_MANY_REQUESTS {
        tracing::warn!(
            client_ip = %addr.ip(),
            method = %method,
            uri = %uri,
            "Rate limited"
        );
    } else if status.is_client_error() || status.is_server_error() {
        tracing::warn!(
            client_ip = %addr.ip(),
            method = %method,
            uri = %uri,
            status = %status,
            "Request failed"
        );
    } else {
        tracing::debug!(
            client_ip = %addr.ip(),
            method = %method,
            uri = %uri,
            status = %status,
            "Request completed"
        );
    }

    response
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::Mutex;

    use axum::{
        extract::connect_info::MockConnectInfo,
        http::{Request, StatusCode},
        routing::get,
    };
    use tower::ServiceExt;

    use super::*;

    /// Collects formatted log lines for inspection.
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn app(config: &Config) -> Router {
        let router = Router::new().route("/ping", get(|| async { "pong" }));
        rate_limited(router, config)
            .unwrap()
            .layer(MockConnectInfo(SocketAddr::from(([127, 0, 0, 1], 4000))))
    }

    fn ping() -> Request<Body> {
        Request::builder()
            .uri("/ping")
            .extension(ConnectInfo(SocketAddr::from(([127, 0, 0, 1], 4000))))
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_rate_limited_requests_are_logged() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let config = Config {
            rate_limit_per_ms: 60_000,
            rate_limit_burst: 1,
            ..Config::default()
        };
        let app = app(&config);

        let first = app.clone().oneshot(ping()).await.unwrap();
        assert_eq!(first.status(), StatusCode::OK);

        let second = app.oneshot(ping()).await.unwrap();
        assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);

        let logs = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(logs.contains("Request completed"), "{logs}");
        assert!(logs.contains("Rate limited"), "{logs}");
    }

    #[test]
    fn test_zero_burst_is_a_config_error() {
        let config = Config {
            rate_limit_burst: 0,
            ..Config::default()
        };

        assert!(matches!(
            create_global_governor(&config),
            Err(AppError::Config(_))
        ));
    }
}
