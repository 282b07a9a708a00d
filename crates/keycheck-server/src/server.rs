use std::any::Any;
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::{
    catalog::CatalogClient,
    config::{PresentationDefaults, DEFAULT_CATALOG_URL},
    error::ValidationError,
    handlers::{health, preflight, validate_license},
    validator::Validator,
    AppState,
};

pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub catalog_url: String,
    /// Upper bound on a single catalog fetch. `None` leaves it to the
    /// transport defaults.
    pub fetch_timeout: Option<Duration>,
    pub defaults: PresentationDefaults,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: std::env::var("KEYCHECK_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: std::env::var("KEYCHECK_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            catalog_url: std::env::var("KEYCHECK_CATALOG_URL")
                .unwrap_or_else(|_| DEFAULT_CATALOG_URL.into()),
            fetch_timeout: std::env::var("KEYCHECK_FETCH_TIMEOUT")
                .ok()
                .and_then(|t| parse_timeout(&t)),
            defaults: PresentationDefaults::default(),
        }
    }
}

impl ServerConfig {
    /// Build the shared state from this configuration.
    pub fn app_state(&self) -> Result<AppState> {
        let catalog = CatalogClient::new(self.catalog_url.clone(), self.fetch_timeout)?;
        Ok(AppState {
            validator: Validator::new(catalog, self.defaults.clone()),
        })
    }
}

pub async fn run(cfg: ServerConfig) -> Result<()> {
    let state = cfg.app_state()?;
    info!(catalog_url = %cfg.catalog_url, timeout = ?cfg.fetch_timeout, "using license catalog");

    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", cfg.host, cfg.port)
        .parse()
        .context("invalid host/port")?;

    info!(%addr, "keycheck server listening");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("bind listener")?;

    axum::serve(listener, app).await.context("server error")
}

/// The full application: routes, panic recovery, CORS headers and tracing.
pub fn router(state: AppState) -> Router {
    with_layers(
        Router::new()
            .route("/health", get(health))
            .route("/api/validate", get(validate_license).options(preflight))
            .with_state(state),
    )
}

fn with_layers(app: Router) -> Router {
    app.layer(CatchPanicLayer::custom(handle_panic))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("GET, OPTIONS"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type"),
        ))
        .layer(TraceLayer::new_for_http())
}

/// Humantime duration such as `10s` or `1m 30s`. Unparseable or blank
/// values leave the timeout unset.
fn parse_timeout(raw: &str) -> Option<Duration> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    match humantime::parse_duration(raw) {
        Ok(d) => Some(d),
        Err(e) => {
            warn!(value = raw, error = %e, "ignoring invalid KEYCHECK_FETCH_TIMEOUT");
            None
        }
    }
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic"
    };
    error!(panic = detail, "license validation error");
    ValidationError::Internal.into_response()
}
