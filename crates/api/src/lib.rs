//! # Huddle API
//!
//! HTTP surface of the Huddle group-scheduling service: proposal lifecycle,
//! slot claiming, availability and the aggregated calendar.
//!
//! ## Architecture
//!
//! - **Routes**: URL structure, one module per resource
//! - **Handlers**: thin adapters from HTTP to the `huddle-core` operations
//! - **Middleware**: identity extraction and error mapping
//! - **Config**: environment-driven settings
//!
//! Handlers never touch the database directly; they call core operations
//! with the [`SchedulingStore`] held in [`ApiState`].

/// Configuration module for API settings
pub mod config;
/// Request handlers
pub mod handlers;
/// Identity extraction and error handling
pub mod middleware;
/// Route definitions and API endpoint structure
pub mod routes;

use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    http::{HeaderName, HeaderValue, Method, header},
};
use eyre::Result;
use huddle_core::{models::slot::AvailabilityHistoryPolicy, store::SchedulingStore};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::FmtSubscriber;

use crate::middleware::auth::{USER_EMAIL_HEADER, USER_ID_HEADER};

/// Shared application state that is accessible to all request handlers
pub struct ApiState {
    pub store: Arc<dyn SchedulingStore>,
    /// Whether replacing availability also appends history
    pub history_policy: AvailabilityHistoryPolicy,
}

impl ApiState {
    pub fn new(store: Arc<dyn SchedulingStore>, history_policy: AvailabilityHistoryPolicy) -> Self {
        Self {
            store,
            history_policy,
        }
    }
}

/// Builds the router with every endpoint and the shared state attached.
pub fn app(state: Arc<ApiState>) -> Router {
    Router::new()
        .merge(routes::health::routes())
        .merge(routes::proposal::routes())
        .merge(routes::slot::routes())
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
            HeaderName::from_static(USER_ID_HEADER),
            HeaderName::from_static(USER_EMAIL_HEADER),
        ])
        .allow_origin(allowed)
        .allow_credentials(true)
}

/// Starts the API server with the provided configuration and store
///
/// Installs the tracing subscriber at the configured level, layers CORS,
/// request tracing and the request timeout over [`app`], and serves until
/// the listener fails.
///
/// # Example
///
/// ```no_run
/// # async fn run() -> eyre::Result<()> {
/// use std::sync::Arc;
/// use huddle_api::{config::ApiConfig, start_server};
/// use huddle_db::{PgStore, create_pool};
///
/// let config = ApiConfig::from_env()?;
/// let pool = create_pool(&config.database_url, config.database_max_connections).await?;
/// start_server(config, Arc::new(PgStore::new(pool))).await?;
/// # Ok(())
/// # }
/// ```
pub async fn start_server(config: config::ApiConfig, store: Arc<dyn SchedulingStore>) -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!(
        "Availability history on update: {}",
        config.history_policy.records_updates()
    );
    let state = Arc::new(ApiState::new(store, config.history_policy));

    let app = app(state);

    let app = match &config.cors_origins {
        Some(origins) => app.layer(cors_layer(origins)),
        None => app,
    };

    let app = app.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout))),
    );

    let addr = config.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
