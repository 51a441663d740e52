//! NoteGraph API Gateway
//!
//! The main entry point for all external API requests.
//! Handles:
//! - Authentication context extraction
//! - Rate limiting
//! - Request routing for the citation engine
//! - Observability (logging, metrics, tracing)

mod handlers;
mod middleware;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use metrics_exporter_prometheus::PrometheusBuilder;
use notegraph_common::{config::AppConfig, db::DbPool, metrics};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{info, Level};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: DbPool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_target(true)
        .json()
        .init();

    info!("Starting NoteGraph API Gateway v{}", notegraph_common::VERSION);

    // Load configuration
    let config = AppConfig::load().map_err(|e| {
        tracing::error!(error = %e, "Failed to load configuration");
        e
    })?;

    let config = Arc::new(config);

    // Initialize metrics
    metrics::register_metrics();
    if config.observability.metrics_port != 0 {
        let metrics_addr = SocketAddr::from(([0, 0, 0, 0], config.observability.metrics_port));
        PrometheusBuilder::new()
            .with_http_listener(metrics_addr)
            .install()?;
        info!("Metrics exporter listening on {}", metrics_addr);
    }

    // Initialize database connection
    info!("Connecting to database...");
    let db = DbPool::new(&config.database).await?;

    // Create app state
    let state = AppState {
        config: config.clone(),
        db,
    };

    // Build the router
    let app = create_router(state);

    // Start the server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Create the main application router
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Request ID propagation
    let request_id = SetRequestIdLayer::x_request_id(MakeRequestUuid);
    let propagate_id = PropagateRequestIdLayer::x_request_id();

    // Rate limiting
    let limiter = middleware::rate_limit::create_rate_limiter(
        state.config.rate_limit.requests_per_second,
        state.config.rate_limit.burst,
    );
    let rate_limit_enabled = state.config.rate_limit.enabled;

    // API routes
    let api_routes = Router::new()
        // Citation relationship CRUD
        .route(
            "/citations/notes/{note_id}/cite/{referenced_note_id}",
            post(handlers::citations::create_citation),
        )
        .route(
            "/citations/{citation_id}",
            put(handlers::citations::update_citation),
        )
        .route(
            "/citations/{citation_id}",
            delete(handlers::citations::delete_citation),
        )
        .route(
            "/citations/notes/{note_id}/cite/{referenced_note_id}",
            delete(handlers::citations::delete_citation_by_notes),
        )
        // Citation queries
        .route(
            "/citations/notes/{note_id}/outgoing",
            get(handlers::citations::get_outgoing_citations),
        )
        .route(
            "/citations/notes/{note_id}/incoming",
            get(handlers::citations::get_incoming_citations),
        )
        .route(
            "/citations/notes/{note_id}/cited",
            get(handlers::citations::get_cited_notes),
        )
        .route(
            "/citations/notes/{note_id}/citing",
            get(handlers::citations::get_citing_notes),
        )
        .route(
            "/citations/notes/{note_id}/stats",
            get(handlers::citations::get_citation_stats),
        )
        // Order management
        .route(
            "/citations/notes/{note_id}/reorder",
            put(handlers::citations::reorder_citations),
        )
        // Rendering
        .route(
            "/citations/notes/{note_id}/render",
            get(handlers::citations::render_citations),
        );

    // Compose the app
    let mut app = Router::new()
        // Health endpoints (no auth, no rate limit)
        .route("/health", get(handlers::health::health))
        .route("/ready", get(handlers::health::ready))
        .nest("/api", api_routes)
        .layer(axum::middleware::from_fn(middleware::track_metrics))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(request_id)
        .layer(propagate_id);

    if rate_limit_enabled {
        app = app.layer(axum::middleware::from_fn(move |req, next| {
            middleware::rate_limit::rate_limit_middleware(req, next, limiter.clone())
        }));
    }

    app.with_state(state)
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, starting shutdown..."),
        _ = terminate => info!("Received SIGTERM, starting shutdown..."),
    }
}
