//! # Tutorbook API
//!
//! The API crate provides the web server implementation for the Tutorbook
//! scheduling service. It defines RESTful endpoints for managing tutor
//! availability, scheduling preferences, booking requests, slot locks, and
//! confirmed sessions.
//!
//! ## Architecture
//!
//! This crate follows a layered architecture:
//!
//! - **Routes**: Define API endpoints and URL structure
//! - **Handlers**: Implement request processing logic
//! - **Middleware**: Provide cross-cutting concerns like error handling
//! - **Config**: Handle environment and application configuration
//!
//! The API uses Axum as the web framework and SQLx for database interactions.
//! Domain decisions (slot generation, validation, lock and confirmation
//! logic) live in `tutorbook-core`; handlers orchestrate them against the
//! repositories.

/// Configuration module for API settings
pub mod config;
/// Request handlers that implement business logic
pub mod handlers;
/// Middleware for error handling
pub mod middleware;
/// Route definitions and API endpoint structure
pub mod routes;

use std::sync::Arc;

use axum::Router;
use eyre::Result;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::FmtSubscriber;
use tutorbook_core::models::preferences::SchedulingDefaults;

/// Shared application state that is accessible to all request handlers
///
/// This struct encapsulates dependencies that are shared across the
/// application: the database connection pool and the scheduling defaults
/// applied when a tutor has no stored preferences.
pub struct ApiState {
    /// PostgreSQL connection pool for database operations
    pub db_pool: PgPool,
    /// Scheduling defaults used when no preference row exists
    pub defaults: SchedulingDefaults,
}

/// Starts the API server with the provided configuration and database connection
///
/// This function initializes the application, sets up logging, configures
/// routes, and starts the HTTP server.
///
/// # Example
///
/// ```ignore
/// let config = config::ApiConfig::from_env()?;
/// let db_pool = tutorbook_db::create_pool(&config.database_url).await?;
/// start_server(config, db_pool).await?;
/// ```
pub async fn start_server(config: config::ApiConfig, db_pool: PgPool) -> Result<()> {
    // Initialize tracing for logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Create shared state with dependencies
    let state = Arc::new(ApiState {
        db_pool,
        defaults: config.defaults.clone(),
    });

    // Build the application router with all routes
    let app = Router::new()
        // Health check endpoints
        .merge(routes::health::routes())
        // Tutor availability endpoints
        .merge(routes::availability::routes())
        // Scheduling preference endpoints
        .merge(routes::preferences::routes())
        // Booking lifecycle and slot lock endpoints
        .merge(routes::booking::routes())
        // Session endpoints
        .merge(routes::sessions::routes())
        // Attach shared state to all routes
        .with_state(state);

    // Apply CORS configuration if origins are specified
    let app = if let Some(origins) = &config.cors_origins {
        let cors = tower_http::cors::CorsLayer::new()
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::PUT,
                axum::http::Method::DELETE,
                axum::http::Method::OPTIONS,
            ])
            .allow_headers([
                axum::http::header::CONTENT_TYPE,
                axum::http::header::AUTHORIZATION,
                axum::http::header::ACCEPT,
            ])
            .allow_origin(
                origins
                    .iter()
                    .filter_map(|origin| origin.parse().ok())
                    .collect::<Vec<_>>(),
            )
            .allow_credentials(true);

        app.layer(cors)
    } else {
        app
    };

    // Add request timeout middleware
    let app = app.layer(tower_http::timeout::TimeoutLayer::new(
        std::time::Duration::from_secs(config.request_timeout),
    ));

    // Start the HTTP server
    let addr = config.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
