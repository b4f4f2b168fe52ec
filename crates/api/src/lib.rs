//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes, nested under `/api/v1`
//! - Tenant resolution middleware
//! - Error rendering for the shared error taxonomy

pub mod error;
pub mod middleware;
pub mod routes;

use axum::Router;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tally_shared::BillingConfig;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use error::{ApiError, ApiResult};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// Billing defaults, such as payment terms for order invoices.
    pub billing: BillingConfig,
}

impl AppState {
    /// Creates the state from a connection and billing defaults.
    #[must_use]
    pub fn new(db: DatabaseConnection, billing: BillingConfig) -> Self {
        Self {
            db: Arc::new(db),
            billing,
        }
    }

    /// Returns a clone of the pooled connection for a repository.
    #[must_use]
    pub fn conn(&self) -> DatabaseConnection {
        (*self.db).clone()
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes_with_state(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
