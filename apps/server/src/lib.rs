//! # Stockbook HTTP Server
//!
//! Axum JSON API over the Stockbook inventory and ledger.
//!
//! ## Surface
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  POST /transactions            apply a ledger transaction           │
//! │  GET  /transactions[/:id]      ledger listing / single entry        │
//! │  CRUD /products, /categories, /expenses                             │
//! │  GET  /dashboard/summary       KPIs + charts (current month default)│
//! │  GET  /logs/years ... /logs/:year/:month/:day, /logs/search         │
//! │  GET  /health                  liveness probe                       │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Exposed as a library so integration tests can build the router
//! without binding a socket.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use stockbook_db::Database;

/// Shared application state: database handle plus display config.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
    pub config: ServerConfig,
}

/// Builds the full application router.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(routes::health::routes())
        .nest("/products", routes::products::routes())
        .nest("/categories", routes::categories::routes())
        .nest("/transactions", routes::transactions::routes())
        .nest("/expenses", routes::expenses::routes())
        .nest("/dashboard", routes::dashboard::routes())
        .nest("/logs", routes::logs::routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
