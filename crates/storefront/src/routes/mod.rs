//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                          - Liveness check
//! GET  /health/ready                    - Readiness check (database)
//!
//! # Delivery API (JSON)
//! POST /api/delivery/quote              - Price delivery for a point and subtotal
//! GET  /api/stores/{store_id}/zones     - Delivery zones for the checkout map
//! ```

pub mod delivery;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the delivery API routes router.
pub fn delivery_routes() -> Router<AppState> {
    Router::new().route("/quote", post(delivery::quote))
}

/// Create the store API routes router.
pub fn store_routes() -> Router<AppState> {
    Router::new().route("/{store_id}/zones", get(delivery::zones))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/api/delivery", delivery_routes())
        .nest("/api/stores", store_routes())
}
