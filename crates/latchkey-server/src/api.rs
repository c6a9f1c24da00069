//! HTTP API routes and handlers.
//!
//! This module contains all HTTP endpoint implementations organized by domain:
//! - `bookings` - Booking creation, lookup, and cancellation
//! - `availability` - Slot availability and booked-period queries
//! - `devices` - Managed device catalog
//! - `maintenance` - Expired-code cleanup and consecutive-booking grouping
//! - `health` - Service health checks
//! - `error` - API error types
//! - `openapi` - OpenAPI specification generation

use axum::routing::get;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub mod availability;
pub mod bookings;
pub mod devices;
pub mod error;
pub mod health;
pub mod maintenance;
pub mod openapi;

// Re-export commonly used types
#[allow(unused_imports)]
pub use error::{ApiError, ApiResult, ErrorResponse};

/// Creates the combined API router with all endpoints.
///
/// # Route Structure
///
/// ```text
/// /health                     - Health check
/// /api
/// ├── /bookings               - Booking creation, listing, lookup, cancellation
/// ├── /availability           - Slot availability check
/// ├── /booked-periods         - Booked periods for a device
/// ├── /devices                - Managed device catalog
/// ├── /maintenance            - Cleanup and consecutive-booking grouping
/// └── /openapi.json           - OpenAPI specification
/// ```
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/health", health::router())
        .nest(
            "/api",
            Router::new()
                .nest("/bookings", bookings::router())
                .route("/availability", get(availability::check_availability))
                .route("/booked-periods", get(availability::booked_periods))
                .route("/devices", get(devices::list_devices))
                .nest("/maintenance", maintenance::router())
                .route("/openapi.json", get(openapi::get_openapi_spec)),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
