//! OpenAPI specification generation for the latchkey API.

use axum::Json;
use utoipa::OpenApi;

use latchkey_core::{BookedPeriod, Booking, BookingStatus, ProviderCode, TimeWindow};

use super::availability::{AvailabilityResponse, BookedPeriodsResponse};
use super::bookings::{BookingResponse, CancelBookingResponse, CreateBookingRequest};
use super::devices::DeviceResponse;
use super::error::ErrorResponse;
use super::health::HealthResponse;
use super::maintenance::{
    CleanupRequest, CleanupResponse, ConsecutiveGroupsResponse, ConsecutiveRequest,
};

/// Serve the OpenAPI specification as JSON.
///
/// This endpoint is available at `/api/openapi.json` and returns the
/// complete OpenAPI 3.0 specification for the latchkey API.
pub async fn get_openapi_spec() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Main OpenAPI document structure for latchkey.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "latchkey API",
        version = "0.1.0",
        description = r#"
# latchkey API

latchkey schedules time-bounded access codes on smart locks.

## Overview

1. **Bookings**: Create a booking to issue a temporary access code for a
   device over a time window. Overlapping windows on the same device are
   rejected.
2. **Availability**: Check whether a window is free before booking.
3. **Maintenance**: Revoke expired codes, reconcile booking statuses, and
   identify back-to-back bookings that form one continuous occupancy.
"#,
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "/", description = "Local latchkey server")
    ),
    tags(
        (
            name = "system",
            description = "Health checks and system status"
        ),
        (
            name = "bookings",
            description = "Booking lifecycle - creation, lookup, and cancellation"
        ),
        (
            name = "availability",
            description = "Slot availability and booked-period queries"
        ),
        (
            name = "devices",
            description = "Managed device catalog"
        ),
        (
            name = "maintenance",
            description = "Expired-code cleanup and consecutive-booking grouping"
        )
    ),
    paths(
        // Health endpoints
        super::health::health_check,
        // Booking endpoints
        super::bookings::list_bookings,
        super::bookings::get_booking,
        super::bookings::create_booking,
        super::bookings::cancel_booking,
        // Availability endpoints
        super::availability::check_availability,
        super::availability::booked_periods,
        // Device endpoints
        super::devices::list_devices,
        // Maintenance endpoints
        super::maintenance::cleanup_expired,
        super::maintenance::consecutive_bookings,
    ),
    components(
        schemas(
            // Error types
            ErrorResponse,
            // Health types
            HealthResponse,
            // Core types
            Booking,
            BookingStatus,
            TimeWindow,
            BookedPeriod,
            ProviderCode,
            // Booking types
            CreateBookingRequest,
            BookingResponse,
            CancelBookingResponse,
            // Availability types
            AvailabilityResponse,
            BookedPeriodsResponse,
            // Device types
            DeviceResponse,
            // Maintenance types
            CleanupRequest,
            CleanupResponse,
            ConsecutiveRequest,
            ConsecutiveGroupsResponse,
        )
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_spec_generation() {
        let spec = ApiDoc::openapi();
        assert_eq!(spec.info.title, "latchkey API");
        assert!(!spec.paths.paths.is_empty());
    }

    #[test]
    fn test_openapi_spec_serializes() {
        let json = ApiDoc::openapi().to_pretty_json().unwrap();
        assert!(json.contains("\"openapi\":"));
        assert!(json.contains("latchkey API"));
    }
}
