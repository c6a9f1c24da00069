//! Booking API endpoints.
//!
//! Creating a booking runs the full scheduling pipeline: validation,
//! availability against the device's existing codes, code issuance,
//! persistence, and a fire-and-forget notification. Cancellation enforces
//! the lifecycle rule that an in-use booking cannot be revoked.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use latchkey_core::{Booking, BookingRequest};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::api::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Creates the bookings router with all endpoints.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_bookings).post(create_booking))
        .route("/{id}", get(get_booking).delete(cancel_booking))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for creating a booking.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[schema(example = json!({
    "device_id": "front-door-lock",
    "starts_at": "2025-06-01T14:00:00Z",
    "ends_at": "2025-06-01T16:00:00Z",
    "user_name": "Ada Lovelace",
    "user_email": "ada@example.com",
    "user_phone": "+14155550123"
}))]
pub struct CreateBookingRequest {
    /// Target device.
    #[schema(example = "front-door-lock")]
    pub device_id: String,

    /// Window start, RFC 3339.
    #[schema(example = "2025-06-01T14:00:00Z")]
    pub starts_at: String,

    /// Window end, RFC 3339.
    #[schema(example = "2025-06-01T16:00:00Z")]
    pub ends_at: String,

    /// Requester's full name.
    #[schema(example = "Ada Lovelace")]
    pub user_name: String,

    /// Requester's email address.
    #[schema(example = "ada@example.com")]
    pub user_email: String,

    /// Requester's phone number, optional.
    #[schema(example = "+14155550123")]
    pub user_phone: Option<String>,
}

impl From<CreateBookingRequest> for BookingRequest {
    fn from(request: CreateBookingRequest) -> Self {
        Self {
            device_id: request.device_id,
            starts_at: request.starts_at,
            ends_at: request.ends_at,
            user_name: request.user_name,
            user_email: request.user_email,
            user_phone: request.user_phone,
        }
    }
}

/// Response wrapping a single booking.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookingResponse {
    /// Whether the operation succeeded.
    #[schema(example = true)]
    pub success: bool,

    /// The booking record.
    pub booking: Booking,
}

/// Response after cancelling a booking.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "success": true,
    "message": "Booking cancelled successfully"
}))]
pub struct CancelBookingResponse {
    /// Whether the cancellation succeeded.
    #[schema(example = true)]
    pub success: bool,

    /// Human-readable confirmation.
    #[schema(example = "Booking cancelled successfully")]
    pub message: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// List all bookings, including expired and cancelled ones.
#[utoipa::path(
    get,
    path = "/api/bookings",
    tag = "bookings",
    operation_id = "listBookings",
    summary = "List all bookings",
    responses(
        (status = 200, description = "Bookings retrieved", body = Vec<Booking>)
    )
)]
pub async fn list_bookings(State(state): State<AppState>) -> ApiResult<Json<Vec<Booking>>> {
    let bookings = state.repository().bookings().await?;
    Ok(Json(bookings))
}

/// Fetch a single booking by id.
#[utoipa::path(
    get,
    path = "/api/bookings/{id}",
    tag = "bookings",
    operation_id = "getBooking",
    summary = "Get a booking",
    params(
        ("id" = Uuid, Path, description = "Booking identifier")
    ),
    responses(
        (status = 200, description = "Booking found", body = Booking),
        (status = 404, description = "No such booking", body = super::error::ErrorResponse)
    )
)]
pub async fn get_booking(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Booking>> {
    let booking = state
        .repository()
        .booking(id)
        .await?
        .ok_or_else(|| ApiError::NotFound {
            error_code: "booking_not_found".to_owned(),
            message: format!("booking not found: {id}"),
        })?;
    Ok(Json(booking))
}

/// Create a new booking.
///
/// Validates the request, checks the slot against the device's existing
/// access codes, issues a code, and persists the booking. The requester
/// is notified out of band.
#[utoipa::path(
    post,
    path = "/api/bookings",
    tag = "bookings",
    operation_id = "createBooking",
    summary = "Create a booking",
    request_body = CreateBookingRequest,
    responses(
        (status = 201, description = "Booking created", body = BookingResponse),
        (status = 400, description = "Validation failed", body = super::error::ErrorResponse),
        (status = 409, description = "Time slot is not available", body = super::error::ErrorResponse),
        (status = 502, description = "Access code provider failure", body = super::error::ErrorResponse)
    )
)]
pub async fn create_booking(
    State(state): State<AppState>,
    Json(request): Json<CreateBookingRequest>,
) -> ApiResult<(StatusCode, Json<BookingResponse>)> {
    let booking = state.scheduler().schedule(request.into()).await?;
    Ok((
        StatusCode::CREATED,
        Json(BookingResponse {
            success: true,
            booking,
        }),
    ))
}

/// Cancel a booking.
///
/// Rejected with 409 while the booking's window contains the current
/// instant. A future booking's code is revoked at the provider
/// best-effort before the record is marked cancelled.
#[utoipa::path(
    delete,
    path = "/api/bookings/{id}",
    tag = "bookings",
    operation_id = "cancelBooking",
    summary = "Cancel a booking",
    params(
        ("id" = Uuid, Path, description = "Booking identifier")
    ),
    responses(
        (status = 200, description = "Booking cancelled", body = CancelBookingResponse),
        (status = 404, description = "No such booking", body = super::error::ErrorResponse),
        (status = 409, description = "Booking is currently in use", body = super::error::ErrorResponse)
    )
)]
pub async fn cancel_booking(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<CancelBookingResponse>> {
    state.scheduler().cancel(id).await?;
    Ok(Json(CancelBookingResponse {
        success: true,
        message: "Booking cancelled successfully".to_owned(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_deserialization() {
        let json = r#"{
            "device_id": "front-door-lock",
            "starts_at": "2025-06-01T14:00:00Z",
            "ends_at": "2025-06-01T16:00:00Z",
            "user_name": "Ada Lovelace",
            "user_email": "ada@example.com"
        }"#;
        let request: CreateBookingRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.device_id, "front-door-lock");
        assert!(request.user_phone.is_none());

        let core_request: BookingRequest = request.into();
        assert_eq!(core_request.user_email, "ada@example.com");
    }

    #[test]
    fn test_cancel_response_serialization() {
        let response = CancelBookingResponse {
            success: true,
            message: "Booking cancelled successfully".to_owned(),
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"success\":true"));
    }
}
