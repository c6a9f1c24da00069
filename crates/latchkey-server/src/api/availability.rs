//! Availability API endpoints.
//!
//! Read-only queries: whether a window is free on a device, and the
//! device's currently booked periods.

use axum::extract::{Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use latchkey_core::{BookedPeriod, TimeWindow};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::api::error::{ApiError, ApiResult};
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for an availability check.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct AvailabilityQuery {
    /// Target device.
    #[param(example = "front-door-lock")]
    pub device_id: String,

    /// Proposed window start, RFC 3339.
    #[param(example = "2025-06-01T14:00:00Z")]
    pub starts_at: String,

    /// Proposed window end, RFC 3339.
    #[param(example = "2025-06-01T16:00:00Z")]
    pub ends_at: String,
}

/// Availability check result.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({ "is_available": true }))]
pub struct AvailabilityResponse {
    /// Whether the proposed window is free.
    pub is_available: bool,
}

/// Query parameters for the booked-periods listing.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct BookedPeriodsQuery {
    /// Target device.
    #[param(example = "front-door-lock")]
    pub device_id: String,
}

/// A device's booked periods.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookedPeriodsResponse {
    /// Every period with an issued code, in provider order.
    pub booked_periods: Vec<BookedPeriod>,
}

// ============================================================================
// Handlers
// ============================================================================

/// Check whether a time slot is available on a device.
#[utoipa::path(
    get,
    path = "/api/availability",
    tag = "availability",
    operation_id = "checkAvailability",
    summary = "Check if a time slot is available",
    params(AvailabilityQuery),
    responses(
        (status = 200, description = "Availability determined", body = AvailabilityResponse),
        (status = 400, description = "Malformed window", body = super::error::ErrorResponse)
    )
)]
pub async fn check_availability(
    State(state): State<AppState>,
    Query(query): Query<AvailabilityQuery>,
) -> ApiResult<Json<AvailabilityResponse>> {
    let start = parse_timestamp("starts_at", &query.starts_at)?;
    let end = parse_timestamp("ends_at", &query.ends_at)?;
    let window = TimeWindow::new(start, end).map_err(|err| {
        ApiError::bad_request("invalid_window", err.to_string())
    })?;

    let is_available = state
        .scheduler()
        .availability(&query.device_id, &window)
        .await?;
    Ok(Json(AvailabilityResponse { is_available }))
}

/// List the booked periods on a device.
#[utoipa::path(
    get,
    path = "/api/booked-periods",
    tag = "availability",
    operation_id = "getBookedPeriods",
    summary = "List booked periods for a device",
    params(BookedPeriodsQuery),
    responses(
        (status = 200, description = "Periods retrieved", body = BookedPeriodsResponse)
    )
)]
pub async fn booked_periods(
    State(state): State<AppState>,
    Query(query): Query<BookedPeriodsQuery>,
) -> ApiResult<Json<BookedPeriodsResponse>> {
    let booked_periods = state.scheduler().booked_periods(&query.device_id).await?;
    Ok(Json(BookedPeriodsResponse { booked_periods }))
}

fn parse_timestamp(field: &'static str, value: &str) -> Result<DateTime<Utc>, ApiError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| {
            ApiError::bad_request(
                "malformed_timestamp",
                format!("invalid timestamp for {field}: '{value}'"),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timestamp() {
        assert!(parse_timestamp("starts_at", "2025-06-01T14:00:00Z").is_ok());
        assert!(parse_timestamp("starts_at", "yesterday").is_err());
    }

    #[test]
    fn test_availability_response_serialization() {
        let json = serde_json::to_string(&AvailabilityResponse { is_available: false }).unwrap();
        assert!(json.contains("\"is_available\":false"));
    }
}
