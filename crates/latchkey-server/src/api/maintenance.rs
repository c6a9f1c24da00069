//! Maintenance API endpoints.
//!
//! Administrative operations normally driven by the periodic cleanup
//! task: revoking expired codes, reconciling booking statuses, and
//! identifying consecutive booking runs.

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use chrono::Utc;
use latchkey_core::ProviderCode;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::error::ApiResult;
use crate::state::AppState;

/// Creates the maintenance router with all endpoints.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/cleanup", post(cleanup_expired))
        .route("/consecutive", post(consecutive_bookings))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for a cleanup pass.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[schema(example = json!({ "device_id": "front-door-lock" }))]
pub struct CleanupRequest {
    /// Restrict the pass to one device; all configured devices otherwise.
    pub device_id: Option<String>,
}

/// Result of a cleanup pass.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "success": true,
    "deleted_codes": ["ac_6f1c"],
    "bookings_expired": 1
}))]
pub struct CleanupResponse {
    /// Whether the pass completed.
    pub success: bool,

    /// Provider code ids that were revoked.
    pub deleted_codes: Vec<String>,

    /// Bookings whose stored status flipped to expired.
    pub bookings_expired: usize,
}

/// Request body for consecutive-booking detection.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[schema(example = json!({ "device_id": "front-door-lock" }))]
pub struct ConsecutiveRequest {
    /// Device to inspect.
    pub device_id: String,
}

/// Consecutive booking groups on a device.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ConsecutiveGroupsResponse {
    /// Maximal runs of back-to-back bookings, each at least two long.
    pub consecutive_booking_groups: Vec<Vec<ProviderCode>>,
}

// ============================================================================
// Handlers
// ============================================================================

/// Revoke expired codes and reconcile booking statuses.
///
/// Code revocation is best-effort per code; the response reports what was
/// actually revoked.
#[utoipa::path(
    post,
    path = "/api/maintenance/cleanup",
    tag = "maintenance",
    operation_id = "cleanupExpired",
    summary = "Clean up expired codes and bookings",
    request_body = CleanupRequest,
    responses(
        (status = 200, description = "Cleanup completed", body = CleanupResponse),
        (status = 502, description = "Access code provider failure", body = super::error::ErrorResponse)
    )
)]
pub async fn cleanup_expired(
    State(state): State<AppState>,
    Json(request): Json<CleanupRequest>,
) -> ApiResult<Json<CleanupResponse>> {
    let now = Utc::now();

    let device_ids: Vec<String> = match request.device_id {
        Some(device_id) => vec![device_id],
        None => state
            .config()
            .devices
            .iter()
            .map(|device| device.id.clone())
            .collect(),
    };

    let mut deleted_codes = Vec::new();
    for device_id in &device_ids {
        deleted_codes.extend(
            state
                .scheduler()
                .purge_expired_codes(device_id, now)
                .await?,
        );
    }

    let bookings_expired = state.scheduler().reconcile_expired(now).await?;

    Ok(Json(CleanupResponse {
        success: true,
        deleted_codes,
        bookings_expired,
    }))
}

/// Identify consecutive booking runs on a device.
#[utoipa::path(
    post,
    path = "/api/maintenance/consecutive",
    tag = "maintenance",
    operation_id = "consecutiveBookings",
    summary = "Group back-to-back bookings",
    request_body = ConsecutiveRequest,
    responses(
        (status = 200, description = "Groups computed", body = ConsecutiveGroupsResponse)
    )
)]
pub async fn consecutive_bookings(
    State(state): State<AppState>,
    Json(request): Json<ConsecutiveRequest>,
) -> ApiResult<Json<ConsecutiveGroupsResponse>> {
    let consecutive_booking_groups = state
        .scheduler()
        .consecutive_bookings(&request.device_id)
        .await?;
    Ok(Json(ConsecutiveGroupsResponse {
        consecutive_booking_groups,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cleanup_request_without_device() {
        let request: CleanupRequest = serde_json::from_str("{}").unwrap();
        assert!(request.device_id.is_none());
    }

    #[test]
    fn test_cleanup_response_serialization() {
        let response = CleanupResponse {
            success: true,
            deleted_codes: vec!["ac_1".to_owned()],
            bookings_expired: 2,
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"bookings_expired\":2"));
    }
}
