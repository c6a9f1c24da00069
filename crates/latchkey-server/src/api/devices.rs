//! Device catalog API endpoint.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::state::AppState;

/// A managed device.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "device_id": "front-door-lock",
    "name": "Front Door Lock",
    "kind": "smart_lock"
}))]
pub struct DeviceResponse {
    /// Device identifier at the access code provider.
    #[schema(example = "front-door-lock")]
    pub device_id: String,

    /// Human-readable name.
    #[schema(example = "Front Door Lock")]
    pub name: String,

    /// Device kind.
    #[schema(example = "smart_lock")]
    pub kind: String,
}

/// List the configured devices.
#[utoipa::path(
    get,
    path = "/api/devices",
    tag = "devices",
    operation_id = "listDevices",
    summary = "List managed devices",
    responses(
        (status = 200, description = "Devices retrieved", body = Vec<DeviceResponse>)
    )
)]
pub async fn list_devices(State(state): State<AppState>) -> Json<Vec<DeviceResponse>> {
    let devices = state
        .config()
        .devices
        .iter()
        .map(|device| DeviceResponse {
            device_id: device.id.clone(),
            name: device.name.clone(),
            kind: device.kind.clone(),
        })
        .collect();
    Json(devices)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_response_serialization() {
        let response = DeviceResponse {
            device_id: "front-door-lock".to_owned(),
            name: "Front Door Lock".to_owned(),
            kind: "smart_lock".to_owned(),
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("front-door-lock"));
    }
}
