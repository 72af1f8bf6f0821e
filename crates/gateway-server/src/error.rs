//! HTTP status mapping for `GatewayError` (§7). This is the only place in
//! the binary crate that knows about HTTP — the engine's error enum itself
//! carries no such dependency.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use gateway_runtime::GatewayError;

pub struct ApiError(pub GatewayError);

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        ApiError(err)
    }
}

/// `POST /servers` admits with `admit_strict`, whose failure is a pure
/// config problem rather than a `GatewayError` — map it to 400 directly
/// rather than stretching the engine's taxonomy to cover it.
pub fn config_error_response(err: gateway_config::ConfigError) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({ "error": err.to_string() })),
    )
        .into_response()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            GatewayError::ConfigInvalid(_, _) => StatusCode::BAD_REQUEST,
            GatewayError::SpawnFailed(_, _) => StatusCode::BAD_REQUEST,
            GatewayError::NotReady(_, _) => StatusCode::CONFLICT,
            GatewayError::NotFound(_) => StatusCode::NOT_FOUND,
            GatewayError::Conflict(_) => StatusCode::CONFLICT,
            GatewayError::RemoteError(_) => StatusCode::BAD_GATEWAY,
            GatewayError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            GatewayError::Expired(_) => StatusCode::GONE,
        };
        (status, Json(serde_json::json!({ "error": self.0.to_string() }))).into_response()
    }
}
