//! REST Binding (C11): translates each route in §6 onto exactly one
//! `Gateway` facade call. No business logic, no process supervision lives
//! here — only HTTP shape and status mapping.

use crate::error::{config_error_response, ApiError};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use gateway_config::ServerConfigRaw;
use gateway_runtime::{telemetry, Gateway};
use serde::Deserialize;
use serde_json::Value;

pub fn router(gateway: Gateway) -> Router {
    Router::new()
        .route("/servers", get(list_servers).post(create_server))
        .route("/servers/:id", delete(remove_server))
        .route("/servers/:id/tools", get(list_tools))
        .route("/servers/:id/tools/:name", post(call_tool))
        .route("/servers/:id/resources", get(list_resources))
        .route("/servers/:id/resources/:uri", get(read_resource))
        .route("/servers/:id/prompts", get(list_prompts))
        .route("/servers/:id/prompts/:name", post(get_prompt))
        .route("/confirmations/:cid", post(resolve_confirmation))
        .route("/health", get(health))
        .with_state(gateway)
}

async fn list_servers(State(gateway): State<Gateway>) -> Json<Vec<Value>> {
    let snapshots = gateway.list_servers();
    Json(snapshots.iter().map(telemetry::server_to_json).collect())
}

async fn create_server(
    State(gateway): State<Gateway>,
    Json(body): Json<CreateServerBody>,
) -> Response {
    let config = match gateway_config::admit_strict(&body.id, body.raw) {
        Ok(config) => config,
        Err(e) => return config_error_response(e),
    };

    match gateway.start_server(&body.id, config).await {
        Ok(()) => (StatusCode::CREATED, Json(serde_json::json!({"id": body.id}))).into_response(),
        Err(e) => ApiError(e).into_response(),
    }
}

#[derive(Deserialize)]
struct CreateServerBody {
    id: String,
    #[serde(flatten)]
    raw: ServerConfigRaw,
}

async fn remove_server(
    State(gateway): State<Gateway>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    gateway.stop_server(&id).await?;
    Ok(StatusCode::OK)
}

async fn list_tools(
    State(gateway): State<Gateway>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let result = gateway.call(&id, "tools/list", serde_json::json!({}), false).await?;
    Ok(Json(result))
}

async fn list_resources(
    State(gateway): State<Gateway>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let result = gateway
        .call(&id, "resources/list", serde_json::json!({}), false)
        .await?;
    Ok(Json(result))
}

async fn read_resource(
    State(gateway): State<Gateway>,
    Path((id, uri)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    let uri = restore_encoded_slash(&uri);
    let result = gateway
        .call(&id, "resources/read", serde_json::json!({ "uri": uri }), false)
        .await?;
    Ok(Json(result))
}

async fn list_prompts(
    State(gateway): State<Gateway>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let result = gateway
        .call(&id, "prompts/list", serde_json::json!({}), false)
        .await?;
    Ok(Json(result))
}

async fn call_tool(
    State(gateway): State<Gateway>,
    Path((id, name)): Path<(String, String)>,
    Json(arguments): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let params = serde_json::json!({ "name": name, "arguments": arguments });
    let result = gateway.call(&id, "tools/call", params, false).await?;
    Ok(Json(result))
}

async fn get_prompt(
    State(gateway): State<Gateway>,
    Path((id, name)): Path<(String, String)>,
    Json(arguments): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let params = serde_json::json!({ "name": name, "arguments": arguments });
    let result = gateway.call(&id, "prompts/get", params, false).await?;
    Ok(Json(result))
}

#[derive(Deserialize)]
struct ConfirmBody {
    confirm: bool,
}

async fn resolve_confirmation(
    State(gateway): State<Gateway>,
    Path(cid): Path<String>,
    Json(body): Json<ConfirmBody>,
) -> Result<Json<Value>, ApiError> {
    let result = gateway.confirm(&cid, body.confirm).await?;
    Ok(Json(result))
}

async fn health(State(gateway): State<Gateway>) -> Json<Value> {
    let report = telemetry::health_report(&gateway);
    Json(serde_json::json!({
        "status": "ok",
        "uptime": report.uptime_seconds,
        "serverCount": report.server_count,
        "servers": report.servers,
    }))
}

/// axum's `Path` extractor already percent-decodes every escape in a
/// captured segment except the literal `%2F`, which it leaves encoded to
/// avoid ambiguity with the path separator. Only that token needs manual
/// handling here — running a generic percent-decoder over text axum already
/// decoded once would double-decode any already-decoded `%XX` sequence.
fn restore_encoded_slash(uri: &str) -> String {
    uri.replace("%2F", "/")
}
