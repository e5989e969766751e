use crate::models::report::Result;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

#[tracing::instrument]
pub async fn ping_handler() -> Result<impl IntoResponse> {
    Ok(Json(json!({ "message": "Status OK" })))
}
