use crate::models::event::{Event, Inbound};
use crate::services::relay;
use crate::State as MyState;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::{error, info};

#[tracing::instrument(skip_all, fields(%method, %uri))]
pub async fn event_handler(
    State(state): State<MyState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    info!(?headers, body = %String::from_utf8_lossy(&body), "Got request");
    if method == Method::GET {
        return StatusCode::NOT_IMPLEMENTED.into_response();
    }

    let event = match Event::from_slice(&body) {
        Ok(event) => event,
        Err(err) => {
            error!(%err, "Failed to decode event");
            return StatusCode::OK.into_response();
        }
    };
    if let Some(challenge) = event.challenge() {
        info!("Answering url_verification");
        return Json(json!({ "challenge": challenge })).into_response();
    }

    let event_id = event.event_id().map(ToOwned::to_owned);
    info!(
        ?event_id,
        event_type = ?event.event_type(),
        sender = ?event.sender_open_id(),
        chat_type = ?event.chat_type(),
        message_type = ?event.message_type(),
        "Got event"
    );
    let inbound = match Inbound::try_from(event) {
        Ok(inbound) => inbound,
        Err(err) => {
            error!(%err, ?event_id, "Unusable message event");
            return StatusCode::OK.into_response();
        }
    };
    info!(?event_id, chat_id = %inbound.chat_id, "Got message");

    relay::spawn(state.completion, state.feishu, inbound);
    StatusCode::OK.into_response()
}
