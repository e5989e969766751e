use crate::models::event::UserContent;
use crate::State as MyState;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use tracing::error;

/// Runs a completion inline. Always 200; failures leave the body empty.
#[tracing::instrument(skip_all)]
pub async fn test_handler(State(state): State<MyState>, body: Bytes) -> impl IntoResponse {
    let answer = match serde_json::from_slice::<UserContent>(&body) {
        Ok(UserContent { text }) => state.completion.complete(&text).await.unwrap_or_else(|err| {
            error!(%err, "Completion failed");
            String::new()
        }),
        Err(err) => {
            error!(%err, "Failed to decode test request");
            String::new()
        }
    };
    ([(CONTENT_TYPE, "application/json")], answer)
}
