use crate::models::event::Inbound;
use crate::services::{completion::Completion, feishu::Delivery, feishu::Feishu};
use chrono::Utc;
use color_eyre::Report;
use tap::Tap;
use tracing::{info, warn, Instrument};

/// Answers `inbound` and posts the answer back into its chat.
///
/// # Errors
///
/// The completion failed or the reply could not be sent.
#[tracing::instrument(skip_all, fields(chat_id = %inbound.chat_id, message_id = %inbound.message_id))]
pub async fn relay(
    completion: &Completion,
    feishu: &Feishu,
    inbound: &Inbound,
) -> Result<Delivery, Report> {
    if let Some(created_at) = inbound.created_at {
        let age_ms = Utc::now().signed_duration_since(created_at).num_milliseconds();
        info!(age_ms, "Relaying message");
    }

    let answer = completion.complete(&inbound.text).await?;
    let delivery = feishu
        .send_text(&inbound.chat_id, &inbound.message_id, &answer)
        .await?
        .tap(|delivery| match delivery {
            Delivery::Accepted => info!("Reply delivered"),
            Delivery::Rejected { status, body } => {
                warn!(%status, %body, "Feishu rejected the reply");
            }
        });
    Ok(delivery)
}

/// Runs [`relay`] on its own task, detached from the request that produced
/// `inbound`. Failures end up in the log and nowhere else.
pub fn spawn(completion: Completion, feishu: Feishu, inbound: Inbound) {
    let span = tracing::info_span!("background_relay");
    tokio::spawn(
        async move {
            if let Err(err) = relay(&completion, &feishu, &inbound).await {
                tracing::error!("{err:?}");
            }
        }
        .instrument(span),
    );
}
