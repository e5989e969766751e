use crate::models::{
    message::Message,
    token::{AppAccessToken, AppCredentials},
    FeishuError,
};
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info, warn};

const JSON_UTF8: &str = "application/json; charset=utf-8";

/// Outcome of a send the platform answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Accepted,
    Rejected { status: StatusCode, body: String },
}

#[derive(Clone, Debug)]
pub struct Feishu {
    client: reqwest::Client,
    base_url: String,
    app_id: String,
    app_secret: SecretString,
}

impl Feishu {
    #[must_use]
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        app_id: impl Into<String>,
        app_secret: SecretString,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            app_id: app_id.into(),
            app_secret,
        }
    }

    /// Fetches a fresh app access token. The `code` of the reply is not
    /// checked: whatever `app_access_token` holds is returned, even empty.
    ///
    /// # Errors
    ///
    /// Transport failure or a reply that is not JSON.
    #[tracing::instrument(skip(self), fields(app_id = %self.app_id))]
    pub async fn app_access_token(&self) -> Result<String, FeishuError> {
        let url = format!("{}/auth/v3/app_access_token/internal", self.base_url);
        let credentials = AppCredentials {
            app_id: &self.app_id,
            app_secret: self.app_secret.expose_secret(),
        };
        let body = serde_json::to_vec(&credentials)?;

        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, JSON_UTF8)
            .body(body)
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;
        info!(%status, "Got app access token response");
        debug!(body = %text);

        let token: AppAccessToken = serde_json::from_str(&text)?;
        if token.code != 0 {
            warn!(code = token.code, msg = %token.msg, "Feishu refused to issue a token");
        }
        Ok(token.app_access_token)
    }

    /// Posts `text` into `chat_id`. `uuid` makes the send idempotent on the
    /// platform side.
    ///
    /// # Errors
    ///
    /// Token retrieval, serialization or transport failure. A non-2xx reply is
    /// a [`Delivery::Rejected`], not an error.
    #[tracing::instrument(skip(self, text))]
    pub async fn send_text(
        &self,
        chat_id: &str,
        uuid: &str,
        text: &str,
    ) -> Result<Delivery, FeishuError> {
        let message = Message::text(chat_id, uuid, text)?;
        let body = serde_json::to_vec(&message)?;
        let token = self.app_access_token().await?;

        let response = self
            .client
            .post(format!("{}/im/v1/messages", self.base_url))
            .query(&[("receive_id_type", "chat_id")])
            .bearer_auth(token)
            .header(CONTENT_TYPE, JSON_UTF8)
            .body(body)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        info!(%status, %body, "Got send message response");

        if status.is_success() {
            Ok(Delivery::Accepted)
        } else {
            Ok(Delivery::Rejected { status, body })
        }
    }
}
