//! Payloads Feishu posts to the event subscription URL.
//!
//! Every field is optional on the wire; [`Inbound`] is the validated subset a
//! reply needs.

use super::EventError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const URL_VERIFICATION: &str = "url_verification";

#[derive(Serialize, Deserialize, Debug, Default)]
pub struct Event {
    pub schema: Option<String>,
    pub header: Option<Header>,
    pub event: Option<MessageReceive>,
    /// Only set on the one-off `url_verification` handshake.
    pub r#type: Option<String>,
    pub challenge: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Default)]
pub struct Header {
    pub event_id: Option<String>,
    pub event_type: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Default)]
pub struct MessageReceive {
    pub sender: Option<Sender>,
    pub message: Option<EventMessage>,
}

#[derive(Serialize, Deserialize, Debug, Default)]
pub struct Sender {
    pub sender_id: Option<UserId>,
}

#[derive(Serialize, Deserialize, Debug, Default)]
pub struct UserId {
    pub open_id: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Default)]
pub struct EventMessage {
    pub message_id: Option<String>,
    /// Milliseconds since the epoch, as a string.
    pub create_time: Option<String>,
    pub chat_id: Option<String>,
    /// `p2p` or `group`.
    pub chat_type: Option<String>,
    pub message_type: Option<String>,
    /// JSON-encoded `{"text": ...}`.
    pub content: Option<String>,
}

/// What the user typed, as carried inside `EventMessage::content`.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct UserContent {
    pub text: String,
}

impl Event {
    /// # Errors
    ///
    /// Body is not a JSON event object.
    pub fn from_slice(body: &[u8]) -> Result<Self, EventError> {
        Ok(serde_json::from_slice(body)?)
    }

    /// The token to echo back if this is the subscription handshake.
    #[must_use]
    pub fn challenge(&self) -> Option<&str> {
        match self.r#type.as_deref() {
            Some(URL_VERIFICATION) => self.challenge.as_deref(),
            _ => None,
        }
    }

    #[must_use]
    pub fn event_id(&self) -> Option<&str> {
        self.header.as_ref()?.event_id.as_deref()
    }

    #[must_use]
    pub fn event_type(&self) -> Option<&str> {
        self.header.as_ref()?.event_type.as_deref()
    }

    #[must_use]
    pub fn sender_open_id(&self) -> Option<&str> {
        self.event.as_ref()?.sender.as_ref()?.sender_id.as_ref()?.open_id.as_deref()
    }

    #[must_use]
    pub fn chat_type(&self) -> Option<&str> {
        self.message()?.chat_type.as_deref()
    }

    #[must_use]
    pub fn message_type(&self) -> Option<&str> {
        self.message()?.message_type.as_deref()
    }

    fn message(&self) -> Option<&EventMessage> {
        self.event.as_ref()?.message.as_ref()
    }
}

/// A received text message, ready to be answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inbound {
    pub chat_id: String,
    pub message_id: String,
    pub text: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl TryFrom<Event> for Inbound {
    type Error = EventError;

    fn try_from(event: Event) -> Result<Self, Self::Error> {
        let message = event
            .event
            .and_then(|receive| receive.message)
            .ok_or(EventError::MissingField("event.message"))?;
        let content = message
            .content
            .ok_or(EventError::MissingField("event.message.content"))?;
        let UserContent { text } = serde_json::from_str(&content)
            .map_err(|source| EventError::Content { source })?;
        let chat_id = message
            .chat_id
            .ok_or(EventError::MissingField("event.message.chat_id"))?;
        let message_id = message
            .message_id
            .ok_or(EventError::MissingField("event.message.message_id"))?;
        let created_at = message
            .create_time
            .and_then(|millis| millis.parse::<i64>().ok())
            .and_then(DateTime::from_timestamp_millis);

        Ok(Self {
            chat_id,
            message_id,
            text,
            created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn receive_event(content: &str) -> String {
        serde_json::json!({
            "schema": "2.0",
            "header": {
                "event_id": "5e3702a84e847582be8db7fb73283c02",
                "event_type": "im.message.receive_v1",
                "create_time": "1608725989000",
                "app_id": "cli_9f5343c580712544",
                "tenant_key": "2ca1d211f64f6438"
            },
            "event": {
                "sender": {
                    "sender_id": { "open_id": "ou_84aad35d084aa403a838cf73ee18467" },
                    "sender_type": "user"
                },
                "message": {
                    "message_id": "om_5ce6d572455d361153b7cb51da133945",
                    "create_time": "1609073151345",
                    "chat_id": "oc_5ce6d572455d361153b7xx51da133945",
                    "chat_type": "group",
                    "message_type": "text",
                    "content": content
                }
            }
        })
        .to_string()
    }

    #[test]
    fn parses_text_message() {
        let body = receive_event(r#"{"text":"how are you"}"#);
        let event = Event::from_slice(body.as_bytes()).unwrap();
        assert_eq!(event.event_id(), Some("5e3702a84e847582be8db7fb73283c02"));
        assert_eq!(event.event_type(), Some("im.message.receive_v1"));
        assert_eq!(event.sender_open_id(), Some("ou_84aad35d084aa403a838cf73ee18467"));
        assert_eq!(event.chat_type(), Some("group"));
        assert_eq!(event.message_type(), Some("text"));
        assert_eq!(event.challenge(), None);

        let inbound = Inbound::try_from(event).unwrap();
        assert_eq!(inbound.chat_id, "oc_5ce6d572455d361153b7xx51da133945");
        assert_eq!(inbound.message_id, "om_5ce6d572455d361153b7cb51da133945");
        assert_eq!(inbound.text, "how are you");
        assert_eq!(
            inbound.created_at.map(|at| at.timestamp_millis()),
            Some(1_609_073_151_345)
        );
    }

    #[test_case(r#"{"text":""}"# => matches Ok(_); "when text is empty")]
    #[test_case(r#"{"text":"a b  c"}"# => matches Ok(_); "when text has spaces")]
    #[test_case(r#"{"image_key":"img_1"}"# => matches Err(EventError::Content { .. }); "when content is an image")]
    #[test_case(r#"{"text":5}"# => matches Err(EventError::Content { .. }); "when text is not a string")]
    #[test_case("how are you" => matches Err(EventError::Content { .. }); "when content is not json")]
    fn content_must_hold_text(content: &str) -> Result<Inbound, EventError> {
        let event = Event::from_slice(receive_event(content).as_bytes())?;
        Inbound::try_from(event)
    }

    #[test]
    fn missing_message_is_rejected() {
        let event = Event::from_slice(br#"{"schema":"2.0","event":{}}"#).unwrap();
        let err = Inbound::try_from(event).unwrap_err();
        assert!(matches!(err, EventError::MissingField("event.message")));
    }

    #[test]
    fn missing_chat_id_is_rejected() {
        let body = br#"{"event":{"message":{"message_id":"om_1","content":"{\"text\":\"hi\"}"}}}"#;
        let event = Event::from_slice(body).unwrap();
        let err = Inbound::try_from(event).unwrap_err();
        assert!(matches!(err, EventError::MissingField("event.message.chat_id")));
    }

    #[test]
    fn malformed_body_fails_to_decode() {
        assert!(matches!(
            Event::from_slice(b"{not json"),
            Err(EventError::Decode { .. })
        ));
        assert!(Event::from_slice(br#"["an", "array"]"#).is_err());
    }

    #[test]
    fn url_verification_yields_challenge() {
        let body = br#"{"challenge":"ajls384kdjx98XX","token":"xxxxxx","type":"url_verification"}"#;
        let event = Event::from_slice(body).unwrap();
        assert_eq!(event.challenge(), Some("ajls384kdjx98XX"));
    }

    #[test]
    fn challenge_ignored_without_verification_type() {
        let event = Event::from_slice(br#"{"challenge":"abc"}"#).unwrap();
        assert_eq!(event.challenge(), None);
    }
}
