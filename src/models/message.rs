use super::event::UserContent;
use derive_more::Display;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Display)]
#[serde(rename_all = "lowercase")]
pub enum MsgType {
    #[display(fmt = "text")]
    Text,
}

/// Body of `POST /im/v1/messages`.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct Message {
    pub receive_id: String,
    pub msg_type: MsgType,
    /// JSON-encoded, so the wire carries a string inside a string.
    pub content: String,
    pub uuid: String,
}

impl Message {
    /// # Errors
    ///
    /// `serde_json::Error` if the content cannot be encoded.
    pub fn text(receive_id: &str, uuid: &str, text: &str) -> serde_json::Result<Self> {
        let content = serde_json::to_string(&UserContent {
            text: text.to_owned(),
        })?;
        Ok(Self {
            receive_id: receive_id.to_owned(),
            msg_type: MsgType::Text,
            content,
            uuid: uuid.to_owned(),
        })
    }
}
