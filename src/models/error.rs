use std::{io, process::ExitStatus};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EventError {
    #[error("error unmarshaling event: {source}")]
    Decode {
        #[from]
        source: serde_json::Error,
    },
    #[error("event is missing field `{0}`")]
    MissingField(&'static str),
    #[error("message content is not {{\"text\": string}}: {source}")]
    Content { source: serde_json::Error },
}

#[derive(Error, Debug)]
pub enum CompletionError {
    #[error("empty prompt")]
    EmptyPrompt,
    #[error("failed to spawn `{program}`: {source}")]
    Spawn { program: String, source: io::Error },
    #[error("error reading completion output: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
    #[error("completion process exited with {status}: {output}")]
    Exit { status: ExitStatus, output: String },
    #[error("completion did not finish within {secs}s")]
    Timeout { secs: u64 },
    #[error("completion request failed: {source}")]
    Http {
        #[from]
        source: reqwest::Error,
    },
    #[error("completion response has no choices")]
    NoChoices,
    #[error("backend `openai` needs an API key")]
    MissingApiKey,
}

#[derive(Error, Debug)]
pub enum FeishuError {
    #[error("request to Feishu failed: {source}")]
    Http {
        #[from]
        source: reqwest::Error,
    },
    #[error("error (un)marshaling Feishu payload: {source}")]
    SerdeJson {
        #[from]
        source: serde_json::Error,
    },
}
