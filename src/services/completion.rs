//! Turns a prompt into an answer, either by running a local program or by
//! calling an OpenAI-compatible chat completions API.

use crate::models::CompletionError;
use feishu_relay_cfg::Backend;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::io::{self, Read};
use std::{process::Stdio, time::Duration};
use tokio::process::Command;
use tracing::{debug, info};

#[derive(Clone, Debug)]
pub enum Completion {
    Script(Script),
    OpenAi(OpenAi),
}

impl Completion {
    /// # Errors
    ///
    /// [`CompletionError::MissingApiKey`] when the `openai` backend has no key.
    pub fn from_settings(
        settings: &feishu_relay_cfg::Completion,
        api_key: Option<SecretString>,
        client: reqwest::Client,
    ) -> Result<Self, CompletionError> {
        let timeout = settings
            .timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);
        Ok(match settings.backend {
            Backend::Script => Self::Script(Script {
                program: settings.program.clone(),
                args: settings.args.clone(),
                timeout,
            }),
            Backend::OpenAi => Self::OpenAi(OpenAi {
                client,
                api_base: settings.api_base.trim_end_matches('/').to_owned(),
                model: settings.model.clone(),
                api_key: api_key.ok_or(CompletionError::MissingApiKey)?,
                timeout,
            }),
        })
    }

    /// # Errors
    ///
    /// [`CompletionError::EmptyPrompt`] without touching the backend, otherwise
    /// whatever the backend fails with.
    #[tracing::instrument(skip(self))]
    pub async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        if prompt.is_empty() {
            return Err(CompletionError::EmptyPrompt);
        }
        let answer = match self {
            Self::Script(script) => script.run(prompt).await,
            Self::OpenAi(api) => api.chat(prompt).await,
        }?;
        info!(answer_length = answer.len(), "Got completion");
        Ok(answer)
    }
}

#[derive(Clone, Debug)]
pub struct Script {
    pub program: String,
    pub args: Vec<String>,
    pub timeout: Option<Duration>,
}

impl Script {
    async fn run(&self, prompt: &str) -> Result<String, CompletionError> {
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.combined_output(prompt))
                .await
                .map_err(|_| CompletionError::Timeout {
                    secs: limit.as_secs(),
                })?,
            None => self.combined_output(prompt).await,
        }
    }

    /// Stdout and stderr share one pipe, so the output keeps the exact order
    /// the child wrote it in.
    async fn combined_output(&self, prompt: &str) -> Result<String, CompletionError> {
        let (mut reader, writer) = io::pipe()?;
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .arg(prompt)
            .stdin(Stdio::null())
            .stdout(writer.try_clone()?)
            .stderr(writer)
            .kill_on_drop(true);
        let mut child = command.spawn().map_err(|source| CompletionError::Spawn {
            program: self.program.clone(),
            source,
        })?;
        // The command still owns our copies of the write end; EOF needs them gone.
        drop(command);
        debug!(pid = child.id(), "Spawned completion process");

        let combined = tokio::task::spawn_blocking(move || {
            let mut combined = Vec::new();
            reader.read_to_end(&mut combined).map(|_| combined)
        })
        .await
        .map_err(io::Error::other)??;

        let status = child.wait().await?;
        let output = String::from_utf8_lossy(&combined).into_owned();
        if status.success() {
            Ok(output)
        } else {
            Err(CompletionError::Exit { status, output })
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Serialize, Debug)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
}

#[derive(Deserialize, Debug)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize, Debug)]
struct Choice {
    message: ChatMessage,
}

#[derive(Clone, Debug)]
pub struct OpenAi {
    client: reqwest::Client,
    api_base: String,
    model: String,
    api_key: SecretString,
    timeout: Option<Duration>,
}

impl OpenAi {
    async fn chat(&self, prompt: &str) -> Result<String, CompletionError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_owned(),
            }],
        };
        let mut builder = self
            .client
            .post(format!("{}/chat/completions", self.api_base))
            .bearer_auth(self.api_key.expose_secret())
            .json(&request);
        if let Some(limit) = self.timeout {
            builder = builder.timeout(limit);
        }

        let response: ChatResponse = builder
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or(CompletionError::NoChoices)
    }
}
