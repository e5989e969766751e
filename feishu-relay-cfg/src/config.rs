#![allow(clippy::expect_used)]
use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, str::FromStr};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub debug: bool,
    /// Export spans over OTLP in addition to the local tree logger.
    pub otlp: bool,
    pub address: SocketAddr,
    pub app_id: String,
    pub app_secret_file: Utf8PathBuf,
    pub feishu_base_url: String,
    pub completion: Completion,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debug: false,
            otlp: false,
            address: SocketAddr::from_str("0.0.0.0:33010")
                .expect("Default value for config should never panic!"),
            app_id: String::new(),
            app_secret_file: "/secrets/feishu-app-secret".into(),
            feishu_base_url: "https://open.feishu.cn/open-apis".to_string(),
            completion: Completion::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Run an external program with the prompt as its last argument.
    #[default]
    Script,
    /// Call an OpenAI-compatible chat completions endpoint.
    OpenAi,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Completion {
    pub backend: Backend,
    pub program: String,
    /// Passed before the prompt, which is always the final argument.
    pub args: Vec<String>,
    /// `None` or `0` waits forever.
    pub timeout_secs: Option<u64>,
    pub api_base: String,
    pub model: String,
    pub api_key_file: Option<Utf8PathBuf>,
}

impl Default for Completion {
    fn default() -> Self {
        Self {
            backend: Backend::Script,
            program: "python3".to_string(),
            args: vec!["openai_api.py".to_string()],
            timeout_secs: Some(120),
            api_base: "https://api.openai.com/v1".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            api_key_file: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg: Config = toml::from_str(
            r#"
            app_id = "cli_a1b2"

            [completion]
            backend = "openai"
            timeout_secs = 30
            "#,
        )
        .unwrap();

        assert_eq!(cfg.app_id, "cli_a1b2");
        assert_eq!(cfg.completion.backend, Backend::OpenAi);
        assert_eq!(cfg.completion.timeout_secs, Some(30));
        assert_eq!(cfg.completion.program, "python3");
        assert_eq!(cfg.address.port(), 33010);
    }

    #[test]
    fn default_renders_as_toml() {
        let rendered = toml::to_string(&Config::default()).unwrap();
        assert!(rendered.contains("[completion]"));
        assert!(rendered.contains(r#"backend = "script""#));
    }
}
