use camino::Utf8Path;
use color_eyre::Result;
use config::{Config, Environment, File};
use secrecy::SecretString;
use std::env;
use std::fs::read_to_string;
use tap::Tap;
use tracing::{debug, info};

pub const CONFIG_FILE_VAR: &str = "FEISHU_RELAY_CONFIG_FILE";

#[tracing::instrument]
pub fn new_config() -> Result<Application> {
    let config_file_path = env::var(CONFIG_FILE_VAR).unwrap_or_else(|error| {
        info!("{CONFIG_FILE_VAR} is not specified, using config.toml if present");
        debug!(?error);
        "config.toml".to_string()
    });

    let base = load_base(&config_file_path)?;

    let app_secret = read_secret(&base.app_secret_file)?;
    info!(app_secret_file = ?base.app_secret_file, "Read Feishu app secret");

    let completion_api_key = base
        .completion
        .api_key_file
        .as_deref()
        .map(read_secret)
        .transpose()?
        .tap(|key| debug!(has_api_key = key.is_some()));

    Ok(Application {
        base,
        app_secret,
        completion_api_key,
    })
}

/// File first, environment on top.
fn load_base(config_file_path: &str) -> Result<feishu_relay_cfg::Config> {
    let s = Config::builder()
        .add_source(File::with_name(config_file_path).required(false))
        .add_source(environment())
        .build()?;

    Ok(s.try_deserialize()?)
}

/// `FEISHU_RELAY_APP_ID`, `FEISHU_RELAY_COMPLETION__PROGRAM`, ...
fn environment() -> Environment {
    Environment::with_prefix("feishu_relay")
        .prefix_separator("_")
        .separator("__")
}

fn read_secret(path: &Utf8Path) -> Result<SecretString> {
    debug!(?path, "Reading secret");
    Ok(read_to_string(path)?.trim().to_owned().into())
}

#[derive(Clone, Debug)]
pub struct Application {
    pub base: feishu_relay_cfg::Config,
    pub app_secret: SecretString,
    pub completion_api_key: Option<SecretString>,
}

impl Application {
    #[must_use]
    pub fn new(
        base: feishu_relay_cfg::Config,
        app_secret: SecretString,
        completion_api_key: Option<SecretString>,
    ) -> Self {
        Self {
            base,
            app_secret,
            completion_api_key,
        }
    }
}
