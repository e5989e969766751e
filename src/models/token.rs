use serde::{Deserialize, Serialize};

/// Body of `auth/v3/app_access_token/internal`. Holds the exposed secret, so
/// it is built right before sending and never logged.
#[derive(Serialize)]
pub struct AppCredentials<'a> {
    pub app_id: &'a str,
    pub app_secret: &'a str,
}

/// Reply of `auth/v3/app_access_token/internal`. Absent fields fall back to
/// their zero values, so a failure reply yields an empty token.
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct AppAccessToken {
    pub app_access_token: String,
    pub code: i64,
    pub msg: String,
    pub expire: u64,
}
