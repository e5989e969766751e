#![allow(dead_code)]
use feishu_relay::config::Application;
use feishu_relay_cfg::{Completion, Config};
use once_cell::sync::Lazy;
use secrecy::SecretString;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;
use wiremock::{MockServer, Request};

pub const TOKEN_PATH: &str = "/auth/v3/app_access_token/internal";
pub const MESSAGES_PATH: &str = "/im/v1/messages";

/// Answers every prompt with `echo: <prompt>`.
static ECHO: Lazy<Completion> = Lazy::new(|| Completion {
    program: "sh".to_string(),
    args: vec!["-c".to_string(), r#"printf 'echo: %s' "$0""#.to_string()],
    timeout_secs: Some(10),
    ..Default::default()
});

pub async fn spawn_app(feishu_base_url: &str) -> SocketAddr {
    spawn_app_with(feishu_base_url, ECHO.clone()).await
}

pub async fn spawn_app_with(feishu_base_url: &str, completion: Completion) -> SocketAddr {
    let base = Config {
        address: SocketAddr::from(([127, 0, 0, 1], 0)),
        app_id: "cli_test".to_string(),
        feishu_base_url: feishu_base_url.to_owned(),
        completion,
        ..Default::default()
    };
    let application = Application::new(base, SecretString::from_str("s3cret").unwrap(), None);
    let app = feishu_relay::setup_app(&application).expect("Failed to set up app");
    let server = axum::Server::bind(&application.base.address).serve(app.into_make_service());
    let addr = server.local_addr();
    let _ = tokio::spawn(server);
    addr
}

pub fn receive_event(chat_id: &str, message_id: &str, content: &str) -> serde_json::Value {
    serde_json::json!({
        "schema": "2.0",
        "header": {
            "event_id": "f7984f25108f8137722bb63cee927e66",
            "event_type": "im.message.receive_v1",
            "create_time": "1608725989000",
            "app_id": "cli_test"
        },
        "event": {
            "sender": { "sender_id": { "open_id": "ou_1" }, "sender_type": "user" },
            "message": {
                "message_id": message_id,
                "create_time": "1609073151345",
                "chat_id": chat_id,
                "chat_type": "p2p",
                "message_type": "text",
                "content": content
            }
        }
    })
}

/// Polls until `count` requests hit `path`, or gives up after a few seconds.
pub async fn wait_for_requests(server: &MockServer, path: &str, count: usize) -> Vec<Request> {
    for _ in 0..50 {
        let matching: Vec<Request> = server
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|request| request.url.path() == path)
            .collect();
        if matching.len() >= count {
            return matching;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    panic!("expected {count} request(s) to {path}");
}
