pub mod config;

pub mod handlers {
    mod event;
    pub use event::event_handler;
    mod ping;
    pub use ping::ping_handler;
    mod test_endpoint;
    pub use test_endpoint::test_handler;
}

pub mod models {
    pub mod error;
    pub use error::{CompletionError, EventError, FeishuError};

    pub mod event;
    pub use event::{Event, Inbound};

    pub mod message;
    pub use message::Message;

    pub mod report;

    pub mod token;
}

pub mod services {
    pub mod completion;
    pub mod feishu;
    pub mod relay;
}

use axum::http::StatusCode;
use axum::routing::{any, get, Router};
use color_eyre::eyre::Result;
use handlers::{event_handler, ping_handler, test_handler};
use opentelemetry::KeyValue;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{runtime, trace, Resource};
use services::{completion::Completion, feishu::Feishu};
use std::time::Duration;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};
use tracing_error::ErrorLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};
use tracing_tree::HierarchicalLayer;

#[tracing::instrument]
#[allow(clippy::expect_used, clippy::redundant_pub_crate)]
pub async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
        info!("Ctrl-C received");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
        info!("Signal is received");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Starting graceful shutdown");
}

#[tracing::instrument]
async fn fallback(uri: axum::http::Uri) -> impl axum::response::IntoResponse {
    let status = StatusCode::NOT_FOUND;
    warn!(
        %status,
        %uri,
        "Failed to serve",
    );
    (status, format!("No route {uri}"))
}

#[derive(Clone, Debug)]
pub struct State {
    pub feishu: Feishu,
    pub completion: Completion,
}

#[allow(clippy::missing_errors_doc)]
pub fn setup_tracing(settings: &feishu_relay_cfg::Config) -> Result<()> {
    let default_level = if settings.debug { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env()
        .map_or_else(|_| EnvFilter::new(default_level), |env_filter| env_filter);

    let telemetry_layer = settings
        .otlp
        .then(|| {
            opentelemetry_otlp::new_pipeline()
                .tracing()
                .with_exporter(opentelemetry_otlp::new_exporter().tonic().with_env())
                .with_trace_config(trace::config().with_resource(Resource::new(vec![
                    KeyValue::new("service.name", "feishu-relay"),
                ])))
                .install_batch(runtime::Tokio)
        })
        .transpose()?
        .map(|tracer| tracing_opentelemetry::layer().with_tracer(tracer));

    Registry::default()
        .with(env_filter)
        .with(
            HierarchicalLayer::new(2)
                .with_targets(true)
                .with_bracketed_fields(true),
        )
        .with(ErrorLayer::default())
        .with(telemetry_layer)
        .init();

    info!(otlp = settings.otlp, "Initialized tracing and logging systems");

    Ok(())
}

#[tracing::instrument(skip(application))]
pub fn setup_app(application: &config::Application) -> Result<Router> {
    let settings = &application.base;

    let reqwest_client = reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .build()?;
    info!("Created reqwest client");

    let feishu = Feishu::new(
        reqwest_client.clone(),
        settings.feishu_base_url.as_str(),
        settings.app_id.as_str(),
        application.app_secret.clone(),
    );
    debug!(?feishu, "Created Feishu client");

    let completion = Completion::from_settings(
        &settings.completion,
        application.completion_api_key.clone(),
        reqwest_client,
    )?;
    info!(backend = ?settings.completion.backend, "Created completion backend");

    let state = State { feishu, completion };

    Ok(Router::new()
        .fallback(fallback)
        .route("/event", any(event_handler))
        .route("/test", any(test_handler))
        .route("/ping", get(ping_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}
