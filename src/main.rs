use color_eyre::eyre::Result;
use feishu_relay::{config::new_config, setup_app, setup_tracing, shutdown_signal};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let application = new_config()?;
    setup_tracing(&application.base)?;

    let addr = application.base.address;
    let app = setup_app(&application)?;
    info!(%addr, "Server started listening");

    axum::Server::try_bind(&addr)?
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    opentelemetry::global::shutdown_tracer_provider();
    Ok(())
}
