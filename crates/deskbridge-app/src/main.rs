use std::sync::Arc;

use salvo::conn::TcpListener;
use salvo::logging::Logger;
use salvo::{Listener, Router};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, reload, util::SubscriberInitExt};

use deskbridge_app::app::api::{CHATWOOT_WEBHOOK_PATH, routes};
use deskbridge_app::config::ConfigHandler;
use deskbridge_app::sync_handler::{EventRouterHandler, build_event_router};
use deskbridge_core::config::load_config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (filter_layer, filter_handle) = reload::Layer::new(EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
        .init();

    tracing::info!("Starting Deskbridge webhook sync");

    let config = load_config()?;

    tracing::info!(config = ?config, "Configuration loaded");

    if let Ok(filter) = EnvFilter::try_new(config.logging.level.as_str()) {
        if let Err(e) = filter_handle.modify(|current| *current = filter) {
            tracing::warn!(error = %e, "Failed to update log filter from config");
        }
    } else {
        tracing::warn!(level = %config.logging.level, "Invalid log level in config, keeping debug");
    }

    config.validate()?;

    let event_router = build_event_router(&config)?;

    let bind_addr = config.server.bind_addr();
    let acceptor = TcpListener::new(bind_addr.clone()).bind().await;

    let router = Router::new()
        .hoop(Logger::new())
        .hoop(ConfigHandler::new(config))
        .hoop(EventRouterHandler {
            router: Arc::new(event_router),
        })
        .push(routes());

    tracing::info!("Server listening on {bind_addr}, webhooks at {CHATWOOT_WEBHOOK_PATH}");

    salvo::Server::new(acceptor).serve(router).await;

    Ok(())
}
