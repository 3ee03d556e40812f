//! Expandable Chat - a floating support chat widget
//!
//! A Rust backend serving a collapsible chat panel whose conversation
//! answers every user message with a deferred agent reply.

mod api;
mod config;
mod panel;
mod render;
mod reply;
mod runtime;
mod state_machine;

use api::{create_router, AppState};
use config::WidgetConfig;
use reply::{CannedReply, LoggingReply};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "expandable_chat=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration
    let config = Arc::new(WidgetConfig::from_env()?);
    tracing::info!(
        reply_delay_ms = %config.reply_delay.as_millis(),
        reply_timeout_ms = %config.reply_timeout.as_millis(),
        idle_ttl_ms = %config.idle_ttl.as_millis(),
        position = %config.appearance.position,
        seed = config.seed_conversation,
        "Widget configuration loaded"
    );

    let reply_source = Arc::new(LoggingReply::new(Arc::new(CannedReply::new(
        config.reply_text.clone(),
    ))));

    // Create application state
    let state = AppState::new(Arc::clone(&config), reply_source);
    let _idle_sweep = state.registry.spawn_idle_sweep();

    // Create router
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let compression = CompressionLayer::new()
        .gzip(true)
        .br(true)
        .deflate(true)
        .zstd(true);

    let app = create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(compression);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Expandable chat server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
