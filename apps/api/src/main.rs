use std::sync::Arc;
use std::time::Duration;

use dotenv::dotenv;
use tokio::net::TcpListener;
use tower_http::cors::{CorsLayer, Any};
use tower_http::trace::{self, TraceLayer};
use tracing::{Level, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod router;

use conversation_cell::ConversationStore;
use shared_config::AppConfig;

/// Conversations untouched for this long are dropped.
const CONVERSATION_IDLE_MINUTES: i64 = 30;
const CONVERSATION_SWEEP_INTERVAL: Duration = Duration::from_secs(300);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Loading Env Vars
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Referral Hub API server");

    let config = AppConfig::from_env();
    if !config.is_configured() {
        warn!("Database or JWT settings are missing; signup and login will fail");
    }
    let bind_address = config.bind_address();

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let stores = router::Stores::default();
    spawn_conversation_sweeper(stores.conversations.clone());

    let app = router::create_router(Arc::new(config), stores)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(trace::DefaultMakeSpan::new()
                    .level(Level::INFO))
                .on_response(trace::DefaultOnResponse::new()
                    .level(Level::INFO)),
        )
        .layer(cors);

    let listener = TcpListener::bind(&bind_address).await?;
    info!("Listening on {}", bind_address);

    axum::serve(listener, app).await?;
    Ok(())
}

fn spawn_conversation_sweeper(store: ConversationStore) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(CONVERSATION_SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            store
                .purge_idle(chrono::Duration::minutes(CONVERSATION_IDLE_MINUTES))
                .await;
        }
    });
}
