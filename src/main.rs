use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use repo_relay::cache::QueryCache;
use repo_relay::config::Config;
use repo_relay::github::{GithubClient, HookReconciler};
use repo_relay::notify::DiscordSink;
use repo_relay::server::{build_router, AppState};
use repo_relay::store::MemoryStore;
use repo_relay::sync::SyncEngine;
use repo_relay::webhooks::EventRouter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "repo_relay=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    tracing::info!(?config, "configuration loaded");

    let client = GithubClient::from_token(&config.github_token, &config.github_owner)?;
    let store = Arc::new(MemoryStore::new());
    let cache = Arc::new(QueryCache::new());
    let sink = Arc::new(DiscordSink::new(&config.discord_webhook_url));

    let engine = Arc::new(SyncEngine::new(
        client.clone(),
        store.clone(),
        store.clone(),
        cache,
    ));
    let reconciler = Arc::new(HookReconciler::new(
        client,
        store.clone(),
        config.callback_url(),
        config.webhook_secret.clone(),
    ));
    let dispatcher = Arc::new(EventRouter::new(
        store.clone(),
        sink,
        config.default_channel.clone(),
    ));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let app_state = AppState::new(
        config,
        engine,
        reconciler,
        dispatcher,
        store.clone(),
        store,
    );
    let app = build_router(app_state);

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
