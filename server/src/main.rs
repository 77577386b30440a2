// Stockroom - inventory tracker with photo normalization
// Entry point and server setup

use anyhow::Context;
use stockroom::config::Settings;
use stockroom::services::seed;
use stockroom::{app, handlers};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stockroom=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Stockroom");

    let settings = Settings::from_env().context("invalid configuration")?;
    let addr = settings.addr;
    let seed_demo = settings.seed_demo;

    let state = app::setup(settings)
        .await
        .context("failed to initialize application")?;

    if seed_demo {
        seed::seed_demo_items(&state.repo)
            .await
            .context("failed to seed demo items")?;
    }

    match state.stock.photos().find_orphaned_blobs().await {
        Ok(orphans) if !orphans.is_empty() => {
            tracing::warn!("{} stored photo file(s) have no record", orphans.len());
            for key in &orphans {
                tracing::debug!("Orphaned photo file: {}", key);
            }
        }
        Ok(_) => {}
        Err(e) => tracing::warn!("Orphan scan failed: {}", e),
    }

    let router = handlers::create_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, router).await.context("server error")?;

    Ok(())
}
