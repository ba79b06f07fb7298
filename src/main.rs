use anyhow::Context;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use stockfolio::api::routes::{AppState, app_router};
use stockfolio::config::Config;
use stockfolio::oracle::{GoogleNewsFeed, YahooPriceOracle};
use stockfolio::persistence::create_pool_and_migrate;
use stockfolio::valuation::ValuationEngine;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env();

    // The store must be ready before the surface accepts a single request.
    let pool = create_pool_and_migrate(&config.database_url)
        .await
        .context("failed to initialize ledger store")?;
    info!("ledger store ready at {}", config.database_url);

    let prices = Arc::new(
        YahooPriceOracle::new(&config.price_base_url, config.http_timeout)
            .context("failed to build price oracle client")?,
    );
    let news = Arc::new(
        GoogleNewsFeed::new(&config.news_base_url, config.http_timeout)
            .context("failed to build news feed client")?,
    );

    let engine = Arc::new(ValuationEngine::new(
        pool.clone(),
        prices.clone(),
        news.clone(),
        config.fetch_timeout,
    ));

    let state = AppState {
        pool: pool.clone(),
        engine,
        prices,
        news,
    };

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    info!("listening on {}", config.bind_addr);

    axum::serve(listener, app_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    pool.close().await;
    info!("ledger store closed");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown signal received");
    }
}
