use price_service::cache::MemoryPriceCache;
use price_service::clock::SystemClock;
use price_service::config::Config;
use price_service::handlers::AppState;
use price_service::listing::ListingDirectory;
use price_service::service::PriceService;

use common::http_client::HttpClient;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env();
    common::tracing::init(config.log_format);

    let http_client = HttpClient::new(
        &config.user_agent,
        &config.accept_language,
        config.fetch_timeout_seconds.map(Duration::from_secs),
        config.fetch_max_retries,
    )?;
    let cache = Arc::new(MemoryPriceCache::with_ttl(config.cache_ttl_seconds));
    let service = Arc::new(PriceService::new(
        http_client,
        cache,
        Arc::new(SystemClock),
        ListingDirectory::with_base_url(&config.listing_base_url),
        config.edge_cache_max_age_seconds,
    ));

    let app = price_service::router(AppState { service });

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Price service starting on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Price service stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT, starting graceful shutdown...");
        },
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown...");
        },
    }
}
