use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};
use word_relay::TranslationRelay;

mod config;
mod routes;

use config::ServerConfig;
use routes::{AppState, router};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env file is fine; the environment may already be set
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env()
        .map_err(|e| format!("Failed to read configuration: {}", e))?;
    let relay = config
        .build_relay()
        .map_err(|e| format!("Failed to initialize relay: {}", e))?;

    info!(
        provider = relay.provider_name(),
        dictionary_words = relay.normalizer().dictionary().len(),
        max_concurrent = config.dispatch.max_concurrent,
        "Starting word-relay web server"
    );

    let relay = Arc::new(relay);
    let app = router(AppState {
        relay: Arc::clone(&relay),
    });

    let listener = tokio::net::TcpListener::bind(config.addr()).await?;
    info!("Translation service is running on http://{}", config.addr());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(relay))
        .await?;

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM, then stop the relay from starting new calls
async fn shutdown_signal(relay: Arc<TranslationRelay>) {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                error!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C signal"),
        () = terminate => info!("Received SIGTERM signal"),
    }

    info!("Shutdown signal received, draining in-flight requests");
    relay.shutdown();
}
