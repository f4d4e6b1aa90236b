//! Server runtime: tracing setup and the HTTP serve loop.
//!
//! The binary only parses CLI flags and loads configuration; everything
//! else lives here so tests and embedders can reuse it.

use std::sync::Arc;

use tracing::info;

use crate::config::AppConfig;
use crate::domain::ItemRepository;
use crate::interfaces::http::create_api_router;
use crate::shared::shutdown::ShutdownSignal;

/// Install the global tracing subscriber from the `[logging]` section.
///
/// `RUST_LOG` takes precedence over `logging.level`.
pub fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    match config.logging.format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }
}

/// Serve the REST API until `shutdown` is triggered.
pub async fn run(
    config: &AppConfig,
    repo: Arc<dyn ItemRepository>,
    shutdown: ShutdownSignal,
) -> std::io::Result<()> {
    let router = create_api_router(repo, config.pagination);

    let addr = config.server.address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("REST API server listening on http://{}", addr);
    info!(
        default_page_size = config.pagination.default_page_size,
        max_page_size = config.pagination.max_page_size,
        "Pagination configured"
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            shutdown.wait().await;
            info!("REST API server received shutdown signal");
        })
        .await?;

    info!("REST API server stopped");
    Ok(())
}
