//! REST pagination demo server
//!
//! Serves a seeded in-memory item collection through the paginated
//! `/api/v1/items` endpoints.
//!
//! ```sh
//! # Run with default config (~/.config/rest-pagination/config.toml)
//! rest-pagination
//!
//! # Custom config path and a larger collection
//! rest-pagination --config ./config.toml --items 5000
//!
//! # Validate config without starting
//! rest-pagination --check
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};

use rest_pagination::config::AppConfig;
use rest_pagination::infrastructure::InMemoryItemRepository;
use rest_pagination::server::{init_tracing, run};
use rest_pagination::shared::shutdown::ShutdownSignal;

#[derive(Parser, Debug)]
#[command(
    name = "rest-pagination",
    version,
    about = "Paginated REST API with X-Pagination metadata and ETags"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = "PAGINATION_CONFIG")]
    config: Option<PathBuf>,

    /// Override the listen port.
    #[arg(long)]
    port: Option<u16>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Number of sample items to seed the collection with.
    #[arg(long, default_value_t = 1000)]
    items: u64,

    /// Validate the configuration file and exit without starting the server.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .unwrap_or_else(rest_pagination::default_config_path);

    let loaded = AppConfig::load(&config_path);

    if cli.check {
        let mut config = loaded?;
        if let Some(port) = cli.port {
            config.server.port = port;
        }
        println!("Configuration is valid");
        println!("   Config file     : {}", config_path.display());
        println!("   Address         : {}", config.server.address());
        println!("   Default page sz : {}", config.pagination.default_page_size);
        println!("   Max page size   : {}", config.pagination.max_page_size);
        println!("   Log level       : {}", config.logging.level);
        return Ok(());
    }

    let mut config = match loaded {
        Ok(mut cfg) => {
            if let Some(ref level) = cli.log_level {
                cfg.logging.level = level.clone();
            }
            init_tracing(&cfg);
            info!("Configuration loaded from {}", config_path.display());
            cfg
        }
        Err(e) => {
            let mut cfg = AppConfig::default();
            if let Some(ref level) = cli.log_level {
                cfg.logging.level = level.clone();
            }
            init_tracing(&cfg);
            error!("Failed to load config from {}: {}", config_path.display(), e);
            error!("Using default configuration.");
            cfg
        }
    };

    if let Some(port) = cli.port {
        info!("CLI override: port = {}", port);
        config.server.port = port;
    }

    let repo = Arc::new(InMemoryItemRepository::with_sequence(cli.items));
    info!(items = cli.items, "Seeded in-memory item collection");

    let shutdown = ShutdownSignal::new();
    shutdown.listen_for_os_signals();

    run(&config, repo, shutdown).await?;
    Ok(())
}
