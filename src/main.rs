//! CESIZen authentication server.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;

use clap::Parser;
use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, fmt};

use cesizen_api::AppState;
use cesizen_core::config::AppConfig;
use cesizen_core::error::AppError;
use cesizen_core::{Clock, SystemClock};
use cesizen_database::open_store;
use cesizen_service::{LoggingResetNotifier, RetryPolicy, Services};

/// Command line options.
#[derive(Debug, Parser)]
#[command(name = "cesizen-server", version, about = "CESIZen authentication and identity service")]
struct Cli {
    /// Base configuration file.
    #[arg(long, env = "CESIZEN_CONFIG", default_value = "config/default.toml")]
    config: String,

    /// Environment overlay loaded from `config/{env}.toml`.
    #[arg(long, env = "CESIZEN_ENV", default_value = "development")]
    env: String,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match AppConfig::load(&cli.config, &cli.env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);
    tracing::info!(config = %cli.config, env = %cli.env, "Configuration loaded");

    if let Err(e) = run(config).await {
        tracing::error!(kind = %e.kind, error = %e.message, "Server error");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting CESIZen v{}", env!("CARGO_PKG_VERSION"));
    let config = Arc::new(config);

    // ── Step 1: Credential store + migrations ────────────────────
    tracing::info!("Opening credential store...");
    let store = RetryPolicy::from_config(&config.store)
        .run("open_store", || open_store(&config.store))
        .await?;
    tracing::info!(backend = store.backend(), "Credential store ready");

    // ── Step 2: Services ─────────────────────────────────────────
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let notifier = Arc::new(LoggingResetNotifier::new(config.auth.expose_reset_tokens));
    let services = Services::build(&config, store, clock, notifier)?;
    tracing::info!("Services initialized");

    // ── Step 3: Bootstrap admin ──────────────────────────────────
    let outcome = services.accounts.bootstrap_admin(&config.admin).await?;
    tracing::info!(outcome = ?outcome, "Admin bootstrap complete");

    // ── Step 4: Shutdown channel & housekeeper ───────────────────
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let housekeeper = services.housekeeper.clone();
    let housekeeper_handle = tokio::spawn(housekeeper.run(shutdown_rx));

    // ── Step 5: Build and start HTTP server ──────────────────────
    let app = cesizen_api::build_app(AppState::new(Arc::clone(&config), &services));
    let served = cesizen_api::serve(&config.server, app, shutdown_tx).await;

    // ── Step 6: Drain background tasks & close store ─────────────
    let grace = std::time::Duration::from_secs(config.server.shutdown_grace_seconds);
    if tokio::time::timeout(grace, housekeeper_handle).await.is_err() {
        tracing::warn!("Housekeeper did not stop within the grace period");
    }

    services.store.close().await;

    served?;
    tracing::info!("CESIZen shut down cleanly");
    Ok(())
}
