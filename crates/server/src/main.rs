//! Formbox server binary.

use anyhow::{Context, Result};
use clap::Parser;
use figment::Figment;
use figment::providers::{Env, Format, Toml};
use formbox_core::config::AppConfig;
use formbox_server::bootstrap::ensure_admin_key;
use formbox_server::{AppState, create_router};
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Formbox - A form intake service
#[derive(Parser, Debug)]
#[command(name = "formboxd")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(
        short,
        long,
        env = "FORMBOX_CONFIG",
        default_value = "config/server.toml"
    )]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Startup banner
    tracing::info!("Formbox v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration (file is optional, env vars can provide/override everything)
    let config_path = std::path::Path::new(&args.config);
    let mut figment = Figment::new();
    let has_config_file = config_path.exists();

    if has_config_file {
        tracing::info!(config_path = %args.config, "Loading configuration from file");
        figment = figment.merge(Toml::file(&args.config));
    } else {
        tracing::debug!("No config file found at {}", args.config);
    }

    // Check for FORMBOX_ environment variables (excluding FORMBOX_CONFIG which is just the path)
    let has_env_config =
        std::env::vars().any(|(key, _)| key.starts_with("FORMBOX_") && key != "FORMBOX_CONFIG");

    if !has_config_file && !has_env_config {
        anyhow::bail!(
            "No configuration provided.\n\n\
             Provide configuration via one of:\n  \
             1. Config file: formboxd --config /path/to/config.toml\n  \
             2. Environment variables: FORMBOX_SERVER__BIND=0.0.0.0:8080 \
             FORMBOX_ADMIN__KEY_HASH=sha256:YOUR_KEY_HASH_HERE formboxd\n\n\
             See config/server.example.toml for example configuration.\n\
             Set FORMBOX_CONFIG env var to specify a default config file path."
        );
    }

    if !has_config_file {
        tracing::info!("Using environment variables for configuration");
    }

    let config: AppConfig = figment
        .merge(Env::prefixed("FORMBOX_").split("__"))
        .extract()
        .context("failed to load configuration")?;

    // Initialize the store
    let store = formbox_store::from_config(&config.store)
        .await
        .context("failed to initialize store")?;
    tracing::info!("Store initialized");

    // Verify store connectivity before accepting requests. This catches
    // configuration errors early, preventing the server from reporting
    // healthy when the database is unreachable.
    store
        .health_check()
        .await
        .context("store health check failed")?;
    tracing::info!("Store connectivity verified");

    // Initialize admin API key
    ensure_admin_key(store.as_ref(), &config.admin).await?;

    // Create application state
    let state = AppState::new(config.clone(), store)?;

    // Create router
    let app = create_router(state);

    // Parse bind address
    let addr: SocketAddr = config.server.bind.parse().context("invalid bind address")?;

    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {}", addr))?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
