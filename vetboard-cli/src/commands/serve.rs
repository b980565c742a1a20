//! HTTP server command
//!
//! Loads configuration, migrates the schema, then serves until shutdown.

use std::net::SocketAddr;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;

use vetboard_server::db::{create_pool_with_options, migrations};
use vetboard_server::{run_server, ServerConfig};

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to (overrides config and VETBOARD_BIND)
    #[arg(long, short = 'b')]
    pub bind: Option<SocketAddr>,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,

    /// Database URL (overrides config/environment)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Skip schema migrations on startup
    #[arg(long)]
    pub skip_migrations: bool,
}

/// Apply command-line flags on top of the loaded configuration.
pub fn apply_args(config: &mut ServerConfig, args: &ServeArgs) {
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if let Some(url) = &args.database_url {
        config.database_url = url.clone();
    }
    if args.cors_permissive {
        config.cors_permissive = true;
    }
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs, config_path: Option<&Path>) -> Result<()> {
    let mut config = ServerConfig::load(config_path).context("Failed to load configuration")?;
    apply_args(&mut config, &args);
    config.validate().context("Invalid configuration")?;

    if config.cors_permissive {
        tracing::warn!("CORS is permissive: any origin may call the API");
    }

    let pool = create_pool_with_options(&config.database_url, config.max_connections)
        .await
        .context("Failed to create database pool")?;

    if args.skip_migrations {
        tracing::info!("Skipping migrations");
    } else {
        migrations::run(&pool)
            .await
            .context("Failed to run migrations")?;
    }

    tracing::info!("Starting vetboard server on {}", config.bind_addr);

    // Blocks until shutdown
    run_server(pool, config).await.context("Server error")?;

    Ok(())
}
