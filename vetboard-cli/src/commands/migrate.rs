//! Schema migration command

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;

use vetboard_server::db::{create_pool_with_options, migrations};
use vetboard_server::ServerConfig;

#[derive(Parser, Debug)]
pub struct MigrateArgs {
    /// Database URL (overrides config/environment)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Print the migration names without connecting
    #[arg(long)]
    pub list: bool,
}

/// Load configuration with the `--database-url` override applied.
fn migrate_config(args: &MigrateArgs, config_path: Option<&Path>) -> Result<ServerConfig> {
    let mut config = ServerConfig::load(config_path).context("Failed to load configuration")?;
    if let Some(url) = &args.database_url {
        config.database_url = url.clone();
    }
    Ok(config)
}

pub async fn run_migrate(args: MigrateArgs, config_path: Option<&Path>) -> Result<()> {
    if args.list {
        for name in migrations::names() {
            println!("{name}");
        }
        return Ok(());
    }

    let config = migrate_config(&args, config_path)?;
    let pool = create_pool_with_options(&config.database_url, config.max_connections)
        .await
        .context("Failed to connect to database")?;
    migrations::run(&pool)
        .await
        .context("Failed to run migrations")?;

    tracing::info!("Migrations complete");
    Ok(())
}
