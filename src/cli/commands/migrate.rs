use anyhow::Context;
use clap::Subcommand;
use serde_json::json;

use super::print_output;
use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::database;
use crate::logging::init_tracing;

#[derive(Subcommand)]
pub enum MigrateCommands {
    #[command(about = "Apply all pending migrations")]
    Up,

    #[command(about = "Revert all applied migrations")]
    Down,
}

pub async fn handle(cmd: MigrateCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("invalid configuration")?;
    init_tracing(&config.logging);

    let pool = database::connect(config.require_database_url()?, config.database.max_connections)
        .await
        .context("failed to connect to database")?;

    let direction = match cmd {
        MigrateCommands::Up => {
            database::migrate_up(&pool).await?;
            "up"
        }
        MigrateCommands::Down => {
            database::migrate_down(&pool).await?;
            "down"
        }
    };

    print_output(
        output_format,
        json!({ "migrated": direction }),
        format!("migrations {} complete", direction),
    );
    Ok(())
}
