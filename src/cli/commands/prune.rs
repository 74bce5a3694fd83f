use anyhow::Context;
use serde_json::json;

use super::print_output;
use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::database::{self, repository::{ContactRepository, StatsRepository}};
use crate::logging::init_tracing;
use crate::state::Stores;

/// Hard-delete expired contact submissions and stats past the retention horizon.
pub async fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("invalid configuration")?;
    init_tracing(&config.logging);

    let pool = database::connect(config.require_database_url()?, config.database.max_connections)
        .await
        .context("failed to connect to database")?;
    let stores = Stores::postgres(pool);
    let limits = &config.limits;

    let contact = ContactRepository::new(
        stores.contact,
        limits.contact_daily_limit,
        limits.contact_retention_days,
    );
    let stats = StatsRepository::new(stores.stats, limits.stats_retention_days);

    let contact_deleted = contact.prune_expired().await?;
    let stats_deleted = stats.prune().await?;

    print_output(
        output_format,
        json!({ "contact_submissions": contact_deleted, "visitor_stats": stats_deleted }),
        format!(
            "pruned {} contact submissions and {} visitor stats",
            contact_deleted, stats_deleted
        ),
    );
    Ok(())
}
