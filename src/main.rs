//! Database maintenance entrypoint
//!
//! Initializes the data directory and brings the schema up to date, the
//! local equivalent of the deployment migration step. The serving API layer
//! embeds the library directly.

use mythweaver_core::config::AppConfig;
use mythweaver_core::database::{migrations, Database};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load();
    let data_dir = config.data_dir();

    let _log_guard = mythweaver_core::core::logging::init(&data_dir.join("logs"));
    tracing::info!("MythWeaver core v{} starting", mythweaver_core::VERSION);
    tracing::info!(
        free_daily = config.storyfire.free_daily,
        cost_per_action = config.storyfire.cost_per_action,
        "Storyfire economy"
    );

    let db = Database::new(&data_dir).await?;
    let version = migrations::current_version(db.pool()).await?;

    println!(
        "Database ready at {} (schema v{})",
        data_dir.join("mythweaver.db").display(),
        version
    );
    Ok(())
}
