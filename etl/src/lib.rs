pub mod logging;
pub mod pipeline;
pub mod sources;
pub mod sql;
pub mod warehouse;

use common::Result;
use common::config::Settings;
use pipeline::RunReport;
use sources::SourceCheck;
use tracing::info;
use warehouse::WarehouseConnection;

/// Loads the staging tables, then fills the star schema from them.
pub async fn run_etl_pipeline(config_path: &str) -> Result<RunReport> {
    let settings = Settings::new(config_path)?;
    let mut report = RunReport::new();

    let mut connection = WarehouseConnection::connect(&settings.cluster).await?;
    pipeline::load_and_insert(&mut connection, &settings, &mut report).await;
    connection.close().await;

    report.finish();
    Ok(report)
}

/// Drops and recreates every staging and star-schema table.
pub async fn run_create_tables(config_path: &str) -> Result<RunReport> {
    let settings = Settings::new(config_path)?;
    let mut report = RunReport::new();

    let mut connection = WarehouseConnection::connect(&settings.cluster).await?;
    pipeline::reset_schema(&mut connection, &mut report).await;
    connection.close().await;

    report.finish();
    Ok(report)
}

/// Drop-all, create-all, load, insert on one connection.
pub async fn run_full_pipeline(config_path: &str) -> Result<RunReport> {
    let settings = Settings::new(config_path)?;
    let mut report = RunReport::new();

    let mut connection = WarehouseConnection::connect(&settings.cluster).await?;
    pipeline::reset_schema(&mut connection, &mut report).await;
    pipeline::load_and_insert(&mut connection, &settings, &mut report).await;
    connection.close().await;

    report.finish();
    info!(
        committed = report.committed_count(),
        failed = report.failed_count(),
        "Full pipeline finished"
    );
    Ok(report)
}

pub async fn run_source_check(config_path: &str) -> Result<Vec<SourceCheck>> {
    let settings = Settings::new(config_path)?;
    sources::check_sources(&settings).await
}
