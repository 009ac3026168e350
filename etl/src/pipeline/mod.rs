//! Sequential statement execution against a single warehouse connection.
//!
//! Every phase follows the same contract: statements run in list order, each
//! in its own transaction committed on success. A failed statement is logged
//! with its name and skipped; later statements still run.

pub mod report;

pub use report::{Phase, PhaseReport, RunReport, StatementFailure};

use async_trait::async_trait;
use common::Result;
use common::config::Settings;
use tracing::{error, info};

use crate::sql::{self, Statement};

#[async_trait]
pub trait StatementExecutor: Send {
    /// Runs `sql` in its own transaction and commits it.
    async fn execute_and_commit(&mut self, sql: &str) -> Result<()>;
}

pub async fn run_phase<E>(executor: &mut E, phase: Phase, statements: &[Statement]) -> PhaseReport
where
    E: StatementExecutor + ?Sized,
{
    let mut report = PhaseReport::new(phase);

    for statement in statements {
        info!(%phase, statement = statement.name, "Executing statement");
        match executor.execute_and_commit(&statement.sql).await {
            Ok(()) => {
                info!(%phase, statement = statement.name, "Committed");
                report.record_success(statement.name);
            }
            Err(e) => {
                error!(%phase, statement = statement.name, error = %e, "Statement failed, continuing");
                report.record_failure(statement.name, &e);
            }
        }
    }

    info!(
        %phase,
        committed = report.committed.len(),
        failed = report.failures.len(),
        "Phase finished"
    );
    report
}

/// Loads raw JSON from object storage into the staging tables.
pub async fn run_copy_phase<E>(executor: &mut E, statements: &[Statement]) -> PhaseReport
where
    E: StatementExecutor + ?Sized,
{
    run_phase(executor, Phase::Copy, statements).await
}

/// Populates the star schema from the staging tables.
pub async fn run_insert_phase<E>(executor: &mut E, statements: &[Statement]) -> PhaseReport
where
    E: StatementExecutor + ?Sized,
{
    run_phase(executor, Phase::Insert, statements).await
}

/// Drops then recreates every staging and star-schema table.
pub async fn reset_schema<E>(executor: &mut E, report: &mut RunReport)
where
    E: StatementExecutor + ?Sized,
{
    report.push(run_phase(executor, Phase::Drop, &sql::drop_table_queries()).await);
    report.push(run_phase(executor, Phase::Create, &sql::create_table_queries()).await);
}

/// Copy phase followed by insert phase. The insert phase runs even when
/// copies failed.
pub async fn load_and_insert<E>(executor: &mut E, settings: &Settings, report: &mut RunReport)
where
    E: StatementExecutor + ?Sized,
{
    report.push(run_copy_phase(executor, &sql::copy_table_queries(settings)).await);
    report.push(run_insert_phase(executor, &sql::insert_table_queries()).await);
}
