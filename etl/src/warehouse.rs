//! Postgres-wire connection to the warehouse cluster.

use async_trait::async_trait;
use common::config::ClusterConfig;
use common::{Error, Result};
use tokio::task::JoinHandle;
use tokio_postgres::{Client, Config as PgConfig, NoTls};
use tracing::{info, warn};

use crate::pipeline::StatementExecutor;

pub struct WarehouseConnection {
    client: Client,
    connection_task: JoinHandle<()>,
}

impl WarehouseConnection {
    /// Opens the single connection used for every statement of a run.
    pub async fn connect(cluster: &ClusterConfig) -> Result<Self> {
        let mut pg = PgConfig::new();
        pg.host(&cluster.host)
            .port(cluster.db_port)
            .user(&cluster.db_user)
            .password(&cluster.db_password)
            .dbname(&cluster.db_name);

        let (client, connection) = pg.connect(NoTls).await.map_err(|e| {
            Error::Connection(format!(
                "{}:{}/{}: {}",
                cluster.host, cluster.db_port, cluster.db_name, e
            ))
        })?;

        let connection_task = tokio::spawn(async move {
            if let Err(e) = connection.await {
                warn!(error = %e, "Warehouse connection closed with error");
            }
        });

        info!(
            host = %cluster.host,
            port = cluster.db_port,
            database = %cluster.db_name,
            "Connected to warehouse"
        );

        Ok(Self {
            client,
            connection_task,
        })
    }

    pub async fn close(self) {
        drop(self.client);
        if let Err(e) = self.connection_task.await {
            warn!(error = %e, "Warehouse connection task did not shut down cleanly");
        }
        info!("Warehouse connection closed");
    }
}

#[async_trait]
impl StatementExecutor for WarehouseConnection {
    async fn execute_and_commit(&mut self, sql: &str) -> Result<()> {
        // Dropping an uncommitted transaction rolls it back.
        let transaction = self.client.transaction().await?;
        transaction.batch_execute(sql).await?;
        transaction.commit().await?;
        Ok(())
    }
}
