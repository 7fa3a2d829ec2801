use anyhow::Context;
use async_trait::async_trait;
use ssevolution_kernel::{InitCtx, Module};
use tokio::sync::Mutex;

use crate::bootstrap::Database;
use crate::params::load_connection_params;

/// Core module owning the single MySQL connection of the application.
#[derive(Default)]
pub struct DbModule {
    database: Mutex<Option<Database>>,
}

impl DbModule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `init` has completed and `stop` has not run since.
    pub async fn is_ready(&self) -> bool {
        self.database.lock().await.is_some()
    }
}

#[async_trait]
impl Module for DbModule {
    fn name(&self) -> &'static str {
        "db"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let mut slot = self.database.lock().await;
        if slot.is_some() {
            tracing::debug!(module = self.name(), "database already bootstrapped");
            return Ok(());
        }

        let settings = &ctx.settings.database;
        let params = load_connection_params(&settings.config_file, &settings.section)
            .with_context(|| "failed to load MySQL connection parameters")?;

        let database = Database::init(&params, &settings.name)
            .await
            .with_context(|| format!("failed to bootstrap database '{}'", settings.name))?;

        tracing::info!(
            module = self.name(),
            database = %database.name(),
            outcome = ?database.outcome(),
            "db module initialized"
        );
        *slot = Some(database);
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        if let Some(database) = self.database.lock().await.take() {
            database
                .shutdown()
                .await
                .with_context(|| "failed to shut down database connection")?;
        }
        Ok(())
    }
}
