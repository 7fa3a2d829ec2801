use std::process::ExitCode;

use anyhow::Context;
use ssevolution_kernel::{InitCtx, ModuleRegistry, Settings};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = ?err, "ssevolution bootstrap failed");
            eprintln!("error: {err:#}");
            match err.downcast_ref::<ssevolution_db::DbError>() {
                Some(db_err) => ExitCode::from(db_err.exit_code()),
                None => ExitCode::FAILURE,
            }
        }
    }
}

async fn run() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load ssevolution settings")?;
    ssevolution_telemetry::init(&settings.telemetry);

    tracing::info!(
        env = ?settings.environment,
        source = %settings.corpus.source_dir.display(),
        database = %settings.database.name,
        "ssevolution bootstrap starting"
    );

    let mut registry = ModuleRegistry::new();
    ssevolution::register_all(&mut registry);
    tracing::info!(
        core = registry.core_module_count(),
        custom = registry.custom_module_count(),
        "modules registered"
    );
    registry
        .run_once(&InitCtx {
            settings: &settings,
        })
        .await?;

    tracing::info!("ssevolution bootstrap complete");
    Ok(())
}
