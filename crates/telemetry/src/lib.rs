//! Tracing subscriber bootstrap shared by every binary in the workspace.

use async_trait::async_trait;
use ssevolution_kernel::settings::{LogFormat, TelemetrySettings};
use ssevolution_kernel::{InitCtx, Module};
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info";

/// Install the global fmt subscriber.
///
/// Honors `RUST_LOG` and falls back to `info`. Returns `false` when a
/// subscriber was already installed, which makes repeated calls harmless.
pub fn init(settings: &TelemetrySettings) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let installed = match settings.log_format {
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
            .is_ok(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
            .is_ok(),
    };

    if installed {
        tracing::debug!(
            target: "ssevolution-telemetry",
            format = ?settings.log_format,
            "telemetry initialized"
        );
    }

    installed
}

/// Core module that installs the subscriber from the loaded settings.
pub struct TelemetryModule;

#[async_trait]
impl Module for TelemetryModule {
    fn name(&self) -> &'static str {
        "telemetry"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        init(&ctx.settings.telemetry);
        Ok(())
    }
}
