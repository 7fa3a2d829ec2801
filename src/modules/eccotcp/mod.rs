use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use ssevolution_corpus::{ensure_materialized_with, CompletenessCheck};
use ssevolution_kernel::settings::CheckMode;
use ssevolution_kernel::{InitCtx, Module};

/// Unpacks the ECCO-TCP archives into the working directory on init.
pub struct EccoTcpModule;

impl EccoTcpModule {
    pub const fn new() -> Self {
        Self
    }
}

impl Default for EccoTcpModule {
    fn default() -> Self {
        Self::new()
    }
}

fn completeness_check(mode: CheckMode) -> CompletenessCheck {
    match mode {
        CheckMode::Names => CompletenessCheck::Names,
        CheckMode::Sizes => CompletenessCheck::Sizes,
    }
}

#[async_trait]
impl Module for EccoTcpModule {
    fn name(&self) -> &'static str {
        "eccotcp"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let corpus = ctx.settings.corpus.clone();
        let check = completeness_check(corpus.check);

        let report = tokio::task::spawn_blocking(move || {
            ensure_materialized_with(&corpus.source_dir, &corpus.dest_dir, check)
        })
        .await
        .with_context(|| "corpus extraction task panicked")?
        .with_context(|| "failed to materialize the ECCO-TCP corpus")?;

        tracing::info!(
            module = self.name(),
            extracted = report.extracted,
            archives = report.archives,
            entries = report.entries,
            "eccotcp module initialized"
        );
        Ok(())
    }
}

/// Create a new instance of the ECCO-TCP module
pub fn create_module() -> Arc<dyn Module> {
    Arc::new(EccoTcpModule::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ssevolution_corpus::CorpusError;
    use ssevolution_kernel::Settings;
    use std::io::Write;

    #[test]
    fn check_modes_map_one_to_one() {
        assert_eq!(completeness_check(CheckMode::Names), CompletenessCheck::Names);
        assert_eq!(completeness_check(CheckMode::Sizes), CompletenessCheck::Sizes);
    }

    #[tokio::test]
    async fn init_extracts_configured_corpus() {
        let root = tempfile::tempdir().unwrap();
        let mut settings = Settings::default();
        settings.corpus.source_dir = root.path().join("zips");
        settings.corpus.dest_dir = root.path().join("xml");
        std::fs::create_dir(&settings.corpus.source_dir).unwrap();

        let file = std::fs::File::create(settings.corpus.source_dir.join("a.zip")).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        writer
            .start_file("K000001.000.xml", zip::write::SimpleFileOptions::default())
            .unwrap();
        writer.write_all(b"<TEI/>").unwrap();
        writer.finish().unwrap();

        EccoTcpModule::new()
            .init(&InitCtx {
                settings: &settings,
            })
            .await
            .unwrap();

        assert!(settings.corpus.dest_dir.join("K000001.000.xml").is_file());
    }

    #[tokio::test]
    async fn init_surfaces_missing_source() {
        let root = tempfile::tempdir().unwrap();
        let mut settings = Settings::default();
        settings.corpus.source_dir = root.path().join("absent");
        settings.corpus.dest_dir = root.path().join("xml");

        let err = EccoTcpModule::new()
            .init(&InitCtx {
                settings: &settings,
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<CorpusError>(),
            Some(CorpusError::NotFound { .. })
        ));
    }
}
