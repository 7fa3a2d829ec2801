use std::path::PathBuf;

use anyhow::{anyhow, Context};
use serde::Deserialize;

const DEFAULT_ENV: &str = "local";
const ENV_VAR_NAME: &str = "SSE_ENV";
const CONFIG_DIR_ENV: &str = "SSE_CONFIG_DIR";

/// Deployment environment the application is running in.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Local,
    Staging,
    Production,
}

/// Top-level configuration structure loaded from layered sources.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub corpus: CorpusSettings,
    #[serde(default)]
    pub database: DatabaseSettings,
    #[serde(default)]
    pub telemetry: TelemetrySettings,
}

impl Settings {
    /// Load configuration by layering `.env`, base file, and environment overlay.
    pub fn load() -> anyhow::Result<Self> {
        // Allow missing `.env` files without failing.
        let _ = dotenvy::dotenv();

        let environment = std::env::var(ENV_VAR_NAME).unwrap_or_else(|_| DEFAULT_ENV.to_string());
        let config_dir = match std::env::var(CONFIG_DIR_ENV) {
            Ok(dir) => PathBuf::from(dir),
            // Default to repo root `config` directory.
            Err(_) => std::env::current_dir()
                .with_context(|| "unable to resolve current directory")?
                .join("config"),
        };

        Self::load_from(&config_dir, &environment)
    }

    /// Load configuration from an explicit directory and environment name.
    pub fn load_from(config_dir: &std::path::Path, environment: &str) -> anyhow::Result<Self> {
        let parsed_environment = match environment {
            "local" => Environment::Local,
            "staging" => Environment::Staging,
            "production" => Environment::Production,
            other => {
                return Err(anyhow!(
                    "unsupported environment '{}'; expected local/staging/production",
                    other
                ));
            }
        };

        let base_path = config_dir.join("base.toml");
        let environment_path = config_dir.join(format!("{}.toml", environment));

        let builder = config::Config::builder()
            .add_source(config::File::from(base_path).required(false))
            .add_source(config::File::from(environment_path).required(false))
            .add_source(
                config::Environment::with_prefix("SSE")
                    .prefix_separator("_")
                    .separator("__"),
            );

        let cfg = builder
            .build()
            .with_context(|| "failed to build configuration")?;

        let mut settings: Settings = cfg
            .try_deserialize()
            .with_context(|| "failed to deserialize configuration")?;

        settings.environment = parsed_environment;

        Ok(settings)
    }
}

/// How the corpus module decides that a destination is already complete.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CheckMode {
    #[default]
    Names,
    Sizes,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorpusSettings {
    #[serde(default = "CorpusSettings::default_source_dir")]
    pub source_dir: PathBuf,
    #[serde(default = "CorpusSettings::default_dest_dir")]
    pub dest_dir: PathBuf,
    #[serde(default)]
    pub check: CheckMode,
}

impl CorpusSettings {
    fn default_source_dir() -> PathBuf {
        PathBuf::from("data/ECCO-TCP")
    }

    fn default_dest_dir() -> PathBuf {
        PathBuf::from("data/ecco-tcp-xml")
    }
}

impl Default for CorpusSettings {
    fn default() -> Self {
        Self {
            source_dir: Self::default_source_dir(),
            dest_dir: Self::default_dest_dir(),
            check: CheckMode::default(),
        }
    }
}

/// Where the MySQL connection parameters live and which database to ensure.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default = "DatabaseSettings::default_config_file")]
    pub config_file: PathBuf,
    #[serde(default = "DatabaseSettings::default_section")]
    pub section: String,
    #[serde(default = "DatabaseSettings::default_name")]
    pub name: String,
}

impl DatabaseSettings {
    fn default_config_file() -> PathBuf {
        PathBuf::from("config.ini")
    }

    fn default_section() -> String {
        "mysql".to_string()
    }

    fn default_name() -> String {
        "ecco_tcp".to_string()
    }
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            config_file: Self::default_config_file(),
            section: Self::default_section(),
            name: Self::default_name(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct TelemetrySettings {
    #[serde(default)]
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}
