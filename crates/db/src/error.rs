use std::path::PathBuf;

use thiserror::Error;

use crate::server::ServerError;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("{section} not found in the {} file", file.display())]
    Configuration { section: String, file: PathBuf },

    #[error("failed to read {}: {source}", file.display())]
    ConfigSource {
        file: PathBuf,
        #[source]
        source: config::ConfigError,
    },

    #[error("invalid value '{value}' for connection parameter '{key}'")]
    InvalidParameter { key: String, value: String },

    #[error("invalid database name '{0}'")]
    InvalidDatabaseName(String),

    #[error("failed to connect to MySQL: {0}")]
    Connect(#[source] sqlx::Error),

    #[error("failed creating database {name}: {source}")]
    CreateDatabase {
        name: String,
        #[source]
        source: ServerError,
    },

    #[error("failed selecting database {name}: {source}")]
    SelectDatabase {
        name: String,
        #[source]
        source: ServerError,
    },

    #[error("failed to close MySQL connection: {0}")]
    Shutdown(#[source] sqlx::Error),
}

impl DbError {
    /// Process exit status for a bootstrap that ends in this error.
    ///
    /// Every variant is fatal to the bootstrap step, so all of them map to 1.
    pub fn exit_code(&self) -> u8 {
        1
    }
}
