use async_trait::async_trait;
use sqlx::mysql::{MySqlConnection, MySqlDatabaseError};
use sqlx::Executor;
use thiserror::Error;

/// MySQL `ER_BAD_DB_ERROR`: "Unknown database".
pub const ER_BAD_DB_ERROR: u16 = 1049;

/// A statement failure as reported by the server (or the driver).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ServerError {
    /// Vendor error number when the server produced one
    pub code: Option<u16>,
    pub message: String,
}

impl ServerError {
    pub fn is_unknown_database(&self) -> bool {
        self.code == Some(ER_BAD_DB_ERROR)
    }
}

impl From<sqlx::Error> for ServerError {
    fn from(err: sqlx::Error) -> Self {
        let code = err
            .as_database_error()
            .and_then(|db| db.try_downcast_ref::<MySqlDatabaseError>())
            .map(MySqlDatabaseError::number);

        Self {
            code,
            message: err.to_string(),
        }
    }
}

/// Anything that can run a plain SQL statement against a server.
#[async_trait]
pub trait DatabaseServer: Send {
    async fn execute_statement(&mut self, statement: &str) -> Result<(), ServerError>;
}

#[async_trait]
impl DatabaseServer for MySqlConnection {
    async fn execute_statement(&mut self, statement: &str) -> Result<(), ServerError> {
        // `USE` and `CREATE DATABASE` go over the text protocol.
        Executor::execute(&mut *self, sqlx::raw_sql(statement)).await?;
        Ok(())
    }
}
