//! Connect, select the target database, create it on first use.

use std::fmt;

use sqlx::mysql::MySqlConnection;
use sqlx::{ConnectOptions, Connection};

use crate::error::DbError;
use crate::params::ConnectionParams;
use crate::server::DatabaseServer;

const MAX_NAME_LEN: usize = 64;

/// A database name that is safe to splice into `USE` / `CREATE DATABASE`
/// without quoting.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DatabaseName(String);

impl DatabaseName {
    pub fn parse(name: &str) -> Result<Self, DbError> {
        let valid = !name.is_empty()
            && name.len() <= MAX_NAME_LEN
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
            && !name.chars().all(|c| c.is_ascii_digit());

        if valid {
            Ok(Self(name.to_string()))
        } else {
            Err(DbError::InvalidDatabaseName(name.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DatabaseName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How the target database came to be selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapOutcome {
    /// It already existed
    Selected,
    /// It was created, then selected
    Created,
}

pub fn create_database_statement(name: &DatabaseName) -> String {
    format!("CREATE DATABASE {} DEFAULT CHARACTER SET 'utf8'", name)
}

fn use_statement(name: &DatabaseName) -> String {
    format!("USE {}", name)
}

/// Make `name` the active database on `server`, creating it when the server
/// reports it as unknown.
///
/// Creation is attempted at most once and followed by a single re-selection.
/// Every other failure is final.
pub async fn ensure_database<S>(server: &mut S, name: &DatabaseName) -> Result<BootstrapOutcome, DbError>
where
    S: DatabaseServer + ?Sized,
{
    let select = use_statement(name);

    let err = match server.execute_statement(&select).await {
        Ok(()) => {
            tracing::info!(database = %name, "database selected");
            return Ok(BootstrapOutcome::Selected);
        }
        Err(err) => err,
    };

    if !err.is_unknown_database() {
        tracing::error!(database = %name, error = %err, "failed selecting database");
        return Err(DbError::SelectDatabase {
            name: name.to_string(),
            source: err,
        });
    }

    tracing::info!(database = %name, "database does not exist; creating it");
    server
        .execute_statement(&create_database_statement(name))
        .await
        .map_err(|source| {
            tracing::error!(database = %name, error = %source, "failed creating database");
            DbError::CreateDatabase {
                name: name.to_string(),
                source,
            }
        })?;

    server.execute_statement(&select).await.map_err(|source| {
        tracing::error!(database = %name, error = %source, "failed selecting created database");
        DbError::SelectDatabase {
            name: name.to_string(),
            source,
        }
    })?;

    tracing::info!(database = %name, "database created and selected");
    Ok(BootstrapOutcome::Created)
}

/// Open a MySQL connection from `params`.
pub async fn connect(params: &ConnectionParams) -> Result<MySqlConnection, DbError> {
    let options = params.connect_options()?;

    tracing::info!(
        host = params.get("host").unwrap_or("localhost"),
        user = params.get("user").unwrap_or_default(),
        "connecting to MySQL database"
    );

    match options.connect().await {
        Ok(conn) => {
            tracing::info!("connection established");
            Ok(conn)
        }
        Err(err) => {
            tracing::error!(error = %err, "connection failed");
            Err(DbError::Connect(err))
        }
    }
}

/// An open connection with the target database selected.
#[derive(Debug)]
pub struct Database {
    conn: MySqlConnection,
    name: DatabaseName,
    outcome: BootstrapOutcome,
}

impl Database {
    /// Connect and ensure `name` exists and is selected.
    ///
    /// Safe to call repeatedly: once the database exists every later call
    /// just selects it.
    pub async fn init(params: &ConnectionParams, name: &str) -> Result<Self, DbError> {
        let name = DatabaseName::parse(name)?;
        let mut conn = connect(params).await?;

        let outcome = match ensure_database(&mut conn, &name).await {
            Ok(outcome) => outcome,
            Err(err) => {
                // Best effort; the bootstrap error is the one worth reporting.
                if let Err(close_err) = conn.close().await {
                    tracing::warn!(error = %close_err, "failed to close connection after bootstrap error");
                }
                return Err(err);
            }
        };

        Ok(Self {
            conn,
            name,
            outcome,
        })
    }

    pub fn name(&self) -> &DatabaseName {
        &self.name
    }

    pub fn outcome(&self) -> BootstrapOutcome {
        self.outcome
    }

    pub fn connection(&mut self) -> &mut MySqlConnection {
        &mut self.conn
    }

    /// Close the connection gracefully.
    pub async fn shutdown(self) -> Result<(), DbError> {
        tracing::info!(database = %self.name, "closing MySQL connection");
        self.conn.close().await.map_err(DbError::Shutdown)
    }
}
