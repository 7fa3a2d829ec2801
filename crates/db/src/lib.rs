//! MySQL bootstrap: read connection parameters from an INI section, connect,
//! and make sure the target database exists.
//!
//! Nothing here runs on its own. Call [`Database::init`] (or register
//! [`DbModule`] with the kernel registry) and [`Database::shutdown`] when done.

pub mod bootstrap;
pub mod error;
pub mod module;
pub mod params;
pub mod server;

pub use bootstrap::{
    connect, create_database_statement, ensure_database, BootstrapOutcome, Database,
    DatabaseName,
};
pub use error::DbError;
pub use module::DbModule;
pub use params::{load_connection_params, ConnectionParams};
pub use server::{DatabaseServer, ServerError, ER_BAD_DB_ERROR};
