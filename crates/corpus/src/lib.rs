//! Materializes the ECCO-TCP zip archives into a working directory.
//!
//! Extraction is guarded by a shallow completeness check so that re-running
//! against an already unpacked corpus costs one directory listing plus one
//! central-directory read per archive.

pub mod archive;
pub mod error;
pub mod materialize;

pub use archive::{ArchiveEntry, ARCHIVE_EXTENSION};
pub use error::CorpusError;
pub use materialize::{
    archive_set, destination_listing, ensure_directory_exists, ensure_materialized,
    ensure_materialized_with, is_materialized, is_materialized_with, CompletenessCheck,
    MaterializeReport,
};
