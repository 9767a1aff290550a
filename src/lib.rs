//! # Cmdhist - Shell command history with a reporting layer
//!
//! Cmdhist records shell sessions and the commands typed into them in a
//! SQLite database, and reports on that history through named, user-defined
//! queries with pluggable output formatting.
//!
//! Cmdhist provides:
//! - A schema-checked SQLite store for session and command rows
//! - A catalog of named SQL queries loaded from system and user files
//! - Shell-style `${VAR}` / `${VAR:-default}` expansion inside query templates
//! - Interchangeable result formatters, including an auto-grouping layout
//!   that minimizes printed screen area

pub mod command;
pub mod config;
pub mod format;
pub mod queries;
pub mod record;
pub mod session;
pub mod storage;
pub mod template;
pub mod unix;

// Re-exports for convenient access
pub use command::CommandRecord;
pub use config::Config;
pub use queries::QueryCatalog;
pub use record::InsertableRecord;
pub use session::SessionRecord;
pub use storage::{HistoryStore, ResultSet, Value};

/// Result type alias for cmdhist operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for cmdhist operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Query not found: {0}")]
    QueryNotFound(String),

    #[error("Unknown format: '{0}'")]
    FormatNotFound(String),

    #[error("No history database; pass --database or set CMDHIST_HISTORY_DB")]
    MissingDatabase,

    #[error("Parse error: {0}")]
    Parse(String),
}
