//! Storage Layer - SQLite-backed persistence
//!
//! System of record is SQLite with tables:
//! - sessions(hostname, host_ip, pid, ppid, tty, uid, euid, shell, ...)
//! - commands(session_id, command_no, cwd, rval, start_time, duration, ...)
//!
//! Table DDL is checked against the live catalog before use; see
//! [`sqlite::HistoryStore::ensure_table`].

pub mod result;
pub mod schema;
pub mod sqlite;

pub use result::{ResultSet, Value};
pub use sqlite::{HistoryStore, SchemaCheck};
