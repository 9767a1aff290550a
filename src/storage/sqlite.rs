//! SQLite storage implementation.
//!
//! [`HistoryStore`] wraps one connection to the history database. Before a
//! table is touched it is checked against the schema module's authoritative
//! DDL; inserts swallow uniqueness violations (two shells racing on the same
//! command number is an expected, harmless collision); fetches sanity-check
//! the statement text before execution so a half-written query template can
//! never crash the process.

use std::path::Path;

use rusqlite::{Connection, OptionalExtension, ToSql};

use super::result::{ResultSet, Value};
use super::schema;
use crate::record::InsertableRecord;
use crate::Result;

/// Outcome of a schema check for one logical table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaCheck {
    /// The table was missing and has been created.
    Created,
    /// The table exists with the expected DDL.
    Verified,
    /// The table exists with different DDL; it was left untouched.
    Mismatch,
}

/// SQLite-backed store for shell history.
pub struct HistoryStore {
    conn: Connection,
}

impl HistoryStore {
    /// Open a database file (creates if it doesn't exist) and ensure every
    /// registered table is present with the expected schema.
    ///
    /// An unreachable database is fatal to the caller: nothing else in the
    /// program can function without it, so the error carries the path.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.ensure_tables()?;
        Ok(store)
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.ensure_tables()?;
        Ok(store)
    }

    fn ensure_tables(&self) -> Result<()> {
        for (name, ddl) in schema::all_tables() {
            self.ensure_table(name, ddl)?;
        }
        Ok(())
    }

    /// Check that `table_name` exists, creating it from `create_statement`
    /// if absent. An existing table whose stored DDL differs (beyond
    /// trailing whitespace and a trailing semicolon) is reported with a
    /// warning and left exactly as it is.
    ///
    /// Idempotent: once the table matches, repeated calls execute nothing.
    pub fn ensure_table(&self, table_name: &str, create_statement: &str) -> Result<SchemaCheck> {
        let existing: Option<String> = self
            .conn
            .query_row(
                "SELECT sql FROM sqlite_master WHERE type = 'table' AND name = ?1",
                [table_name],
                |row| row.get(0),
            )
            .optional()?;

        match existing {
            None => {
                self.conn.execute(create_statement, [])?;
                tracing::debug!(table = table_name, "created table");
                Ok(SchemaCheck::Created)
            }
            Some(stored) => {
                if trim_ddl(&stored) == trim_ddl(create_statement) {
                    Ok(SchemaCheck::Verified)
                } else {
                    tracing::warn!(
                        table = table_name,
                        "table exists, but has an unexpected schema"
                    );
                    Ok(SchemaCheck::Mismatch)
                }
            }
        }
    }

    /// Insert a record, returning the new rowid.
    ///
    /// A uniqueness-constraint violation is not an error: it is logged at
    /// debug level and `0` is returned to mean "no row inserted".
    pub fn insert(&self, record: &dyn InsertableRecord) -> Result<i64> {
        let fields = record.fields();
        let columns: Vec<&str> = fields.iter().map(|(name, _)| *name).collect();
        let placeholders: Vec<String> = (1..=fields.len()).map(|i| format!("?{}", i)).collect();
        let sql = format!(
            "INSERT INTO {} ( {} ) VALUES ( {} )",
            record.table(),
            columns.join(", "),
            placeholders.join(", ")
        );
        let params: Vec<&dyn ToSql> = fields.iter().map(|(_, value)| value as &dyn ToSql).collect();

        match self.conn.execute(&sql, params.as_slice()) {
            Ok(_) => Ok(self.conn.last_insert_rowid()),
            Err(e) if is_constraint_violation(&e) => {
                tracing::debug!(error = %e, "constraint violation executing: '{}'", sql);
                Ok(0)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Execute a general parameterized statement, returning the number of
    /// affected rows. Same violation-swallowing semantics as [`insert`].
    ///
    /// [`insert`]: HistoryStore::insert
    pub fn execute(&self, sql: &str, params: &[&dyn ToSql]) -> Result<usize> {
        match self.conn.execute(sql, params) {
            Ok(changed) => Ok(changed),
            Err(e) if is_constraint_violation(&e) => {
                tracing::debug!(error = %e, "constraint violation executing: '{}'", sql);
                Ok(0)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Execute a select and return its result set.
    ///
    /// Incomplete statement text (no terminating `;`) is rejected before
    /// execution and yields `None`. An executed query always yields a result
    /// set; one with zero matching rows has headings and an empty row list.
    /// If `limit` is positive, at most `limit` rows are read.
    pub fn fetch(
        &self,
        sql: &str,
        params: &[&dyn ToSql],
        limit: i64,
    ) -> Result<Option<ResultSet>> {
        if !is_complete_statement(sql) {
            tracing::debug!("rejecting incomplete statement: '{}'", sql);
            return Ok(None);
        }

        let mut stmt = self.conn.prepare(sql)?;
        let headings: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect();
        let column_count = headings.len();

        let mut data = Vec::new();
        let mut rows = stmt.query(params)?;
        while let Some(row) = rows.next()? {
            let mut values = Vec::with_capacity(column_count);
            for c in 0..column_count {
                values.push(Value::from(row.get_ref(c)?));
            }
            data.push(values);
            if limit > 0 && data.len() as i64 >= limit {
                break;
            }
        }

        Ok(Some(ResultSet::new(headings, data)))
    }
}

fn is_constraint_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(err, _)
            if err.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

/// DDL comparison key: trailing whitespace and a trailing semicolon are
/// insignificant, everything else is.
fn trim_ddl(sql: &str) -> &str {
    sql.trim().trim_end_matches(';').trim_end()
}

/// A cheap stand-in for sqlite's completeness check: after discarding
/// trailing blank and `--` comment lines, a complete statement ends with a
/// semicolon.
pub fn is_complete_statement(sql: &str) -> bool {
    let mut tail = sql.trim_end();
    loop {
        let Some((rest, last)) = tail.rsplit_once('\n') else {
            break;
        };
        if last.trim_start().starts_with("--") {
            tail = rest.trim_end();
        } else {
            break;
        }
    }
    !tail.is_empty() && tail.ends_with(';')
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestCommand {
        session_id: i64,
        command_no: i64,
        command: String,
    }

    impl InsertableRecord for TestCommand {
        fn table(&self) -> &'static str {
            "commands"
        }

        fn fields(&self) -> Vec<(&'static str, Value)> {
            vec![
                ("session_id", Value::Integer(self.session_id)),
                ("shell_level", Value::Integer(1)),
                ("command_no", Value::Integer(self.command_no)),
                ("euid", Value::Integer(1000)),
                ("cwd", Value::from("/tmp")),
                ("rval", Value::Integer(0)),
                ("start_time", Value::Integer(100)),
                ("end_time", Value::Integer(101)),
                ("duration", Value::Integer(1)),
                ("command", Value::from(self.command.as_str())),
            ]
        }
    }

    fn command(session_id: i64, command_no: i64, text: &str) -> TestCommand {
        TestCommand {
            session_id,
            command_no,
            command: text.to_string(),
        }
    }

    #[test]
    fn test_open_creates_tables() {
        let store = HistoryStore::open_in_memory().unwrap();
        for (name, ddl) in schema::all_tables() {
            assert_eq!(store.ensure_table(name, ddl).unwrap(), SchemaCheck::Verified);
        }
    }

    #[test]
    fn test_open_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.db");
        {
            let store = HistoryStore::open(&path).unwrap();
            store.insert(&command(1, 1, "ls")).unwrap();
        }
        let store = HistoryStore::open(&path).unwrap();
        let rs = store
            .fetch("SELECT command FROM commands;", &[], 0)
            .unwrap()
            .unwrap();
        assert_eq!(rs.rows.len(), 1);
    }

    #[test]
    fn test_ensure_table_trim_only_comparison() {
        let store = HistoryStore::open_in_memory().unwrap();
        let padded = format!("{}  \n;", schema::CREATE_COMMANDS_TABLE);
        assert_eq!(
            store.ensure_table("commands", &padded).unwrap(),
            SchemaCheck::Verified
        );
    }

    #[test]
    fn test_ensure_table_mismatch_leaves_table_alone() {
        let store = HistoryStore::open_in_memory().unwrap();
        let check = store
            .ensure_table("commands", "CREATE TABLE commands ( id INTEGER )")
            .unwrap();
        assert_eq!(check, SchemaCheck::Mismatch);

        // The original table must still be in place and usable.
        let rowid = store.insert(&command(1, 1, "echo hi")).unwrap();
        assert!(rowid > 0);
    }

    #[test]
    fn test_insert_returns_increasing_rowids() {
        let store = HistoryStore::open_in_memory().unwrap();
        let first = store.insert(&command(1, 1, "ls")).unwrap();
        let second = store.insert(&command(1, 2, "pwd")).unwrap();
        assert!(first > 0);
        assert!(second > first);
    }

    #[test]
    fn test_insert_duplicate_unique_key_returns_sentinel() {
        let store = HistoryStore::open_in_memory().unwrap();
        assert!(store.insert(&command(7, 42, "make")).unwrap() > 0);
        assert_eq!(store.insert(&command(7, 42, "make again")).unwrap(), 0);

        // The original row survives the collision.
        let rs = store
            .fetch(
                "SELECT command FROM commands WHERE session_id = 7;",
                &[],
                0,
            )
            .unwrap()
            .unwrap();
        assert_eq!(rs.rows.len(), 1);
        assert_eq!(rs.rows[0][0], Value::Text("make".into()));
    }

    #[test]
    fn test_fetch_limit() {
        let store = HistoryStore::open_in_memory().unwrap();
        for n in 1..=5 {
            store.insert(&command(1, n, "true")).unwrap();
        }
        let rs = store
            .fetch("SELECT command_no FROM commands ORDER BY command_no;", &[], 3)
            .unwrap()
            .unwrap();
        assert_eq!(rs.rows.len(), 3);
        assert_eq!(rs.rows[0][0], Value::Integer(1));

        let all = store
            .fetch("SELECT command_no FROM commands;", &[], 0)
            .unwrap()
            .unwrap();
        assert_eq!(all.rows.len(), 5);
    }

    #[test]
    fn test_fetch_zero_rows_keeps_headings() {
        let store = HistoryStore::open_in_memory().unwrap();
        let rs = store
            .fetch("SELECT command, rval FROM commands;", &[], 0)
            .unwrap()
            .unwrap();
        assert_eq!(rs.headings, vec!["command".to_string(), "rval".to_string()]);
        assert!(rs.rows.is_empty());
    }

    #[test]
    fn test_fetch_rejects_incomplete_statement() {
        let store = HistoryStore::open_in_memory().unwrap();
        let rs = store.fetch("SELECT * FROM commands", &[], 0).unwrap();
        assert!(rs.is_none());
    }

    #[test]
    fn test_fetch_malformed_sql_is_an_error() {
        let store = HistoryStore::open_in_memory().unwrap();
        assert!(store.fetch("SELECT FROM nothing at all;", &[], 0).is_err());
    }

    #[test]
    fn test_fetch_with_params() {
        let store = HistoryStore::open_in_memory().unwrap();
        store.insert(&command(1, 1, "ls")).unwrap();
        store.insert(&command(2, 1, "pwd")).unwrap();
        let rs = store
            .fetch(
                "SELECT command FROM commands WHERE session_id = ?1;",
                &[&2i64],
                0,
            )
            .unwrap()
            .unwrap();
        assert_eq!(rs.rows.len(), 1);
        assert_eq!(rs.rows[0][0], Value::Text("pwd".into()));
    }

    #[test]
    fn test_is_complete_statement() {
        assert!(is_complete_statement("SELECT 1;"));
        assert!(is_complete_statement("SELECT 1;   \n"));
        assert!(is_complete_statement("SELECT 1;\n-- trailing note\n"));
        assert!(!is_complete_statement("SELECT 1"));
        assert!(!is_complete_statement(""));
        assert!(!is_complete_statement("   \n  "));
    }
}
