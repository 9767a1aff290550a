//! Result set types returned by the store.

use rusqlite::types::{ToSqlOutput, ValueRef};
use rusqlite::ToSql;

/// A scalar cell value: text, integer, or null.
///
/// Anything else the database hands back (reals, blobs) is coerced to text,
/// since the formatters only distinguish numbers from everything else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Null,
    Integer(i64),
    Text(String),
}

impl Value {
    /// True for values the CSV formatter leaves unquoted.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Integer(_))
    }

    /// The printed form of the value; null prints as an empty string.
    pub fn as_display(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Integer(n) => n.to_string(),
            Value::Text(s) => s.clone(),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Integer(n) => write!(f, "{}", n),
            Value::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<ValueRef<'_>> for Value {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(n) => Value::Integer(n),
            ValueRef::Real(r) => Value::Text(r.to_string()),
            ValueRef::Text(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
            ValueRef::Blob(b) => Value::Text(String::from_utf8_lossy(b).into_owned()),
        }
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            Value::Null => Ok(ToSqlOutput::from(rusqlite::types::Null)),
            Value::Integer(n) => Ok(ToSqlOutput::from(*n)),
            Value::Text(s) => Ok(ToSqlOutput::from(s.as_str())),
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

/// Converts an optional string, mapping `None` and empty to null.
impl From<Option<String>> for Value {
    fn from(s: Option<String>) -> Self {
        match s {
            Some(s) if !s.is_empty() => Value::Text(s),
            _ => Value::Null,
        }
    }
}

/// An ordered query result: column headings plus data rows.
///
/// Headings are a distinct field and are never mixed into `rows`; every row
/// has exactly `headings.len()` values, in the store's return order.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultSet {
    pub headings: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl ResultSet {
    pub fn new(headings: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self { headings, rows }
    }

    pub fn column_count(&self) -> usize {
        self.headings.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Reverses the data row order in place; headings are unaffected.
    pub fn reverse_rows(&mut self) {
        self.rows.reverse();
    }
}
