//! The catalog of named, saved queries.
//!
//! Queries are parsed from plain-text definition files of the form:
//!
//! ```text
//! # Full-line comments start with '#'.
//! recent: {
//!   description: "Show the most recent commands."
//!   sql: {
//!     SELECT command FROM commands ORDER BY start_time DESC
//!     LIMIT ${LIMIT:-10};
//!   }
//! }
//! ```
//!
//! Sources are loaded in priority order (system file first, then the user
//! file); a later definition of the same name completely replaces an
//! earlier one. Missing files and malformed blocks are skipped, never
//! fatal.

use std::collections::BTreeMap;
use std::path::Path;

use regex::Regex;

use crate::storage::{ResultSet, Value};
use crate::template;

/// One named query definition. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryDef {
    pub name: String,
    pub description: String,
    pub sql: String,
}

/// All loaded query definitions, keyed (and therefore listed) by name.
#[derive(Debug, Default)]
pub struct QueryCatalog {
    queries: BTreeMap<String, QueryDef>,
}

impl QueryCatalog {
    /// Load and merge definitions from `sources`, in priority order: later
    /// sources override earlier ones by name.
    pub fn load(sources: &[&Path]) -> Self {
        let mut text = String::new();
        for source in sources {
            let Ok(contents) = std::fs::read_to_string(source) else {
                tracing::debug!(source = %source.display(), "skipping unreadable query file");
                continue;
            };
            for line in contents.lines() {
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                text.push_str(line);
                text.push('\n');
            }
        }
        Self::parse(&text)
    }

    /// Parse definitions out of concatenated file text. Anything the
    /// grammar does not match is ignored.
    pub fn parse(text: &str) -> Self {
        // The sql body tolerates braces only inside ${...} tokens.
        let parser = Regex::new(
            r#"(?x)
            \s*(?P<name>[A-Za-z0-9_-]+)\s*:\s*\{\s*
              description\s*:\s*"(?P<desc>(?:[^"]|\\")*)"\s*
              sql\s*:\s*\{
                (?P<sql>(?:\$\{[^}]*\}|[^}])*)
              \}\s*
            \}"#,
        )
        .expect("query grammar regex");

        let mut queries = BTreeMap::new();
        for capture in parser.captures_iter(text) {
            let name = capture["name"].to_string();
            queries.insert(
                name.clone(),
                QueryDef {
                    name,
                    description: capture["desc"].to_string(),
                    sql: capture["sql"].to_string(),
                },
            );
        }
        Self { queries }
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }

    /// Look up a definition by name.
    pub fn get(&self, name: &str) -> Option<&QueryDef> {
        self.queries.get(name)
    }

    /// Returns the raw template and the SQL with all `${...}` tokens
    /// expanded against the current environment. Raw equal to resolved
    /// means the template had no expansions.
    pub fn resolved(&self, name: &str) -> Option<(String, String)> {
        self.resolved_with(name, |var| std::env::var(var).ok())
    }

    /// As [`resolved`](Self::resolved), with an explicit variable lookup.
    pub fn resolved_with<F>(&self, name: &str, lookup: F) -> Option<(String, String)>
    where
        F: Fn(&str) -> Option<String>,
    {
        let def = self.get(name)?;
        let resolved = template::expand(&def.sql, lookup);
        Some((def.sql.clone(), resolved))
    }

    /// The catalog as a (name, description) result set, alphabetical by
    /// name, with the synthetic heading pair in place.
    pub fn listing(&self) -> ResultSet {
        let rows = self
            .queries
            .values()
            .map(|def| {
                vec![
                    Value::from(def.name.as_str()),
                    Value::from(def.description.as_str()),
                ]
            })
            .collect();
        ResultSet::new(vec!["Query".to_string(), "Description".to_string()], rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"
recent: {
  description: "Show the most recent commands."
  sql: {
    SELECT command FROM commands ORDER BY start_time DESC LIMIT ${LIMIT:-10};
  }
}

sessions: {
  description: "Show all sessions."
  sql: { SELECT id, hostname FROM sessions; }
}
"#;

    #[test]
    fn test_parse_blocks() {
        let catalog = QueryCatalog::parse(SAMPLE);
        let recent = catalog.get("recent").unwrap();
        assert_eq!(recent.description, "Show the most recent commands.");
        assert!(recent.sql.contains("${LIMIT:-10}"));
        assert!(catalog.get("sessions").is_some());
        assert!(catalog.get("missing").is_none());
    }

    #[test]
    fn test_later_match_wins_within_source() {
        let text = r#"
dup: { description: "first" sql: { SELECT 1; } }
dup: { description: "second" sql: { SELECT 2; } }
"#;
        let catalog = QueryCatalog::parse(text);
        assert_eq!(catalog.get("dup").unwrap().description, "second");
    }

    #[test]
    fn test_user_source_overrides_system() {
        let mut system = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            system,
            r#"top: {{ description: "system" sql: {{ SELECT 1; }} }}"#
        )
        .unwrap();
        let mut user = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            user,
            r#"top: {{ description: "user" sql: {{ SELECT 2; }} }}"#
        )
        .unwrap();

        let catalog = QueryCatalog::load(&[system.path(), user.path()]);
        assert_eq!(catalog.get("top").unwrap().description, "user");
    }

    #[test]
    fn test_missing_source_is_skipped() {
        let mut user = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            user,
            r#"only: {{ description: "here" sql: {{ SELECT 1; }} }}"#
        )
        .unwrap();
        let catalog = QueryCatalog::load(&[Path::new("/nonexistent/queries"), user.path()]);
        assert!(catalog.get("only").is_some());
    }

    #[test]
    fn test_comment_lines_are_stripped() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# a comment with an unbalanced {{").unwrap();
        writeln!(
            file,
            r#"q: {{ description: "d" sql: {{ SELECT 1; }} }}"#
        )
        .unwrap();
        let catalog = QueryCatalog::load(&[file.path()]);
        assert!(catalog.get("q").is_some());
    }

    #[test]
    fn test_malformed_block_does_not_poison_load() {
        let text = r#"
broken: { description: "no sql section" }
fine: { description: "ok" sql: { SELECT 1; } }
"#;
        let catalog = QueryCatalog::parse(text);
        assert!(catalog.get("broken").is_none());
        assert!(catalog.get("fine").is_some());
    }

    #[test]
    fn test_resolution_defers_to_lookup() {
        let catalog = QueryCatalog::parse(SAMPLE);
        let (raw, resolved) = catalog
            .resolved_with("recent", |name| {
                (name == "LIMIT").then(|| "5".to_string())
            })
            .unwrap();
        assert!(raw.contains("${LIMIT:-10}"));
        assert!(resolved.contains("LIMIT 5"));

        let (raw, resolved) = catalog
            .resolved_with("sessions", |_| None)
            .unwrap();
        assert_eq!(raw, resolved);
    }

    #[test]
    fn test_fetch_limit_overrides_query_limit() {
        use crate::command::CommandRecord;
        use crate::storage::HistoryStore;

        let text = r#"
recent: {
  description: "last 5 commands"
  sql: { SELECT command FROM commands ORDER BY start_time DESC LIMIT 5; }
}
"#;
        let catalog = QueryCatalog::parse(text);
        let (raw, sql) = catalog.resolved_with("recent", |_| None).unwrap();
        assert_eq!(raw, sql);

        let store = HistoryStore::open_in_memory().unwrap();
        for n in 0..8 {
            let record = CommandRecord::capture(
                Some(format!("cmd{}", n)),
                0,
                100 + n,
                101 + n,
                Some(n),
                None,
            );
            store.insert(&record).unwrap();
        }

        // The SQL asks for 5 rows; the fetch-level limit trims to 3.
        let rs = store.fetch(&sql, &[], 3).unwrap().unwrap();
        assert_eq!(rs.rows.len(), 3);
    }

    #[test]
    fn test_listing_is_alphabetical_with_headings() {
        let catalog = QueryCatalog::parse(SAMPLE);
        let listing = catalog.listing();
        assert_eq!(listing.headings, vec!["Query", "Description"]);
        assert_eq!(listing.rows[0][0], Value::Text("recent".into()));
        assert_eq!(listing.rows[1][0], Value::Text("sessions".into()));
    }
}
