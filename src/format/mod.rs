//! Result formatting engine.
//!
//! Every formatter renders a [`ResultSet`] to a stream through the same
//! [`Formatter`] trait; which one runs is chosen by name at the CLI. The
//! interesting one is [`grouped::GroupedFormatter`], which collapses
//! repeated leading-column values to minimize printed screen area.

pub mod aligned;
pub mod delimited;
pub mod grouped;

use std::io::{self, Write};

use crate::storage::{ResultSet, Value};

pub use aligned::AlignedFormatter;
pub use delimited::{CsvFormatter, NullFormatter};
pub use grouped::GroupedFormatter;

/// The column separator used by the layout formatters.
pub const SEPARATOR: &str = "   ";

/// Measured column widths are capped here; longer values still print whole.
pub const MAX_COLUMN_WIDTH: usize = 80;

/// Renders result sets to a stream.
pub trait Formatter {
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// Write the result set. When `show_headings` is false the heading row
    /// is omitted entirely, not blanked.
    fn print(&self, rs: &ResultSet, show_headings: bool, out: &mut dyn Write) -> io::Result<()>;
}

/// All available formatters, in listing (alphabetical) order.
pub fn all() -> Vec<Box<dyn Formatter>> {
    vec![
        Box::new(AlignedFormatter),
        Box::new(GroupedFormatter),
        Box::new(CsvFormatter),
        Box::new(NullFormatter),
    ]
}

/// Find a formatter by name.
pub fn lookup(name: &str) -> Option<Box<dyn Formatter>> {
    all().into_iter().find(|f| f.name() == name)
}

/// The formatters as a (name, description) result set with the synthetic
/// heading pair in place.
pub fn listing() -> ResultSet {
    let rows = all()
        .iter()
        .map(|f| vec![Value::from(f.name()), Value::from(f.description())])
        .collect();
    ResultSet::new(vec!["Format".to_string(), "Description".to_string()], rows)
}

/// Minimum width of each column over everything actually printed, capped at
/// [`MAX_COLUMN_WIDTH`]. Headings only count when they will be shown.
pub(crate) fn column_widths(rs: &ResultSet, show_headings: bool) -> Vec<usize> {
    let mut widths = vec![0usize; rs.column_count()];
    if show_headings {
        for (c, heading) in rs.headings.iter().enumerate() {
            widths[c] = widths[c].max(MAX_COLUMN_WIDTH.min(heading.chars().count()));
        }
    }
    for row in &rs.rows {
        for (c, value) in row.iter().enumerate() {
            let len = value.as_display().chars().count();
            widths[c] = widths[c].max(MAX_COLUMN_WIDTH.min(len));
        }
    }
    widths
}

/// Write one aligned row: every column but the last is left-justified to
/// its width; the last prints bare so lines carry no trailing padding.
pub(crate) fn write_aligned_row(
    values: &[String],
    widths: &[usize],
    out: &mut dyn Write,
) -> io::Result<()> {
    let last = values.len().saturating_sub(1);
    for (c, value) in values.iter().enumerate() {
        if c < last {
            write!(out, "{:<width$}{}", value, SEPARATOR, width = widths[c])?;
        } else {
            write!(out, "{}", value)?;
        }
    }
    writeln!(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ResultSet {
        ResultSet::new(
            vec!["command".to_string(), "uses".to_string()],
            vec![
                vec![Value::from("ls -la"), Value::Integer(12)],
                vec![Value::from("git status"), Value::Integer(7)],
            ],
        )
    }

    #[test]
    fn test_lookup_by_name() {
        for name in ["aligned", "auto", "csv", "null"] {
            assert_eq!(lookup(name).unwrap().name(), name);
        }
        assert!(lookup("yaml").is_none());
    }

    #[test]
    fn test_listing_shape() {
        let listing = listing();
        assert_eq!(listing.headings, vec!["Format", "Description"]);
        assert_eq!(listing.rows.len(), 4);
        assert_eq!(listing.rows[0][0], Value::Text("aligned".into()));
    }

    #[test]
    fn test_column_widths_respect_headings_flag() {
        let rs = sample();
        assert_eq!(column_widths(&rs, true), vec![10, 4]);
        assert_eq!(column_widths(&rs, false), vec![10, 2]);
    }

    #[test]
    fn test_column_widths_cap() {
        let long = "x".repeat(200);
        let rs = ResultSet::new(
            vec!["c".to_string()],
            vec![vec![Value::Text(long)]],
        );
        assert_eq!(column_widths(&rs, true), vec![MAX_COLUMN_WIDTH]);
    }
}
