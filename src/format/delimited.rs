//! Delimiter-separated layouts: csv and null.

use std::io::{self, Write};

use super::Formatter;
use crate::storage::{ResultSet, Value};

/// Comma-separated output; everything that is not a number is quoted.
pub struct CsvFormatter;

impl Formatter for CsvFormatter {
    fn name(&self) -> &'static str {
        "csv"
    }

    fn description(&self) -> &'static str {
        "Columns are comma separated with strings quoted."
    }

    fn print(&self, rs: &ResultSet, show_headings: bool, out: &mut dyn Write) -> io::Result<()> {
        if show_headings {
            let cells: Vec<String> = rs.headings.iter().map(|h| quote_csv(h)).collect();
            writeln!(out, "{}", cells.join(","))?;
        }
        for row in &rs.rows {
            let cells: Vec<String> = row.iter().map(csv_cell).collect();
            writeln!(out, "{}", cells.join(","))?;
        }
        Ok(())
    }
}

fn csv_cell(value: &Value) -> String {
    if value.is_numeric() {
        value.as_display()
    } else {
        quote_csv(&value.as_display())
    }
}

fn quote_csv(text: &str) -> String {
    format!("\"{}\"", text.replace('"', "\"\""))
}

/// One record per line, fields joined with the NUL character, no quoting.
pub struct NullFormatter;

impl Formatter for NullFormatter {
    fn name(&self) -> &'static str {
        "null"
    }

    fn description(&self) -> &'static str {
        "Columns are null separated with strings unquoted."
    }

    fn print(&self, rs: &ResultSet, show_headings: bool, out: &mut dyn Write) -> io::Result<()> {
        if show_headings {
            writeln!(out, "{}", rs.headings.join("\0"))?;
        }
        for row in &rs.rows {
            let cells: Vec<String> = row.iter().map(|v| v.as_display()).collect();
            writeln!(out, "{}", cells.join("\0"))?;
        }
        Ok(())
    }
}
