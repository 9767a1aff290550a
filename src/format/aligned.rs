//! Aligned-column layout.

use std::io::{self, Write};

use super::{column_widths, write_aligned_row, Formatter};
use crate::storage::ResultSet;

/// Left-justified columns padded to a shared width per column.
pub struct AlignedFormatter;

impl Formatter for AlignedFormatter {
    fn name(&self) -> &'static str {
        "aligned"
    }

    fn description(&self) -> &'static str {
        "Columns are aligned and separated with spaces."
    }

    fn print(&self, rs: &ResultSet, show_headings: bool, out: &mut dyn Write) -> io::Result<()> {
        let widths = column_widths(rs, show_headings);

        if show_headings {
            write_aligned_row(&rs.headings, &widths, out)?;
        }
        for row in &rs.rows {
            let values: Vec<String> = row.iter().map(|v| v.as_display()).collect();
            write_aligned_row(&values, &widths, out)?;
        }
        Ok(())
    }
}
