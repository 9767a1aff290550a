//! Auto-grouping layout.
//!
//! Scans columns left to right and collapses consecutive repeated values in
//! leading columns into a single printed occurrence, outline style:
//!
//! ```text
//! host1
//!    /home/user
//!       ls        0
//!       make      2
//!    /tmp
//!       vi x.txt  0
//! ```
//!
//! The grouping depth is chosen by simulating every candidate depth and
//! keeping the one with the smallest printed area (rows times width); ties
//! go to the deepest candidate.

use std::io::{self, Write};

use super::{column_widths, write_aligned_row, Formatter, SEPARATOR};
use crate::storage::{ResultSet, Value};

/// Groups repeated leading-column values to minimize printed area.
pub struct GroupedFormatter;

impl Formatter for GroupedFormatter {
    fn name(&self) -> &'static str {
        "auto"
    }

    fn description(&self) -> &'static str {
        "Redundant values are automatically grouped."
    }

    fn print(&self, rs: &ResultSet, show_headings: bool, out: &mut dyn Write) -> io::Result<()> {
        let widths = column_widths(rs, show_headings);
        let levels = grouped_level_count(rs, &widths);
        let cols = rs.column_count();
        if cols == 0 {
            return Ok(());
        }

        // Each grouped heading gets its own line, the next line indented one
        // separator deeper; the remaining headings form one aligned row.
        if show_headings {
            for c in 0..cols {
                if c < levels {
                    write!(out, "{}\n{}", rs.headings[c], SEPARATOR.repeat(c + 1))?;
                } else {
                    write_aligned_row(&rs.headings[c..], &widths[c..], out)?;
                    break;
                }
            }
        }

        let mut prev: Vec<Option<Value>> = vec![None; levels];
        for row in &rs.rows {
            for c in 0..cols {
                if c < levels {
                    let value = &row[c];
                    if prev[c].as_ref() != Some(value) {
                        // A change at this level invalidates everything
                        // remembered at deeper levels.
                        write!(out, "{}\n{}", value.as_display(), SEPARATOR.repeat(c + 1))?;
                        for deeper in prev[c..].iter_mut() {
                            *deeper = None;
                        }
                        prev[c] = Some(value.clone());
                    } else {
                        write!(out, "{}", SEPARATOR)?;
                    }
                } else {
                    let values: Vec<String> = row[c..].iter().map(|v| v.as_display()).collect();
                    write_aligned_row(&values, &widths[c..], out)?;
                    break;
                }
            }
        }
        Ok(())
    }
}

/// The grouping depth that minimizes printed area.
///
/// `areas[d]` is the simulated area with `d` leading columns grouped.
/// Grouping column `c` replaces its repeats with one printed occurrence
/// (each value change adds an output line) and re-shapes the width to
/// `max(width - col, col) + separator * (c + 1)`. The break count is
/// cumulative across levels, matching how the nested render actually emits
/// one line per group header. Of all depths sharing the minimal area the
/// deepest wins; the last column never groups, and an empty row set never
/// groups at all.
pub(crate) fn grouped_level_count(rs: &ResultSet, widths: &[usize]) -> usize {
    let rows = &rs.rows;
    if rows.is_empty() || widths.len() < 2 {
        return 0;
    }

    let sep = SEPARATOR.len();
    let mut width: usize = widths.iter().sum::<usize>() + sep * (widths.len() - 1);
    let mut length = rows.len();

    let mut areas = vec![width * length; widths.len()];
    for c in 0..widths.len() - 1 {
        let mut prev: Option<&Value> = None;
        for row in rows {
            if prev != Some(&row[c]) {
                length += 1;
                prev = Some(&row[c]);
            }
        }
        width = width.saturating_sub(widths[c]).max(widths[c]) + sep * (c + 1);
        areas[c + 1] = width * length;
    }

    let min_area = *areas.iter().min().unwrap_or(&0);
    for c in (0..areas.len()).rev() {
        if areas[c] == min_area {
            return c;
        }
    }
    0
}
