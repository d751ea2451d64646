//! Progress and report rendering helpers.
//!
//! All output goes through an injected writer so the binary can route it to
//! stdout, or to stderr when machine-readable output owns stdout.

use std::io::{self, Write};

use crate::stats::ResultSet;

/// A single-line status display, overwritten in place.
///
/// Tracks the widest line printed so far and pads shorter lines to that
/// width, so a carriage return cleanly covers the previous text.
#[derive(Debug, Default)]
pub struct StatusLine {
    max_width: usize,
}

impl StatusLine {
    /// Create a new status line.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the status line with `text`.
    pub fn update(&mut self, out: &mut dyn Write, text: &str) -> io::Result<()> {
        self.max_width = self.max_width.max(text.len());
        write!(out, "{text:<width$}\r", width = self.max_width)?;
        out.flush()
    }

    /// Replace the status line with `text` and move to the next line.
    pub fn finish(&mut self, out: &mut dyn Write, text: &str) -> io::Result<()> {
        self.max_width = self.max_width.max(text.len());
        writeln!(out, "{text:<width$}", width = self.max_width)
    }
}

/// Write the per-group report, one line per group, sorted by group name.
pub fn write_group_report(results: &ResultSet, out: &mut dyn Write) -> io::Result<()> {
    let width = results.max_name_width();
    let mut groups: Vec<_> = results.groups().iter().collect();
    groups.sort_by(|a, b| a.name.cmp(&b.name));
    for group in groups {
        writeln!(out, "{}", group.render(width))?;
    }
    Ok(())
}
