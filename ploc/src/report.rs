//! Top-N section rendering for the CLI report.

use std::io::{self, Write};

use console::Style;
use ploclib::{MeasureOptions, ResultSet};

/// Write the optional top-N sections selected by the options.
///
/// Section order follows the flag order of the tool: largest, worst,
/// smallest, then the alphabetical file listing.
pub fn write_sections(
    results: &ResultSet,
    options: &MeasureOptions,
    out: &mut dyn Write,
) -> io::Result<()> {
    let header = Style::new().bold();

    if let Some(n) = options.largest {
        writeln!(
            out,
            "{}",
            header.apply_to(format!("Largest {n} files after expansion:"))
        )?;
        for unit in results.largest(n) {
            writeln!(out, "{unit}")?;
        }
    }
    if let Some(n) = options.worst {
        writeln!(
            out,
            "{}",
            header.apply_to(format!("Worst expansion ({n} files):"))
        )?;
        for unit in results.worst(n) {
            writeln!(out, "{unit}")?;
        }
    }
    if let Some(n) = options.smallest {
        writeln!(
            out,
            "{}",
            header.apply_to(format!("Smallest {n} input files:"))
        )?;
        for unit in results.smallest(n) {
            writeln!(out, "{unit}")?;
        }
    }
    if let Some(n) = options.files {
        writeln!(out, "{}", header.apply_to("List of input files:"))?;
        for unit in results.listing(n) {
            writeln!(out, "{unit}")?;
        }
    }
    Ok(())
}
