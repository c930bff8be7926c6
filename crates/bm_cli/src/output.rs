//! Record listings.

use bm_core::Record;
use owo_colors::OwoColorize;
use std::io::{self, Write};

/// Writes one line per record: the ID right-aligned to the widest ID, two
/// spaces, then the command.
///
/// On a terminal IDs are green and bold, and entries are separated by blank
/// lines.
pub fn print_records(out: &mut dyn Write, records: &[Record], tty: bool) -> io::Result<()> {
    let width = records
        .iter()
        .map(|r| r.id.chars().count())
        .max()
        .unwrap_or(0);

    if tty && !records.is_empty() {
        writeln!(out)?;
    }
    for record in records {
        let padded = format!("{:>width$}", record.id);
        if tty {
            writeln!(out, " {}  {}", padded.green().bold(), record.command)?;
            writeln!(out)?;
        } else {
            writeln!(out, " {}  {}", padded, record.command)?;
        }
    }
    Ok(())
}
