//! Plain-text move reports kept in the scanned root.

use crate::error::{MediaError, Result};
use crate::ledger::{LedgerEntry, ResultLedger};
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::Path;

pub const GARBAGE_HEADER: &str = "=== Garbage Files Moved ===";
pub const DUPLICATE_HEADER: &str = "=== Duplicate Files Moved ===";

/// Append the image report: a garbage section then a duplicate section.
pub fn append_image_report(path: &Path, ledger: &ResultLedger) -> Result<()> {
    write_report(path, |out| {
        writeln!(out, "{GARBAGE_HEADER}")?;
        write_entries(out, ledger.garbage())?;
        writeln!(out)?;
        writeln!(out, "{DUPLICATE_HEADER}")?;
        write_entries(out, ledger.duplicates())
    })
}

/// Append the video report: one moved duplicate per line.
pub fn append_video_report(path: &Path, ledger: &ResultLedger) -> Result<()> {
    write_report(path, |out| write_entries(out, ledger.duplicates()))
}

fn write_report<F>(path: &Path, body: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<std::fs::File>) -> std::io::Result<()>,
{
    let to_report_err = |source: std::io::Error| MediaError::Report {
        path: path.to_path_buf(),
        source,
    };
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(to_report_err)?;
    let mut out = BufWriter::new(file);
    body(&mut out).map_err(to_report_err)?;
    out.flush().map_err(to_report_err)
}

fn write_entries<'a, W: Write>(
    out: &mut W,
    entries: impl Iterator<Item = &'a LedgerEntry>,
) -> std::io::Result<()> {
    for entry in entries {
        if let Some(dest) = &entry.destination {
            writeln!(out, "{}", dest.display())?;
        }
    }
    Ok(())
}
