//! CSV manifest output.
//!
//! The manifest maps each successfully tagged file's original name to its
//! assigned tags: a `filename,tags` header, then one row per file with the
//! tag names joined `", "`. Failed files never appear.

use std::io::Write;
use std::path::Path;

use crate::error::Result;
use crate::types::RunReport;

/// Writes a run report as a two-column CSV manifest.
pub struct ManifestWriter<W: Write> {
    writer: csv::Writer<W>,
    rows_written: usize,
}

impl<W: Write> ManifestWriter<W> {
    /// Create a manifest writer over any `Write` target.
    pub fn new(writer: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(writer),
            rows_written: 0,
        }
    }

    /// Write the header plus one row per tagged file, keyed by the
    /// original filename. The CSV writer quotes the tags cell only when it
    /// contains a comma (i.e. when more than one tag was assigned).
    pub fn write_report(&mut self, report: &RunReport) -> Result<()> {
        self.writer.write_record(["filename", "tags"])?;
        for file in &report.tagged {
            self.writer
                .write_record([file.file_name.as_str(), file.joined_tags().as_str()])?;
            self.rows_written += 1;
        }
        Ok(())
    }

    /// Number of data rows written (the header is not counted).
    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Flush the underlying writer.
    pub fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }
}

/// Write a report's manifest to a file path.
pub fn write_manifest(report: &RunReport, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)?;
    let mut writer = ManifestWriter::new(file);
    writer.write_report(report)?;
    writer.flush()?;
    Ok(())
}
