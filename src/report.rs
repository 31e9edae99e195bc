//! Per-session human-readable log.
//!
//! Each record becomes a fixed five-line block followed by a blank line.

use crate::error::Result;
use crate::metadata::MetadataRecord;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::info;

/// Placeholder for absent fields
pub const NOT_AVAILABLE: &str = "N/A";

/// Writes the session log to a path fixed at construction
pub struct SessionReporter {
    path: PathBuf,
}

impl SessionReporter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write all records, replacing any existing file at the path.
    pub fn write(&self, records: &[MetadataRecord]) -> Result<&Path> {
        std::fs::write(&self.path, render(records))?;
        info!(path = ?self.path, entries = records.len(), "Session log written");
        Ok(&self.path)
    }
}

/// Render the log body
pub fn render(records: &[MetadataRecord]) -> String {
    let mut out = String::new();
    for record in records {
        let meta = record.metadata();
        let field = |value: Option<&str>| single_line(value.unwrap_or(NOT_AVAILABLE));

        // Writing into a String cannot fail
        let _ = writeln!(out, "URL: {}", single_line(&record.url));
        let _ = writeln!(out, "Title: {}", field(meta.map(|m| m.title.as_str())));
        let _ = writeln!(out, "Author: {}", field(meta.map(|m| m.author.as_str())));
        let _ = writeln!(out, "Date: {}", field(meta.map(|m| m.date.as_str())));
        let _ = writeln!(out, "PDF Link: {}", field(record.pdf_link()));
        out.push('\n');
    }
    out
}

/// Keep each field on its own line so every block stays five lines long
fn single_line(value: &str) -> String {
    value.replace(['\r', '\n'], " ")
}
