//! Append-only action log: one `"{timestamp} - {message}"` line per shell result.

use chrono::{DateTime, Local, TimeZone};
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

pub const DEFAULT_LOG_FILE: &str = "log_file.log";
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H.%M.%S";

#[derive(Debug, Clone)]
pub struct ActionLog {
    path: PathBuf,
}

impl ActionLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, message: &str) -> io::Result<()> {
        self.append_at(&Local::now(), message)
    }

    pub fn append_at<Tz: TimeZone>(&self, at: &DateTime<Tz>, message: &str) -> io::Result<()>
    where
        Tz::Offset: std::fmt::Display,
    {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", format_entry(at, message))
    }

    /// Like `append`, but a failure only produces a warning.
    pub fn record(&self, message: &str) {
        if let Err(e) = self.append(message) {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to write action log");
        }
    }
}

pub fn format_entry<Tz: TimeZone>(at: &DateTime<Tz>, message: &str) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("{} - {}", at.format(TIMESTAMP_FORMAT), message)
}
