use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use log::error;

use crate::error::{MigrateError, Result};

/// Operator-facing log of failed requests.
///
/// The file is truncated when the log is created, so it only ever describes
/// the current run. Each failure appends one entry with the last test case
/// and test cycle keys seen so far, which tells the operator how far the run
/// got before the failure.
pub struct ErrorLog {
    path: PathBuf,
    entries: usize,
    test_case_key: Option<String>,
    cycle_key: Option<String>,
}

impl ErrorLog {
    pub fn create(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        fs::write(&path, "")?;

        Ok(Self {
            path,
            entries: 0,
            test_case_key: None,
            cycle_key: None,
        })
    }

    pub fn set_test_case_key(&mut self, key: &str) {
        self.test_case_key = Some(key.to_string());
    }

    pub fn set_cycle_key(&mut self, key: &str) {
        self.cycle_key = Some(key.to_string());
    }

    /// Append a failure entry for `operation`.
    pub fn record(&mut self, operation: &str, err: &MigrateError) -> Result<()> {
        error!("{operation} failed: {err}");

        let mut entry = format!("[{}] {operation}\n", Utc::now().to_rfc3339());
        if let Some(key) = &self.test_case_key {
            entry.push_str(&format!("Last Test Case Key: {key}\n"));
        }
        if let Some(key) = &self.cycle_key {
            entry.push_str(&format!("Last Test Cycle Key: {key}\n"));
        }
        if let Some(status) = err.status() {
            entry.push_str(&format!("Status: {status}\n"));
        }
        entry.push_str("Response Content:\n");
        entry.push_str(&err.response_content());
        entry.push_str("\n\n");

        let mut file = OpenOptions::new().append(true).create(true).open(&self.path)?;
        file.write_all(entry.as_bytes())?;

        self.entries += 1;
        Ok(())
    }

    pub fn entries(&self) -> usize {
        self.entries
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
