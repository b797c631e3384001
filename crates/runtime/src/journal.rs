use std::{
    fs::{self, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
    sync::Mutex,
};

use chrono::{DateTime, Local, NaiveDate};
use log::warn;

use crate::config::{
    PASS_BANNER_RULE, PASS_TIMESTAMP_FORMAT, SYNC_LOG_DATE_FORMAT, SYNC_LOG_EXT, SYNC_LOG_PREFIX,
};

/// Sink for the human-readable record of a sync pass.
pub trait Journal: Send + Sync {
    fn record(&self, line: &str);

    fn banner(&self, started_at: DateTime<Local>) {
        self.record(PASS_BANNER_RULE);
        self.record(&format!(
            "Sync started at {}",
            started_at.format(PASS_TIMESTAMP_FORMAT)
        ));
    }
}

/// `<log_dir>/sync_<YYYYMMDD>.log`
pub fn sync_log_path(log_dir: &Path, date: NaiveDate) -> PathBuf {
    log_dir.join(format!(
        "{SYNC_LOG_PREFIX}{}{SYNC_LOG_EXT}",
        date.format(SYNC_LOG_DATE_FORMAT)
    ))
}

/// Appends to the dated log file of the day the pass started and echoes
/// every line to stdout.
pub struct DailyJournal {
    path: PathBuf,
    echo: bool,
    file_lock: Mutex<()>,
}

impl DailyJournal {
    /// Creates `log_dir` if needed. Fails only when the directory cannot be
    /// created, which makes the pass unrunnable.
    pub fn open(log_dir: &Path, started_at: DateTime<Local>) -> io::Result<Self> {
        fs::create_dir_all(log_dir)?;

        Ok(Self {
            path: sync_log_path(log_dir, started_at.date_naive()),
            echo: true,
            file_lock: Mutex::new(()),
        })
    }

    /// Disable the stdout echo (tests, `--quiet` style callers).
    pub fn without_echo(mut self) -> Self {
        self.echo = false;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append_line(&self, line: &str) -> io::Result<()> {
        let mut buf = String::with_capacity(line.len() + 1);
        buf.push_str(line);
        buf.push('\n');

        // Workers record concurrently; serialize so lines never interleave.
        let _guard = self.file_lock.lock().unwrap_or_else(|e| e.into_inner());

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(buf.as_bytes())
    }
}

impl Journal for DailyJournal {
    fn record(&self, line: &str) {
        if self.echo {
            println!("{line}");
        }

        if let Err(e) = self.append_line(line) {
            warn!("failed to append to {}: {e}", self.path.display());
        }
    }
}

/// In-memory journal, used by tests and anywhere lines need inspecting.
#[derive(Default)]
pub struct MemoryJournal {
    lines: Mutex<Vec<String>>,
}

impl MemoryJournal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl Journal for MemoryJournal {
    fn record(&self, line: &str) {
        self.lines
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(line.to_owned());
    }
}

#[cfg(test)]
#[path = "journal_tests.rs"]
mod tests;
