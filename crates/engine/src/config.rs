use std::{
    path::PathBuf,
    time::{Duration, Instant},
};

use anyhow::{Context, Result, ensure};

/// Process-wide sync settings, fixed at startup.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub source: PathBuf,
    pub target: PathBuf,
    pub log_dir: PathBuf,
    /// Time between the starts of two consecutive passes
    pub interval: Duration,
    /// Pool size for the walkers and for each executor phase
    pub workers: usize,
}

impl SyncConfig {
    pub fn new(
        source: impl Into<PathBuf>,
        target: impl Into<PathBuf>,
        log_dir: impl Into<PathBuf>,
        interval_minutes: u64,
        workers: usize,
    ) -> Result<Self> {
        ensure!(interval_minutes > 0, "Interval must be a positive integer.");
        ensure!(workers > 0, "Worker count must be at least 1.");

        let interval = interval_minutes
            .checked_mul(60)
            .map(Duration::from_secs)
            .filter(|d| Instant::now().checked_add(*d).is_some())
            .context("Interval is too large.")?;

        Ok(Self {
            source: source.into(),
            target: target.into(),
            log_dir: log_dir.into(),
            interval,
            workers,
        })
    }
}
