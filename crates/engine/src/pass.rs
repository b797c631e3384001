use std::{fmt, io, path::PathBuf, thread};

use chrono::{DateTime, Local};
use dirsync_fs::{FileSystem, Snapshot, build_snapshot};
use dirsync_runtime::{DailyJournal, Journal};
use log::{info, warn};

use crate::{
    config::SyncConfig,
    diff::diff,
    executor::{Executor, PassReport},
};

/// Why a pass did nothing.
#[derive(Debug)]
pub enum SkipReason {
    SourceMissing(PathBuf),
    TargetMissing(PathBuf),
    LogUnavailable { dir: PathBuf, error: io::Error },
    ScanFailed { root: PathBuf, error: io::Error },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::SourceMissing(p) => {
                write!(f, "Source directory does not exist: {}", p.display())
            }
            SkipReason::TargetMissing(p) => {
                write!(f, "Target directory does not exist: {}", p.display())
            }
            SkipReason::LogUnavailable { dir, error } => {
                write!(f, "Log directory unavailable: {}: {error}", dir.display())
            }
            SkipReason::ScanFailed { root, error } => {
                write!(f, "Failed to scan {}: {error}", root.display())
            }
        }
    }
}

#[derive(Debug)]
pub enum PassOutcome {
    Completed(PassReport),
    Skipped(SkipReason),
}

impl PassOutcome {
    pub fn report(&self) -> Option<&PassReport> {
        match self {
            PassOutcome::Completed(report) => Some(report),
            PassOutcome::Skipped(_) => None,
        }
    }
}

/// One full pass: check roots, snapshot both trees, diff, apply.
pub fn run_pass<F: FileSystem + ?Sized>(
    config: &SyncConfig,
    fs: &F,
    journal: &dyn Journal,
    started_at: DateTime<Local>,
) -> PassOutcome {
    journal.banner(started_at);

    match prepare(config, fs) {
        Ok((source, target)) => {
            let plan = diff(&source, &target);
            info!(
                "[pass] {} source files, {} target files, {} actions",
                source.len(),
                target.len(),
                plan.len()
            );

            let report =
                Executor::new(fs, journal, &config.source, &config.target, config.workers)
                    .apply(&plan);
            journal.record(&report.summary());
            PassOutcome::Completed(report)
        }
        Err(reason) => {
            warn!("[pass] skipped: {reason}");
            journal.record(&reason.to_string());
            PassOutcome::Skipped(reason)
        }
    }
}

fn prepare<F: FileSystem + ?Sized>(
    config: &SyncConfig,
    fs: &F,
) -> Result<(Snapshot, Snapshot), SkipReason> {
    if !fs.is_dir(&config.source) {
        return Err(SkipReason::SourceMissing(config.source.clone()));
    }
    if !fs.is_dir(&config.target) {
        return Err(SkipReason::TargetMissing(config.target.clone()));
    }

    // The two walks are independent; both must finish before diffing.
    let (source, target) = thread::scope(|s| {
        let source = s.spawn(|| build_snapshot(&config.source, config.workers));
        let target = build_snapshot(&config.target, config.workers);
        (join_walk(source), target)
    });

    let source = source.map_err(|error| SkipReason::ScanFailed {
        root: config.source.clone(),
        error,
    })?;
    let target = target.map_err(|error| SkipReason::ScanFailed {
        root: config.target.clone(),
        error,
    })?;

    Ok((source, target))
}

fn join_walk(handle: thread::ScopedJoinHandle<'_, io::Result<Snapshot>>) -> io::Result<Snapshot> {
    handle
        .join()
        .map_err(|_| io::Error::other("snapshot thread panicked"))?
}

/// Runs passes against the local disk, writing each to the dated log
/// under `config.log_dir`.
pub struct SyncRunner<F: FileSystem> {
    config: SyncConfig,
    fs: F,
    echo: bool,
}

impl<F: FileSystem> SyncRunner<F> {
    pub fn new(config: SyncConfig, fs: F) -> Self {
        Self {
            config,
            fs,
            echo: true,
        }
    }

    /// Keep journal lines off stdout.
    pub fn quiet(mut self) -> Self {
        self.echo = false;
        self
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn run_pass(&self) -> PassOutcome {
        let started_at = Local::now();

        let journal = match DailyJournal::open(&self.config.log_dir, started_at) {
            Ok(journal) if self.echo => journal,
            Ok(journal) => journal.without_echo(),
            Err(error) => {
                let reason = SkipReason::LogUnavailable {
                    dir: self.config.log_dir.clone(),
                    error,
                };
                warn!("[pass] skipped: {reason}");
                if self.echo {
                    println!("{reason}");
                }
                return PassOutcome::Skipped(reason);
            }
        };

        run_pass(&self.config, &self.fs, &journal, started_at)
    }
}

#[cfg(test)]
#[path = "pass_tests.rs"]
mod tests;
