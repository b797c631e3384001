use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use dirsync_engine::SyncConfig;
use dirsync_runtime::{PROGRAM_NAME, default_workers};

#[derive(Debug, Parser)]
#[command(
    name = PROGRAM_NAME,
    version,
    about = "Mirror a source directory into a target directory on a fixed interval"
)]
pub struct Cli {
    /// Directory to mirror from
    pub source: PathBuf,

    /// Directory to mirror into; files missing from the source are deleted
    pub target: PathBuf,

    /// Directory for the daily sync_<YYYYMMDD>.log files
    pub log_dir: PathBuf,

    /// Minutes between the starts of two passes
    #[arg(value_parser = clap::value_parser!(u64).range(1..))]
    pub interval_minutes: u64,

    /// Worker threads for scanning and copying (default: available cores)
    #[arg(long, short = 'j')]
    pub workers: Option<usize>,

    /// Run a single pass and exit.
    #[arg(long)]
    pub once: bool,
}

#[derive(Debug, Clone)]
pub struct DaemonConfig {
    pub sync: SyncConfig,
    pub once: bool,
}

impl DaemonConfig {
    pub fn from_args(args: &Cli) -> Result<Self> {
        let workers = args.workers.unwrap_or_else(default_workers);

        let sync = SyncConfig::new(
            &args.source,
            &args.target,
            &args.log_dir,
            args.interval_minutes,
            workers,
        )?;

        Ok(Self {
            sync,
            once: args.once,
        })
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
