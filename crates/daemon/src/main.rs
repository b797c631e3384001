use std::{
    process::ExitCode,
    sync::{Arc, atomic::AtomicBool},
};

mod config;

use anyhow::{Context, Result};
use clap::Parser;
use config::{Cli, DaemonConfig};
use dirsync_engine::{Scheduler, SyncRunner};
use dirsync_fs::LocalFs;
use dirsync_runtime::{PROGRAM_NAME, logging};
use log::{error, info};
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::flag;

fn main() -> ExitCode {
    logging::init().ok();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("[error] {e:#}");
            eprintln!("[{PROGRAM_NAME}] {e:#}");
            ExitCode::from(2)
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = DaemonConfig::from_args(cli)?;
    let runner = SyncRunner::new(config.sync, LocalFs);
    let sync = runner.config();

    info!(
        "Starting {PROGRAM_NAME}: source={}, target={}, logs={}, interval={}s, workers={}",
        sync.source.display(),
        sync.target.display(),
        sync.log_dir.display(),
        sync.interval.as_secs(),
        sync.workers,
    );

    if config.once {
        // Runtime failures are reported in the log, never via exit status.
        runner.run_pass();
        return Ok(());
    }

    // Handlers only set the flag; the scheduler polls it between passes.
    let shutdown = Arc::new(AtomicBool::new(false));
    for sig in [SIGINT, SIGTERM] {
        flag::register(sig, Arc::clone(&shutdown))
            .with_context(|| format!("Failed to register signal handler for {sig}"))?;
    }

    println!(
        "Syncing {} -> {} every {} minute(s). Press Ctrl+C to stop.",
        sync.source.display(),
        sync.target.display(),
        cli.interval_minutes
    );

    let interval = sync.interval;
    Scheduler::new(runner, interval, shutdown).run();

    info!("{PROGRAM_NAME} stopped.");
    Ok(())
}
