use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
    time::{Duration, Instant},
};

use dirsync_fs::FileSystem;
use log::{debug, info, warn};

use crate::pass::{PassOutcome, SyncRunner};

/// How often an idle scheduler looks at the shutdown flag.
pub const SHUTDOWN_POLL: Duration = Duration::from_millis(200);

/// Something that performs one sync pass.
pub trait PassRunner: Send + Sync {
    fn run_pass(&self) -> PassOutcome;
}

impl<F: FileSystem> PassRunner for SyncRunner<F> {
    fn run_pass(&self) -> PassOutcome {
        SyncRunner::run_pass(self)
    }
}

/// Single-slot gate: at most one pass holds it at a time.
#[derive(Debug, Default)]
pub struct PassGate {
    running: AtomicBool,
}

/// Held for the duration of a pass; releases the gate on drop, panics included.
pub struct PassGuard<'a> {
    gate: &'a PassGate,
}

impl PassGate {
    pub fn try_enter(&self) -> Option<PassGuard<'_>> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| PassGuard { gate: self })
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

impl Drop for PassGuard<'_> {
    fn drop(&mut self) {
        self.gate.running.store(false, Ordering::Release);
    }
}

/// Fixed-rate deadlines anchored at the first pass start.
///
/// Ticks that fall inside an overrunning pass are dropped, not queued.
#[derive(Debug, Clone)]
pub struct FixedRate {
    next: Instant,
    interval: Duration,
}

impl FixedRate {
    pub fn new(anchor: Instant, interval: Duration) -> Self {
        Self {
            next: anchor,
            interval,
        }
    }

    /// Advance to the next deadline not earlier than `now`. Returns the
    /// deadline and how many ticks were skipped to reach it, or `None` when
    /// that deadline lies beyond what an `Instant` can represent.
    pub fn advance(&mut self, now: Instant) -> Option<(Instant, u64)> {
        if self.interval.is_zero() {
            self.next = now;
            return Some((now, 0));
        }

        self.next = self.next.checked_add(self.interval)?;

        let mut missed = 0;
        while self.next < now {
            self.next = self.next.checked_add(self.interval)?;
            missed += 1;
        }

        Some((self.next, missed))
    }
}

#[derive(Debug)]
pub enum TickOutcome {
    Ran(PassOutcome),
    /// Another pass was still running; this trigger was dropped.
    Busy,
}

pub struct Scheduler<R: PassRunner> {
    runner: R,
    interval: Duration,
    gate: PassGate,
    shutdown: Arc<AtomicBool>,
}

impl<R: PassRunner> Scheduler<R> {
    pub fn new(runner: R, interval: Duration, shutdown: Arc<AtomicBool>) -> Self {
        Self {
            runner,
            interval,
            gate: PassGate::default(),
            shutdown,
        }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Run one pass unless one is already in progress.
    pub fn trigger(&self) -> TickOutcome {
        let Some(_guard) = self.gate.try_enter() else {
            warn!("[scheduler] pass still running; tick ignored");
            return TickOutcome::Busy;
        };

        let outcome = self.runner.run_pass();
        match &outcome {
            PassOutcome::Completed(report) if report.is_clean() => {
                info!("[scheduler] {}", report.summary())
            }
            PassOutcome::Completed(report) => {
                warn!("[scheduler] {}", report.summary())
            }
            PassOutcome::Skipped(reason) => warn!("[scheduler] pass skipped: {reason}"),
        }

        TickOutcome::Ran(outcome)
    }

    /// Pass now, then every `interval` from that start until shutdown.
    pub fn run(&self) {
        let mut rate = FixedRate::new(Instant::now(), self.interval);
        self.trigger();

        loop {
            let deadline = match rate.advance(Instant::now()) {
                Some((deadline, missed)) => {
                    if missed > 0 {
                        warn!("[scheduler] pass overran the interval; skipped {missed} tick(s)");
                    }
                    Some(deadline)
                }
                None => {
                    warn!("[scheduler] next tick is out of range; idling until shutdown");
                    None
                }
            };

            if !self.sleep_until(deadline) {
                info!("[scheduler] shutdown requested; stopping.");
                return;
            }

            debug!("[scheduler] tick");
            self.trigger();
        }
    }

    /// False if shutdown was requested before the deadline. With no deadline
    /// only shutdown ends the wait.
    fn sleep_until(&self, deadline: Option<Instant>) -> bool {
        loop {
            if self.shutdown.load(Ordering::Relaxed) {
                return false;
            }

            let nap = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return true;
                    }
                    (deadline - now).min(SHUTDOWN_POLL)
                }
                None => SHUTDOWN_POLL,
            };

            thread::sleep(nap);
        }
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
