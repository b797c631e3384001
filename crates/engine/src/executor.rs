use std::{io, path::Path, thread};

use crossbeam::channel;
use dirsync_fs::{FileSystem, key_to_path};
use dirsync_runtime::Journal;
use log::{debug, warn};

use crate::diff::{Action, SyncPlan};

/// An action that could not be applied. The rest of the pass continues.
#[derive(Debug)]
pub struct ActionFailure {
    pub action: Action,
    pub error: io::Error,
}

/// Tally of one executed plan.
#[derive(Debug, Default)]
pub struct PassReport {
    pub deleted: usize,
    pub created: usize,
    pub updated: usize,
    /// Deletes whose file was already gone
    pub already_absent: usize,
    pub failures: Vec<ActionFailure>,
}

impl PassReport {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn summary(&self) -> String {
        format!(
            "Sync finished: {} deleted, {} created, {} updated, {} failed",
            self.deleted + self.already_absent,
            self.created,
            self.updated,
            self.failed()
        )
    }

    fn record(&mut self, action: Action, result: io::Result<Applied>) {
        match result {
            Ok(Applied::Deleted) => self.deleted += 1,
            Ok(Applied::AlreadyAbsent) => self.already_absent += 1,
            Ok(Applied::Created) => self.created += 1,
            Ok(Applied::Updated) => self.updated += 1,
            Err(error) => self.failures.push(ActionFailure { action, error }),
        }
    }
}

enum Applied {
    Deleted,
    AlreadyAbsent,
    Created,
    Updated,
}

/// Applies a [`SyncPlan`] to the target tree.
///
/// Phases run strictly in order (deletes, creates, updates); actions inside
/// a phase touch distinct keys and are spread over up to `workers` threads.
pub struct Executor<'a, F: FileSystem + ?Sized> {
    fs: &'a F,
    journal: &'a dyn Journal,
    source_root: &'a Path,
    target_root: &'a Path,
    workers: usize,
}

impl<'a, F: FileSystem + ?Sized> Executor<'a, F> {
    pub fn new(
        fs: &'a F,
        journal: &'a dyn Journal,
        source_root: &'a Path,
        target_root: &'a Path,
        workers: usize,
    ) -> Self {
        Self {
            fs,
            journal,
            source_root,
            target_root,
            workers: workers.max(1),
        }
    }

    pub fn apply(&self, plan: &SyncPlan) -> PassReport {
        let mut report = PassReport::default();

        for phase in plan.phases() {
            for (action, result) in self.run_phase(phase) {
                report.record(action, result);
            }
        }

        report.failures.sort_by(|a, b| a.action.cmp(&b.action));
        report
    }

    /// Returns once every action of the phase has finished.
    fn run_phase(&self, actions: &[Action]) -> Vec<(Action, io::Result<Applied>)> {
        let num_threads = self.workers.min(actions.len());

        if num_threads <= 1 {
            return actions
                .iter()
                .map(|a| (a.clone(), self.apply_one(a)))
                .collect();
        }

        debug!(
            "[executor] {} actions over {} threads",
            actions.len(),
            num_threads
        );

        let (work_tx, work_rx) = channel::unbounded::<&Action>();
        let (done_tx, done_rx) = channel::unbounded();

        for action in actions {
            let _ = work_tx.send(action);
        }
        drop(work_tx);

        thread::scope(|s| {
            for _ in 0..num_threads {
                let work_rx = work_rx.clone();
                let done_tx = done_tx.clone();

                s.spawn(move || {
                    for action in work_rx.iter() {
                        let result = self.apply_one(action);
                        if done_tx.send((action.clone(), result)).is_err() {
                            return;
                        }
                    }
                });
            }
        });
        drop(done_tx);

        done_rx.iter().collect()
    }

    fn apply_one(&self, action: &Action) -> io::Result<Applied> {
        self.journal.record(&action.to_string());

        let result = match action {
            Action::Delete(key) => self.delete(key),
            Action::Create(key) => self.copy(key, false).map(|()| Applied::Created),
            Action::Update(key) => self.copy(key, true).map(|()| Applied::Updated),
        };

        if let Err(e) = &result {
            warn!("[executor] {} {}: {e}", action.verb(), action.key());
            self.journal
                .record(&format!("Failed to {} {}: {e}", action.verb(), action.key()));
        }

        result
    }

    fn delete(&self, key: &str) -> io::Result<Applied> {
        match self.fs.delete(&key_to_path(self.target_root, key)) {
            Ok(()) => Ok(Applied::Deleted),
            // Someone else removed it first; absence is what we wanted.
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("[executor] {key} already absent");
                Ok(Applied::AlreadyAbsent)
            }
            Err(e) => Err(e),
        }
    }

    fn copy(&self, key: &str, overwrite: bool) -> io::Result<()> {
        let src = key_to_path(self.source_root, key);
        let dst = key_to_path(self.target_root, key);

        if let Some(parent) = dst.parent() {
            self.fs.create_dir_chain(parent)?;
        }

        self.fs.copy(&src, &dst, overwrite).map(|_| ())
    }
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
