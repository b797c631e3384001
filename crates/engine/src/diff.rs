use std::fmt;

use dirsync_fs::{FileRecord, Snapshot};

/// One required change to the target tree, by snapshot key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Action {
    Delete(String),
    Create(String),
    Update(String),
}

impl Action {
    pub fn key(&self) -> &str {
        match self {
            Action::Delete(k) | Action::Create(k) | Action::Update(k) => k,
        }
    }

    /// Verb used in failure lines.
    pub fn verb(&self) -> &'static str {
        match self {
            Action::Delete(_) => "delete",
            Action::Create(_) => "copy",
            Action::Update(_) => "update",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Delete(k) => write!(f, "Deleting file: {k}"),
            Action::Create(k) => write!(f, "Copying new file: {k}"),
            Action::Update(k) => write!(f, "Updating file: {k}"),
        }
    }
}

/// Disjoint, key-sorted action sets for one pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncPlan {
    pub deletes: Vec<Action>,
    pub creates: Vec<Action>,
    pub updates: Vec<Action>,
}

impl SyncPlan {
    pub fn len(&self) -> usize {
        self.deletes.len() + self.creates.len() + self.updates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Phases in the order they must be applied.
    pub fn phases(&self) -> [&[Action]; 3] {
        [&self.deletes, &self.creates, &self.updates]
    }
}

/// Compare two snapshots.
///
/// - target keys without a source file are deleted
/// - source-only files are created
/// - shared keys are updated when kind, size or mtime differ
///
/// Source entries that are not copyable files (directory or dangling
/// links, special files) count as absent.
pub fn diff(source: &Snapshot, target: &Snapshot) -> SyncPlan {
    let mut plan = SyncPlan::default();

    for record in target.records() {
        let has_source_file = source
            .get(&record.relative_path)
            .is_some_and(FileRecord::is_file);
        if !has_source_file {
            plan.deletes.push(Action::Delete(record.relative_path.clone()));
        }
    }

    for record in source.records().filter(|r| r.is_file()) {
        match target.get(&record.relative_path) {
            None => plan.creates.push(Action::Create(record.relative_path.clone())),
            Some(existing) if record.differs_from(existing) => {
                plan.updates.push(Action::Update(record.relative_path.clone()))
            }
            Some(_) => {}
        }
    }

    // Map iteration order is arbitrary; sort so a snapshot pair always
    // yields the same plan.
    plan.deletes.sort_unstable();
    plan.creates.sort_unstable();
    plan.updates.sort_unstable();

    plan
}

#[cfg(test)]
#[path = "diff_tests.rs"]
mod tests;
