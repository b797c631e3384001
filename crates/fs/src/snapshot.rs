use std::{
    io,
    path::{Path, PathBuf},
    thread,
};

use crossbeam::channel;
use hashbrown::HashMap;
use log::debug;

use crate::{record::FileRecord, walker::walk_parallel};

/// Every file under one root, keyed by normalized relative path.
///
/// Built fresh for each pass and dropped with it.
#[derive(Debug, Default)]
pub struct Snapshot {
    root: PathBuf,
    files: HashMap<String, FileRecord>,
}

impl Snapshot {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            files: HashMap::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Last write wins on a duplicate key.
    pub fn insert(&mut self, record: FileRecord) {
        if let Some(prev) = self.files.insert(record.relative_path.clone(), record) {
            debug!("[snapshot] duplicate key {}", prev.relative_path);
        }
    }

    pub fn get(&self, key: &str) -> Option<&FileRecord> {
        self.files.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.files.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &FileRecord> {
        self.files.values()
    }
}

/// Walk `root` with `num_threads` workers and collect the result.
pub fn build_snapshot(root: &Path, num_threads: usize) -> io::Result<Snapshot> {
    let (file_tx, file_rx) = channel::unbounded::<Vec<FileRecord>>();

    let walker_handle = {
        let root = root.to_path_buf();
        let tx = file_tx.clone();

        thread::spawn(move || walk_parallel(&root, tx, num_threads))
    };

    drop(file_tx);

    let mut snapshot = Snapshot::new(root);
    while let Ok(batch) = file_rx.recv() {
        for record in batch {
            snapshot.insert(record);
        }
    }

    walker_handle
        .join()
        .map_err(|_| io::Error::other("filesystem walker thread panicked"))??;

    debug!(
        "[snapshot] {}: {} files",
        snapshot.root.display(),
        snapshot.len()
    );

    Ok(snapshot)
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
