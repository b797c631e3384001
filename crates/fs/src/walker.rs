use std::{
    fs::{self, read_dir},
    io::{self, Result},
    path::{Path, PathBuf},
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    thread,
    time::Duration,
};

use crossbeam::channel::{self, RecvTimeoutError, Sender};
use log::{debug, warn};

use crate::{
    config::{BATCH_SIZE, IDLE_POLL_MS},
    normalize::normalize_key,
    record::{FileRecord, RecordKind},
};

/// Shared state of one walk. The first error wins and stops further
/// directory reads; a walk that saw an error is never reported as complete.
struct WalkContext {
    root: PathBuf,
    failed: AtomicBool,
    first_error: Mutex<Option<io::Error>>,
}

impl WalkContext {
    fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            failed: AtomicBool::new(false),
            first_error: Mutex::new(None),
        }
    }

    fn fail(&self, err: io::Error) {
        let mut slot = self.first_error.lock().unwrap_or_else(|e| e.into_inner());
        if slot.is_none() {
            *slot = Some(err);
        }
        self.failed.store(true, Ordering::Release);
    }

    fn has_failed(&self) -> bool {
        self.failed.load(Ordering::Acquire)
    }

    fn take_error(&self) -> Option<io::Error> {
        self.first_error
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
    }
}

/// What a single directory entry turned out to be.
enum Entry {
    Record(FileRecord),
    Dir(PathBuf),
}

/// Multi-threaded walk of every non-directory entry under `root`.
///
/// Workers share a directory queue; each directory read pushes its
/// subdirectories back onto the queue and its files into a batch that is
/// sent through `file_tx`. Any read or metadata failure aborts the walk and
/// is returned, since a partial listing must not drive deletions.
pub fn walk_parallel(root: &Path, file_tx: Sender<Vec<FileRecord>>, num_threads: usize) -> Result<()> {
    let (work_tx, work_rx) = channel::unbounded::<PathBuf>();
    let ctx = Arc::new(WalkContext::new(root));

    // Track pending work items to know when to terminate
    let pending = Arc::new(AtomicUsize::new(1));
    let _ = work_tx.send(root.to_path_buf());

    let num_threads = num_threads.max(1);
    debug!("[walk_parallel] {} with {} threads", root.display(), num_threads);

    thread::scope(|s| {
        for _ in 0..num_threads {
            let work_rx = work_rx.clone();
            let work_tx = work_tx.clone();
            let file_tx = file_tx.clone();
            let ctx = Arc::clone(&ctx);
            let pending = Arc::clone(&pending);

            s.spawn(move || {
                worker_loop(work_rx, work_tx, file_tx, &ctx, &pending);
            });
        }
    });

    match ctx.take_error() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

fn worker_loop(
    work_rx: channel::Receiver<PathBuf>,
    work_tx: channel::Sender<PathBuf>,
    file_tx: Sender<Vec<FileRecord>>,
    ctx: &WalkContext,
    pending: &AtomicUsize,
) {
    let mut batch = Vec::with_capacity(BATCH_SIZE);

    loop {
        match work_rx.recv_timeout(Duration::from_millis(IDLE_POLL_MS)) {
            Ok(dir) => {
                // After a failure, queued directories are drained unread.
                if !ctx.has_failed()
                    && let Err(e) = scan_dir(&dir, &work_tx, &mut batch, ctx, pending)
                {
                    warn!("[walk] {} failed: {e}", dir.display());
                    ctx.fail(e);
                }

                if batch.len() >= BATCH_SIZE {
                    let to_send = std::mem::take(&mut batch);
                    if file_tx.send(to_send).is_err() {
                        ctx.fail(io::Error::other("snapshot receiver dropped"));
                    }
                }

                if pending.fetch_sub(1, Ordering::AcqRel) == 1 {
                    break;
                }
            }
            Err(RecvTimeoutError::Timeout) => {
                if pending.load(Ordering::Acquire) == 0 {
                    break;
                }
            }
            Err(RecvTimeoutError::Disconnected) => {
                break;
            }
        }
    }

    if !batch.is_empty() {
        let _ = file_tx.send(batch);
    }
}

/// Read one directory: subdirectories go to the work queue, files to `batch`.
fn scan_dir(
    dir: &Path,
    work_tx: &channel::Sender<PathBuf>,
    batch: &mut Vec<FileRecord>,
    ctx: &WalkContext,
    pending: &AtomicUsize,
) -> Result<()> {
    for entry_res in read_dir(dir)? {
        let entry = entry_res?;

        match inspect_fs_entry(&entry, &ctx.root)? {
            Entry::Record(record) => batch.push(record),
            Entry::Dir(path) => {
                // Count before sending so the queue never looks drained early
                pending.fetch_add(1, Ordering::AcqRel);
                let _ = work_tx.send(path);
            }
        }
    }

    Ok(())
}

fn inspect_fs_entry(entry: &fs::DirEntry, root: &Path) -> Result<Entry> {
    let file_type = entry.file_type()?;
    let full_path = entry.path();

    if file_type.is_dir() {
        return Ok(Entry::Dir(full_path));
    }

    let (kind, metadata) = if file_type.is_file() {
        (RecordKind::File, entry.metadata()?)
    } else if file_type.is_symlink() {
        // Links to files are synced by content. Links to directories are not
        // followed so a cycle cannot trap the walk; they and dangling links
        // are recorded from the link itself so a stale one can be removed.
        match fs::metadata(&full_path) {
            Ok(meta) if meta.is_file() => (RecordKind::File, meta),
            Ok(_) => {
                warn!("[walk] not following directory symlink {}", full_path.display());
                (RecordKind::Other, fs::symlink_metadata(&full_path)?)
            }
            Err(e) => {
                warn!("[walk] dangling symlink {}: {e}", full_path.display());
                (RecordKind::Other, fs::symlink_metadata(&full_path)?)
            }
        }
    } else {
        warn!("[walk] special file {}", full_path.display());
        (RecordKind::Other, entry.metadata()?)
    };

    let relative = full_path.strip_prefix(root).map_err(|_| {
        io::Error::other(format!(
            "{} is not under {}",
            full_path.display(),
            root.display()
        ))
    })?;

    Ok(Entry::Record(FileRecord {
        relative_path: normalize_key(relative)?,
        kind,
        size: metadata.len(),
        modified: metadata.modified()?,
        full_path,
    }))
}

#[cfg(test)]
#[path = "walker_tests.rs"]
mod tests;
