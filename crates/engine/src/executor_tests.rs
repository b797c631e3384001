use super::*;
use dirsync_fs::LocalFs;
use dirsync_runtime::MemoryJournal;
use std::{
    fs::{self, create_dir_all, read, write},
    path::PathBuf,
    sync::Mutex,
};

/// Wraps the real disk, records every mutating call and fails on request.
struct RecordingFs {
    ops: Mutex<Vec<String>>,
    fail_on: Vec<&'static str>,
}

impl RecordingFs {
    fn new(fail_on: Vec<&'static str>) -> Self {
        Self {
            ops: Mutex::new(Vec::new()),
            fail_on,
        }
    }

    fn ops(&self) -> Vec<String> {
        self.ops.lock().unwrap().clone()
    }

    fn check(&self, op: &str, path: &Path) -> io::Result<()> {
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        self.ops.lock().unwrap().push(format!("{op} {name}"));
        if self.fail_on.contains(&name.as_str()) {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "injected"));
        }
        Ok(())
    }
}

impl FileSystem for RecordingFs {
    fn is_dir(&self, path: &Path) -> bool {
        LocalFs.is_dir(path)
    }

    fn copy(&self, src: &Path, dst: &Path, overwrite: bool) -> io::Result<u64> {
        self.check(if overwrite { "update" } else { "create" }, dst)?;
        LocalFs.copy(src, dst, overwrite)
    }

    fn delete(&self, path: &Path) -> io::Result<()> {
        self.check("delete", path)?;
        LocalFs.delete(path)
    }

    fn create_dir_chain(&self, path: &Path) -> io::Result<()> {
        LocalFs.create_dir_chain(path)
    }
}

struct Trees {
    _tmp: tempfile::TempDir,
    source: PathBuf,
    target: PathBuf,
}

fn trees() -> Trees {
    let tmp = tempfile::tempdir().expect("create temp dir");
    let source = tmp.path().join("src");
    let target = tmp.path().join("dst");
    create_dir_all(&source).expect("create src");
    create_dir_all(&target).expect("create dst");
    Trees {
        _tmp: tmp,
        source,
        target,
    }
}

fn plan(deletes: &[&str], creates: &[&str], updates: &[&str]) -> SyncPlan {
    SyncPlan {
        deletes: deletes.iter().map(|k| Action::Delete(k.to_string())).collect(),
        creates: creates.iter().map(|k| Action::Create(k.to_string())).collect(),
        updates: updates.iter().map(|k| Action::Update(k.to_string())).collect(),
    }
}

#[test]
fn create_builds_missing_parent_dirs() {
    let t = trees();
    create_dir_all(t.source.join("a").join("b")).unwrap();
    write(t.source.join("a").join("b").join("c.txt"), b"nested").unwrap();

    let journal = MemoryJournal::new();
    let report = Executor::new(&LocalFs, &journal, &t.source, &t.target, 2)
        .apply(&plan(&[], &["a/b/c.txt"], &[]));

    assert!(report.is_clean());
    assert_eq!(report.created, 1);
    assert_eq!(read(t.target.join("a").join("b").join("c.txt")).unwrap(), b"nested");
    assert_eq!(journal.lines(), vec!["Copying new file: a/b/c.txt"]);
}

#[test]
fn update_overwrites_existing_target() {
    let t = trees();
    write(t.source.join("d.txt"), b"new contents").unwrap();
    write(t.target.join("d.txt"), b"old").unwrap();

    let journal = MemoryJournal::new();
    let report = Executor::new(&LocalFs, &journal, &t.source, &t.target, 1)
        .apply(&plan(&[], &[], &["d.txt"]));

    assert_eq!(report.updated, 1);
    assert_eq!(read(t.target.join("d.txt")).unwrap(), b"new contents");
}

#[test]
fn delete_of_vanished_file_is_not_a_failure() {
    let t = trees();
    write(t.target.join("here.txt"), b"x").unwrap();

    let journal = MemoryJournal::new();
    let report = Executor::new(&LocalFs, &journal, &t.source, &t.target, 2)
        .apply(&plan(&["here.txt", "gone.txt"], &[], &[]));

    assert!(report.is_clean());
    assert_eq!(report.deleted, 1);
    assert_eq!(report.already_absent, 1);
    assert!(!t.target.join("here.txt").exists());
    assert_eq!(
        report.summary(),
        "Sync finished: 2 deleted, 0 created, 0 updated, 0 failed"
    );
}

#[test]
fn deletes_finish_before_creates_and_creates_before_updates() {
    let t = trees();
    for i in 0..8 {
        write(t.target.join(format!("old{i}")), b"o").unwrap();
        write(t.source.join(format!("new{i}")), b"n").unwrap();
        write(t.source.join(format!("chg{i}")), b"changed").unwrap();
        write(t.target.join(format!("chg{i}")), b"c").unwrap();
    }

    let deletes: Vec<String> = (0..8).map(|i| format!("old{i}")).collect();
    let creates: Vec<String> = (0..8).map(|i| format!("new{i}")).collect();
    let updates: Vec<String> = (0..8).map(|i| format!("chg{i}")).collect();
    let plan = SyncPlan {
        deletes: deletes.into_iter().map(Action::Delete).collect(),
        creates: creates.into_iter().map(Action::Create).collect(),
        updates: updates.into_iter().map(Action::Update).collect(),
    };

    let fs = RecordingFs::new(Vec::new());
    let journal = MemoryJournal::new();
    let report = Executor::new(&fs, &journal, &t.source, &t.target, 4).apply(&plan);

    assert!(report.is_clean());
    let kinds: Vec<String> = fs
        .ops()
        .iter()
        .map(|op| op.split(' ').next().unwrap().to_string())
        .collect();
    assert_eq!(kinds.len(), 24);
    assert!(kinds[..8].iter().all(|k| k == "delete"), "{kinds:?}");
    assert!(kinds[8..16].iter().all(|k| k == "create"), "{kinds:?}");
    assert!(kinds[16..].iter().all(|k| k == "update"), "{kinds:?}");
}

#[test]
fn a_failed_action_does_not_stop_the_pass() {
    let t = trees();
    write(t.target.join("stale.txt"), b"s").unwrap();
    write(t.source.join("bad.txt"), b"b").unwrap();
    write(t.source.join("good.txt"), b"g").unwrap();

    let fs = RecordingFs::new(vec!["bad.txt"]);
    let journal = MemoryJournal::new();
    let report = Executor::new(&fs, &journal, &t.source, &t.target, 2)
        .apply(&plan(&["stale.txt"], &["bad.txt", "good.txt"], &[]));

    assert_eq!(report.deleted, 1);
    assert_eq!(report.created, 1);
    assert_eq!(report.failed(), 1);
    assert_eq!(report.failures[0].action, Action::Create("bad.txt".into()));
    assert_eq!(report.failures[0].error.kind(), io::ErrorKind::PermissionDenied);

    assert!(t.target.join("good.txt").exists());
    assert!(!t.target.join("bad.txt").exists());
    assert!(
        journal
            .lines()
            .contains(&"Failed to copy bad.txt: injected".to_string())
    );
}

#[test]
fn create_refuses_to_clobber_an_unexpected_file() {
    let t = trees();
    write(t.source.join("race.txt"), b"ours").unwrap();
    write(t.target.join("race.txt"), b"theirs").unwrap();

    let journal = MemoryJournal::new();
    let report = Executor::new(&LocalFs, &journal, &t.source, &t.target, 1)
        .apply(&plan(&[], &["race.txt"], &[]));

    assert_eq!(report.failed(), 1);
    assert_eq!(report.failures[0].error.kind(), io::ErrorKind::AlreadyExists);
    assert_eq!(fs::read(t.target.join("race.txt")).unwrap(), b"theirs");
}

#[test]
fn empty_plan_touches_nothing() {
    let t = trees();
    let fs = RecordingFs::new(Vec::new());
    let journal = MemoryJournal::new();

    let report = Executor::new(&fs, &journal, &t.source, &t.target, 4).apply(&SyncPlan::default());

    assert!(report.is_clean());
    assert!(fs.ops().is_empty());
    assert!(journal.lines().is_empty());
}
