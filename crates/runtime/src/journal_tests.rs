use super::*;
use chrono::TimeZone;
use tempfile::tempdir;

fn fixed_time() -> DateTime<Local> {
    Local
        .with_ymd_and_hms(2024, 3, 9, 14, 5, 7)
        .single()
        .expect("unambiguous local time")
}

#[test]
fn sync_log_path_uses_compact_date() {
    let date = NaiveDate::from_ymd_opt(2024, 3, 9).expect("valid date");
    let path = sync_log_path(Path::new("/var/log/dirsync"), date);
    assert_eq!(path, PathBuf::from("/var/log/dirsync/sync_20240309.log"));
}

#[test]
fn open_creates_missing_log_dir() {
    let tmp = tempdir().expect("create temp dir");
    let log_dir = tmp.path().join("nested").join("logs");

    let journal = DailyJournal::open(&log_dir, fixed_time())
        .expect("open journal")
        .without_echo();

    assert!(log_dir.is_dir());
    assert_eq!(journal.path(), log_dir.join("sync_20240309.log"));
}

#[test]
fn record_appends_and_never_truncates() {
    let tmp = tempdir().expect("create temp dir");

    let first = DailyJournal::open(tmp.path(), fixed_time())
        .expect("open journal")
        .without_echo();
    first.record("Deleting file: a.txt");

    // A second pass on the same day appends to the same file.
    let second = DailyJournal::open(tmp.path(), fixed_time())
        .expect("open journal")
        .without_echo();
    second.record("Copying new file: b.txt");

    let contents = fs::read_to_string(second.path()).expect("read log");
    assert_eq!(contents, "Deleting file: a.txt\nCopying new file: b.txt\n");
}

#[test]
fn banner_writes_rule_and_timestamp() {
    let journal = MemoryJournal::new();
    journal.banner(fixed_time());

    assert_eq!(
        journal.lines(),
        vec![
            PASS_BANNER_RULE.to_string(),
            "Sync started at 2024-03-09 14:05:07".to_string(),
        ]
    );
}

#[test]
fn record_survives_unwritable_log_file() {
    let tmp = tempdir().expect("create temp dir");
    let journal = DailyJournal::open(tmp.path(), fixed_time())
        .expect("open journal")
        .without_echo();

    // Occupy the log file name with a directory so appends fail.
    fs::create_dir(journal.path()).expect("create blocking dir");

    journal.record("Updating file: c.txt");
    assert!(journal.path().is_dir());
}

#[test]
fn concurrent_records_produce_whole_lines() {
    let tmp = tempdir().expect("create temp dir");
    let journal = DailyJournal::open(tmp.path(), fixed_time())
        .expect("open journal")
        .without_echo();

    std::thread::scope(|s| {
        for worker in 0..4 {
            let journal = &journal;
            s.spawn(move || {
                for i in 0..25 {
                    journal.record(&format!("worker {worker} line {i}"));
                }
            });
        }
    });

    let contents = fs::read_to_string(journal.path()).expect("read log");
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 100);
    assert!(lines.iter().all(|l| l.starts_with("worker ")));
}
