pub const PROGRAM_NAME: &str = "dirsync";
pub const PROGRAM_LOG_LEVEL: &str = "DIRSYNC_LOG_LEVEL";

/// Daily sync logs are named `<prefix><YYYYMMDD><ext>`.
pub const SYNC_LOG_PREFIX: &str = "sync_";
pub const SYNC_LOG_EXT: &str = ".log";
pub const SYNC_LOG_DATE_FORMAT: &str = "%Y%m%d";

/// Separator line written before every pass banner.
pub const PASS_BANNER_RULE: &str = "-----------------";
pub const PASS_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Fallback pool size when the platform cannot report its parallelism.
pub const DEFAULT_WORKERS: usize = 4;

pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(DEFAULT_WORKERS)
}
