mod config;
pub mod journal;
pub mod logging;

pub use config::{
    DEFAULT_WORKERS, PASS_BANNER_RULE, PASS_TIMESTAMP_FORMAT, PROGRAM_LOG_LEVEL, PROGRAM_NAME,
    SYNC_LOG_DATE_FORMAT, SYNC_LOG_EXT, SYNC_LOG_PREFIX, default_workers,
};

pub use journal::{DailyJournal, Journal, MemoryJournal, sync_log_path};
pub use logging::init;
