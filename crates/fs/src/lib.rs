mod config;
mod normalize;
mod ops;
mod record;
mod snapshot;
mod walker;

pub use config::BATCH_SIZE;
pub use normalize::{KEY_SEPARATOR, key_to_path, normalize_key};
pub use ops::{FileSystem, LocalFs};
pub use record::{FileRecord, RecordKind};
pub use snapshot::{Snapshot, build_snapshot};
pub use walker::walk_parallel;
