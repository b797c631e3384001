use std::{path::PathBuf, time::SystemTime};

/// What a walk found at a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    /// A regular file, or a symlink resolving to one; copied by content.
    File,
    /// A directory symlink, dangling symlink or special file. Never copied,
    /// but a target entry of this kind is still removable.
    Other,
}

/// One non-directory entry seen during a walk. Immutable once built and
/// owned by the [`Snapshot`](crate::Snapshot) that collected it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Normalized key, `/`-separated and relative to the walked root
    pub relative_path: String,
    pub full_path: PathBuf,
    pub kind: RecordKind,
    /// File size in bytes
    pub size: u64,
    /// Last modification time at full platform precision
    pub modified: SystemTime,
}

impl FileRecord {
    pub fn new(
        relative_path: impl Into<String>,
        full_path: impl Into<PathBuf>,
        size: u64,
        modified: SystemTime,
    ) -> Self {
        Self {
            relative_path: relative_path.into(),
            full_path: full_path.into(),
            kind: RecordKind::File,
            size,
            modified,
        }
    }

    pub fn with_kind(mut self, kind: RecordKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn is_file(&self) -> bool {
        self.kind == RecordKind::File
    }

    /// True when kind, size or mtime disagree. Content is never inspected
    /// and mtimes must match exactly.
    pub fn differs_from(&self, other: &FileRecord) -> bool {
        self.kind != other.kind || self.size != other.size || self.modified != other.modified
    }
}
