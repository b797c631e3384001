use std::{
    fs::{self, File},
    io,
    path::Path,
};

use tempfile::NamedTempFile;

/// Mutating filesystem primitives used to apply a sync plan.
///
/// Kept behind a trait so the executor can be driven against a fake that
/// injects failures.
pub trait FileSystem: Send + Sync {
    fn is_dir(&self, path: &Path) -> bool;

    /// Copy bytes, permissions and modification time from `src` to `dst`.
    /// With `overwrite == false` an existing `dst` is an `AlreadyExists` error.
    fn copy(&self, src: &Path, dst: &Path, overwrite: bool) -> io::Result<u64>;

    /// Remove a file or a symlink (never its target).
    fn delete(&self, path: &Path) -> io::Result<()>;

    fn create_dir_chain(&self, path: &Path) -> io::Result<()>;
}

/// The real local disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFs;

impl FileSystem for LocalFs {
    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn copy(&self, src: &Path, dst: &Path, overwrite: bool) -> io::Result<u64> {
        let mut reader = File::open(src)?;
        let src_meta = reader.metadata()?;

        let parent = dst.parent().unwrap_or_else(|| Path::new("."));
        let mut tmp = NamedTempFile::new_in(parent)?;

        let copied = io::copy(&mut reader, tmp.as_file_mut())?;

        // The next pass compares mtimes exactly, so carry the source's over.
        tmp.as_file().set_modified(src_meta.modified()?)?;
        tmp.as_file().sync_all()?;
        tmp.as_file().set_permissions(src_meta.permissions())?;

        // Rename into place; a half-written destination is never visible.
        if overwrite {
            tmp.persist(dst).map_err(|e| e.error)?;
        } else {
            tmp.persist_noclobber(dst).map_err(|e| e.error)?;
        }

        Ok(copied)
    }

    fn delete(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }

    fn create_dir_chain(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }
}

#[cfg(test)]
#[path = "ops_tests.rs"]
mod tests;
