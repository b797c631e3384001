use std::{
    io,
    path::{Component, Path, PathBuf},
};

pub const KEY_SEPARATOR: char = '/';

/// Canonical snapshot key for a path relative to a walk root.
///
/// Components are joined with `/` whatever separator the platform produced,
/// and `.` components are dropped. Comparison of the resulting keys is
/// case-sensitive. Paths that escape the root, are absolute, or are not valid
/// UTF-8 are rejected.
pub fn normalize_key(relative: &Path) -> io::Result<String> {
    let mut key = String::new();

    for component in relative.components() {
        match component {
            Component::Normal(part) => {
                let part = part.to_str().ok_or_else(|| {
                    io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!("path is not valid UTF-8: {}", relative.display()),
                    )
                })?;
                if !key.is_empty() {
                    key.push(KEY_SEPARATOR);
                }
                key.push_str(part);
            }
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("not a path below the root: {}", relative.display()),
                ));
            }
        }
    }

    if key.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "empty relative path",
        ));
    }

    Ok(key)
}

/// Inverse of [`normalize_key`]: the native path of `key` under `root`.
pub fn key_to_path(root: &Path, key: &str) -> PathBuf {
    key.split(KEY_SEPARATOR)
        .filter(|part| !part.is_empty())
        .fold(root.to_path_buf(), |path, part| path.join(part))
}

#[cfg(test)]
#[path = "normalize_tests.rs"]
mod tests;
