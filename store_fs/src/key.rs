//! Mapping between container keys and paths under the root directory.

use std::path::{Path, PathBuf};

use crate::FsError;

/// Name prefix of in-flight writes. Keys may not use it in any segment, so a
/// file carrying it is always ours and never listed.
pub(crate) const TMP_PREFIX: &str = ".~blobstate-tmp.";

/// Resolve `key` to a path under `root`.
///
/// Keys are relative, `/`-separated, and may not step outside the root.
pub(crate) fn key_to_path(root: &Path, key: &str) -> Result<PathBuf, FsError> {
    if key.is_empty() {
        return Err(FsError::InvalidKey(key.to_string(), "empty key"));
    }
    if key.starts_with('/') || key.contains('\\') {
        return Err(FsError::InvalidKey(key.to_string(), "key must be relative"));
    }
    let mut path = root.to_path_buf();
    for segment in key.split('/') {
        match segment {
            "" | "." | ".." => {
                return Err(FsError::InvalidKey(
                    key.to_string(),
                    "empty, '.' or '..' segment",
                ))
            }
            s if s.starts_with(TMP_PREFIX) => {
                return Err(FsError::InvalidKey(
                    key.to_string(),
                    "segment uses the reserved temp-file prefix",
                ))
            }
            s => path.push(s),
        }
    }
    Ok(path)
}

/// Inverse of [`key_to_path`]: the `/`-separated key of a file under `root`.
///
/// Names that are not UTF-8 have no key and are reported, not skipped.
pub(crate) fn path_to_key(root: &Path, path: &Path) -> Result<String, FsError> {
    let rel = path
        .strip_prefix(root)
        .map_err(|_| FsError::OutsideRoot(path.display().to_string()))?;
    let segments: Option<Vec<&str>> = rel.components().map(|c| c.as_os_str().to_str()).collect();
    match segments {
        Some(segments) if !segments.is_empty() => Ok(segments.join("/")),
        Some(_) => Err(FsError::OutsideRoot(path.display().to_string())),
        None => Err(FsError::NonUtf8Name(path.display().to_string())),
    }
}
