//! Filesystem implementation of [`BlobContainer`].
//!
//! Each key is a file below the root directory; `/` in a key maps to a
//! directory separator. Writes go to a temporary sibling first and are renamed
//! into place, so readers never observe a half-written blob.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use blobstate_store::{BlobContainer, StoreError};
use walkdir::WalkDir;

use crate::key::{key_to_path, path_to_key, TMP_PREFIX};
use crate::FsError;

static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// A container rooted at a local directory.
#[derive(Clone, Debug)]
pub struct FsContainer {
    root: PathBuf,
}

impl FsContainer {
    /// Open a container at `root`, creating the directory if needed.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, StoreError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).map_err(|source| StoreError::Io {
            key: root.display().to_string(),
            source,
        })?;
        tracing::debug!(root = %root.display(), "opened filesystem container");
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The file that backs `key`.
    pub fn path_of(&self, key: &str) -> Result<PathBuf, StoreError> {
        Ok(key_to_path(&self.root, key)?)
    }

    /// Every stored blob, in walk order. Anything that is not a directory
    /// counts, symlinks included; only our own in-flight temp files are
    /// skipped.
    fn entries(&self) -> impl Iterator<Item = Result<PathBuf, StoreError>> + '_ {
        WalkDir::new(&self.root)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(move |entry| {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => return Some(Err(self.walk_error(e))),
                };
                if entry.file_type().is_dir() {
                    return None;
                }
                let in_flight = entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| name.starts_with(TMP_PREFIX));
                if in_flight {
                    return None;
                }
                Some(Ok(entry.into_path()))
            })
    }

    /// Every stored key. A name with no key form is an error, never skipped.
    fn keys(&self) -> impl Iterator<Item = Result<String, StoreError>> + '_ {
        self.entries().map(move |entry| {
            let path = entry?;
            Ok(path_to_key(&self.root, &path)?)
        })
    }

    fn walk_error(&self, e: walkdir::Error) -> StoreError {
        let at = e
            .path()
            .unwrap_or(self.root.as_path())
            .display()
            .to_string();
        match e.into_io_error() {
            Some(source) => StoreError::Io { key: at, source },
            None => FsError::Walk(at, "filesystem loop".to_string()).into(),
        }
    }
}

fn io_error(key: &str, source: io::Error) -> StoreError {
    StoreError::Io {
        key: key.to_string(),
        source,
    }
}

impl BlobContainer for FsContainer {
    fn exists(&self, key: &str) -> Result<bool, StoreError> {
        let path = self.path_of(key)?;
        match fs::metadata(&path) {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(io_error(key, e)),
        }
    }

    fn read_all(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        let path = self.path_of(key)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(key.to_string()))
            }
            Err(e) => Err(io_error(key, e)),
        }
    }

    fn write_all(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        let path = self.path_of(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| io_error(key, e))?;
        }
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let tmp = path.with_file_name(format!(
            "{TMP_PREFIX}{file_name}.{}.{}",
            std::process::id(),
            TMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        fs::write(&tmp, bytes).map_err(|e| io_error(key, e))?;
        if let Err(e) = fs::rename(&tmp, &path) {
            let _ = fs::remove_file(&tmp);
            return Err(io_error(key, e));
        }
        tracing::trace!(key, len = bytes.len(), "wrote blob");
        Ok(())
    }

    fn list(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let mut keys = Vec::new();
        for key in self.keys() {
            let key = key?;
            if key.starts_with(prefix) {
                keys.push(key);
            }
        }
        keys.sort();
        Ok(keys)
    }

    fn is_empty(&self) -> Result<bool, StoreError> {
        match self.entries().next() {
            None => Ok(true),
            Some(Ok(_)) => Ok(false),
            Some(Err(e)) => Err(e),
        }
    }
}
