//! Key-addressed blob container trait.

use crate::StoreError;

/// A flat, key-addressed blob store.
///
/// Keys are `/`-separated names. Implementations must report a missing key
/// from [`read_all`](BlobContainer::read_all) as [`StoreError::NotFound`];
/// every other failure is backend-specific and is propagated unchanged by
/// callers.
pub trait BlobContainer {
    /// Check whether a key exists.
    fn exists(&self, key: &str) -> Result<bool, StoreError>;

    /// Read the full contents of a key.
    fn read_all(&self, key: &str) -> Result<Vec<u8>, StoreError>;

    /// Write the full contents of a key, replacing any existing value.
    fn write_all(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError>;

    /// List every key starting with `prefix`. No ordering is guaranteed.
    fn list(&self, prefix: &str) -> Result<Vec<String>, StoreError>;

    /// Whether the container holds no keys at all.
    ///
    /// The default lists everything; backends that can stop at the first key
    /// should override it.
    fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.list("")?.is_empty())
    }
}

impl<T: BlobContainer + ?Sized> BlobContainer for &T {
    fn exists(&self, key: &str) -> Result<bool, StoreError> {
        (**self).exists(key)
    }

    fn read_all(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        (**self).read_all(key)
    }

    fn write_all(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        (**self).write_all(key, bytes)
    }

    fn list(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        (**self).list(prefix)
    }

    fn is_empty(&self) -> Result<bool, StoreError> {
        (**self).is_empty()
    }
}

impl<T: BlobContainer + ?Sized> BlobContainer for Box<T> {
    fn exists(&self, key: &str) -> Result<bool, StoreError> {
        (**self).exists(key)
    }

    fn read_all(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        (**self).read_all(key)
    }

    fn write_all(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        (**self).write_all(key, bytes)
    }

    fn list(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        (**self).list(prefix)
    }

    fn is_empty(&self) -> Result<bool, StoreError> {
        (**self).is_empty()
    }
}
