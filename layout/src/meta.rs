//! The persisted layout metadata document.

use blobstate_store::BlobContainer;
use serde::{Deserialize, Serialize};

use crate::LayoutError;

/// Directory reserved for blobstate's own bookkeeping inside a container.
pub const BOOKKEEPING_DIR: &str = ".blobstate";

/// Reserved key of the metadata document.
pub const META_KEY: &str = ".blobstate/meta.yaml";

/// The layout version that brand-new stores are created with.
pub const CURRENT_LAYOUT_VERSION: u64 = 1;

/// Which key layout a store uses.
///
/// Version 0 is the legacy layout and is never written to disk: a legacy
/// store is recognised by the absence of this document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct LayoutMeta {
    pub version: u64,
}

// `version` is optional here so that a missing field can be told apart from
// a malformed one. Unknown fields are ignored.
#[derive(Deserialize)]
struct RawMeta {
    version: Option<u64>,
}

impl LayoutMeta {
    pub const fn new(version: u64) -> Self {
        Self { version }
    }

    /// The implicit legacy layout.
    pub const fn legacy() -> Self {
        Self::new(0)
    }

    /// The layout new stores start with.
    pub const fn current() -> Self {
        Self::new(CURRENT_LAYOUT_VERSION)
    }

    pub fn is_legacy(&self) -> bool {
        self.version == 0
    }

    /// Decode a metadata document read from [`META_KEY`].
    ///
    /// Any non-negative version is accepted verbatim, including 0 and versions
    /// newer than this build knows about.
    pub fn parse(bytes: &[u8]) -> Result<Self, LayoutError> {
        let missing = || LayoutError::MissingVersion {
            key: META_KEY.to_string(),
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Err(missing());
        }
        let raw: Option<RawMeta> =
            serde_yaml::from_slice(bytes).map_err(|source| LayoutError::Unmarshal {
                key: META_KEY.to_string(),
                source,
            })?;
        raw.and_then(|r| r.version).map(Self::new).ok_or_else(missing)
    }

    /// Encode as YAML, e.g. `version: 1`.
    pub fn to_yaml(&self) -> Result<String, LayoutError> {
        serde_yaml::to_string(self).map_err(LayoutError::Serialize)
    }

    /// Read the document from `container`. `Ok(None)` if there is none.
    pub fn read_from<C: BlobContainer + ?Sized>(
        container: &C,
    ) -> Result<Option<Self>, LayoutError> {
        match container.read_all(META_KEY) {
            Ok(bytes) => Self::parse(&bytes).map(Some),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Persist the document, overwriting any existing one.
    ///
    /// Version 0 is a no-op: nothing is written, so a legacy container is
    /// never tagged as managed just by touching it.
    pub fn write_to<C: BlobContainer + ?Sized>(&self, container: &C) -> Result<(), LayoutError> {
        if self.is_legacy() {
            tracing::debug!("legacy layout, not writing {META_KEY}");
            return Ok(());
        }
        let yaml = self.to_yaml()?;
        container.write_all(META_KEY, yaml.as_bytes())?;
        tracing::info!(version = self.version, key = META_KEY, "wrote layout metadata");
        Ok(())
    }
}

impl Default for LayoutMeta {
    fn default() -> Self {
        Self::current()
    }
}
