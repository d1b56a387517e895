use blobstate_store::StoreError;
use thiserror::Error;

use crate::CURRENT_LAYOUT_VERSION;

/// What is wrong with a metadata record that was found but cannot be trusted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Corruption {
    /// The record is empty or has no `version` field.
    MissingVersion,
    /// The record could not be decoded, e.g. `version` is not an integer.
    UnmarshalFailure,
}

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("corrupt store: missing version in {key:?}")]
    MissingVersion { key: String },

    #[error("corrupt store: unmarshal {key:?}: {source}")]
    Unmarshal {
        key: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("serialize layout metadata: {0}")]
    Serialize(#[source] serde_yaml::Error),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("unsupported layout version {0} (latest known is {latest})", latest = CURRENT_LAYOUT_VERSION)]
    UnsupportedVersion(u64),

    #[error("invalid {kind} name {name:?}: {reason}")]
    InvalidName {
        kind: &'static str,
        name: String,
        reason: &'static str,
    },

    #[error("config error: {0}")]
    Config(String),
}

impl LayoutError {
    /// The corruption kind, if this error reports a corrupt metadata record.
    pub fn corruption(&self) -> Option<Corruption> {
        match self {
            LayoutError::MissingVersion { .. } => Some(Corruption::MissingVersion),
            LayoutError::Unmarshal { .. } => Some(Corruption::UnmarshalFailure),
            _ => None,
        }
    }

    /// The offending container key, for corruption errors.
    pub fn key(&self) -> Option<&str> {
        match self {
            LayoutError::MissingVersion { key } | LayoutError::Unmarshal { key, .. } => {
                Some(key.as_str())
            }
            _ => None,
        }
    }
}
