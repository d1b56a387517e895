use thiserror::Error;

#[derive(Debug, Error)]
pub enum FsError {
    #[error("invalid key {0:?}: {1}")]
    InvalidKey(String, &'static str),

    #[error("file name is not valid UTF-8: {0}")]
    NonUtf8Name(String),

    #[error("path {0:?} is not a file below the container root")]
    OutsideRoot(String),

    #[error("directory walk failed under {0:?}: {1}")]
    Walk(String, String),
}

impl From<FsError> for blobstate_store::StoreError {
    fn from(e: FsError) -> Self {
        blobstate_store::StoreError::Backend(e.to_string())
    }
}
