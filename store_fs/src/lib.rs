//! Local filesystem backend for blobstate containers.

pub mod container;
pub mod error;
pub mod key;

pub use container::FsContainer;
pub use error::FsError;
