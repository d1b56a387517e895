//! Abstract storage capabilities for blobstate.
//!
//! Every container backend (local filesystem, in-memory for testing, object
//! stores) implements [`BlobContainer`]. Layout bootstrap depends only on these
//! traits, plus an injected [`EnvLookup`] so that nothing reads process-global
//! state directly.

pub mod container;
pub mod deadline;
pub mod env;
pub mod error;

pub use container::BlobContainer;
pub use deadline::{Bounded, CancelFlag, Deadline};
pub use env::{EnvLookup, ProcessEnv};
pub use error::StoreError;
