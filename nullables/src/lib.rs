//! Nullable infrastructure for deterministic testing.
//!
//! External dependencies (blob containers, the process environment) are
//! abstracted behind traits in `blobstate-store`. This crate provides
//! test-friendly implementations that:
//! - Keep all state in memory
//! - Can be controlled programmatically, including injected failures
//! - Never touch the filesystem, network or process environment
//!
//! Usage: swap real implementations for nullables in tests.

pub mod container;
pub mod env;

pub use container::{NullContainer, Op};
pub use env::NullEnv;
