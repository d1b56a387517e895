//! Layout-version bootstrap for blobstate containers.
//!
//! Before any checkpoint data is read or written, a store decides which key
//! layout it uses: the legacy flat layout (implicit version 0) or the
//! explicitly versioned layout (version 1 and up). The decision is recorded in
//! a small YAML document at [`META_KEY`] and is resolved once per store handle:
//!
//! 1. An existing metadata record always wins, even a corrupt one.
//! 2. Otherwise `BLOBSTATE_LEGACY_LAYOUT` (or explicit configuration) may force
//!    a layout.
//! 3. Otherwise an empty container gets [`CURRENT_LAYOUT_VERSION`] and a
//!    non-empty one stays on the legacy layout.
//!
//! Opening a store never writes. Persisting the record is a separate call.

pub mod config;
pub mod error;
pub mod key_layout;
pub mod meta;
pub mod open;
pub mod resolver;
pub mod signal;

pub use config::StoreConfig;
pub use error::{Corruption, LayoutError};
pub use key_layout::KeyLayout;
pub use meta::{LayoutMeta, BOOKKEEPING_DIR, CURRENT_LAYOUT_VERSION, META_KEY};
pub use open::ResolvedStore;
pub use resolver::{ensure_meta, Resolution, ResolutionSource, Resolver};
pub use signal::{LayoutSignal, LEGACY_LAYOUT_ENV_VAR, NO_LEGACY_WARNING_ENV_VAR};
