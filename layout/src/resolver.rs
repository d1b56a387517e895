//! Bootstrap resolution of a container's layout version.

use std::fmt;

use blobstate_store::{BlobContainer, EnvLookup};

use crate::{LayoutError, LayoutMeta, LayoutSignal};

/// Which rule decided the layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResolutionSource {
    /// The container holds a metadata record.
    Record,
    /// `BLOBSTATE_LEGACY_LAYOUT` forced the layout.
    Environment,
    /// The store configuration forced the layout.
    Configuration,
    /// No record, no override, and the container is empty.
    EmptyContainer,
    /// No record, no override, and the container already holds keys.
    ExistingContents,
}

impl ResolutionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionSource::Record => "record",
            ResolutionSource::Environment => "environment",
            ResolutionSource::Configuration => "configuration",
            ResolutionSource::EmptyContainer => "empty-container",
            ResolutionSource::ExistingContents => "existing-contents",
        }
    }
}

impl fmt::Display for ResolutionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved layout together with the rule that produced it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Resolution {
    pub meta: LayoutMeta,
    pub source: ResolutionSource,
}

/// Decides the layout of a container.
///
/// Rules are tried in a fixed order and the first one that applies wins:
/// an existing record, then an override (environment before configuration),
/// then the emptiness heuristic. Resolution only reads from the container.
pub struct Resolver<'a, C: ?Sized, E: ?Sized> {
    container: &'a C,
    env: &'a E,
    configured: LayoutSignal,
}

impl<'a, C, E> Resolver<'a, C, E>
where
    C: BlobContainer + ?Sized,
    E: EnvLookup + ?Sized,
{
    pub fn new(container: &'a C, env: &'a E) -> Self {
        Self {
            container,
            env,
            configured: LayoutSignal::Unset,
        }
    }

    /// Layout requested by configuration. Consulted only when the
    /// environment does not force one.
    pub fn with_configured(mut self, signal: LayoutSignal) -> Self {
        self.configured = signal;
        self
    }

    pub fn resolve(&self) -> Result<Resolution, LayoutError> {
        // A record, even a corrupt one, ends resolution.
        if let Some(meta) = LayoutMeta::read_from(self.container)? {
            return Ok(self.decided(meta, ResolutionSource::Record));
        }
        if let Some(resolution) = self.overridden() {
            return Ok(resolution);
        }
        self.by_contents()
    }

    fn overridden(&self) -> Option<Resolution> {
        let from_env = LayoutSignal::from_env(self.env);
        let (signal, source) = if from_env.is_set() {
            (from_env, ResolutionSource::Environment)
        } else {
            (self.configured, ResolutionSource::Configuration)
        };
        match signal {
            LayoutSignal::Unset => None,
            LayoutSignal::ForceLegacy => Some(self.decided(LayoutMeta::legacy(), source)),
            LayoutSignal::ForceVersioned => Some(self.decided(LayoutMeta::current(), source)),
        }
    }

    fn by_contents(&self) -> Result<Resolution, LayoutError> {
        if self.container.is_empty()? {
            Ok(self.decided(LayoutMeta::current(), ResolutionSource::EmptyContainer))
        } else {
            Ok(self.decided(LayoutMeta::legacy(), ResolutionSource::ExistingContents))
        }
    }

    fn decided(&self, meta: LayoutMeta, source: ResolutionSource) -> Resolution {
        tracing::debug!(version = meta.version, %source, "layout decided");
        Resolution { meta, source }
    }
}

/// Resolve the layout of `container` with no configured preference.
pub fn ensure_meta<C, E>(container: &C, env: &E) -> Result<LayoutMeta, LayoutError>
where
    C: BlobContainer + ?Sized,
    E: EnvLookup + ?Sized,
{
    Resolver::new(container, env).resolve().map(|r| r.meta)
}
