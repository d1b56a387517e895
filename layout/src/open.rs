//! Store handles with a resolved layout.

use blobstate_store::{BlobContainer, Bounded, Deadline, EnvLookup};

use crate::signal::legacy_warning_suppressed;
use crate::{
    KeyLayout, LayoutError, LayoutMeta, Resolution, ResolutionSource, Resolver, StoreConfig,
    NO_LEGACY_WARNING_ENV_VAR,
};

/// A container whose layout has been resolved.
///
/// Resolution happens exactly once, in [`open`](ResolvedStore::open) or
/// [`open_with`](ResolvedStore::open_with), and the result is fixed for the
/// lifetime of the handle. Opening never writes to the container; use
/// [`persist_meta`](ResolvedStore::persist_meta) to record the layout.
pub struct ResolvedStore<C> {
    container: C,
    resolution: Resolution,
}

impl<C: BlobContainer> ResolvedStore<C> {
    /// Open with default configuration.
    pub fn open<E: EnvLookup + ?Sized>(container: C, env: &E) -> Result<Self, LayoutError> {
        Self::open_with(container, env, &StoreConfig::default())
    }

    /// Open under `config`'s layout preference, timeout and cancel flag.
    ///
    /// A timeout or cancellation while resolving fails the open; there is no
    /// fallback to a default layout.
    pub fn open_with<E: EnvLookup + ?Sized>(
        container: C,
        env: &E,
        config: &StoreConfig,
    ) -> Result<Self, LayoutError> {
        let deadline = config.deadline();
        let resolution = {
            let bounded = Bounded::new(&container, deadline.clone());
            Resolver::new(&bounded, env)
                .with_configured(config.layout)
                .resolve()?
        };
        deadline.check()?;

        if resolution.source == ResolutionSource::ExistingContents
            && !legacy_warning_suppressed(env)
        {
            tracing::warn!(
                "container has no layout metadata but is not empty; using the legacy layout. \
                 Set {NO_LEGACY_WARNING_ENV_VAR}=true to silence this warning"
            );
        }
        tracing::info!(
            version = resolution.meta.version,
            source = %resolution.source,
            "opened store"
        );

        Ok(Self {
            container,
            resolution,
        })
    }

    /// Explicitly record the resolved layout in the container.
    /// Does nothing for the legacy layout.
    ///
    /// The resolve timeout from [`StoreConfig`] does not apply here; use
    /// [`persist_meta_within`](ResolvedStore::persist_meta_within) to bound
    /// the write.
    pub fn persist_meta(&self) -> Result<(), LayoutError> {
        self.resolution.meta.write_to(&self.container)
    }

    /// [`persist_meta`](ResolvedStore::persist_meta), failing instead of
    /// writing once `deadline` has passed or been cancelled.
    pub fn persist_meta_within(&self, deadline: &Deadline) -> Result<(), LayoutError> {
        let bounded = Bounded::new(&self.container, deadline.clone());
        self.resolution.meta.write_to(&bounded)
    }
}

impl<C> ResolvedStore<C> {
    pub fn meta(&self) -> LayoutMeta {
        self.resolution.meta
    }

    pub fn version(&self) -> u64 {
        self.resolution.meta.version
    }

    pub fn source(&self) -> ResolutionSource {
        self.resolution.source
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    pub fn is_legacy(&self) -> bool {
        self.resolution.meta.is_legacy()
    }

    /// Key scheme for checkpoint objects. Fails for layout versions this
    /// build does not know.
    pub fn layout(&self) -> Result<KeyLayout, LayoutError> {
        KeyLayout::for_version(self.version())
    }

    pub fn container(&self) -> &C {
        &self.container
    }

    pub fn into_inner(self) -> C {
        self.container
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blobstate_nullables::{NullContainer, NullEnv};

    #[test]
    fn open_caches_resolution() {
        let store = ResolvedStore::open(NullContainer::new(), &NullEnv::new()).unwrap();
        assert_eq!(store.version(), 1);
        assert_eq!(store.source(), ResolutionSource::EmptyContainer);
        assert_eq!(store.layout().unwrap(), KeyLayout::Project);
        assert!(store.container().writes().is_empty());
    }

    #[test]
    fn persist_writes_only_when_asked() {
        let store = ResolvedStore::open(NullContainer::new(), &NullEnv::new()).unwrap();
        assert!(store.container().keys().is_empty());
        store.persist_meta().unwrap();
        assert_eq!(store.container().writes(), vec![crate::META_KEY]);
    }

    #[test]
    fn bounded_persist_refuses_expired_deadline() {
        let store = ResolvedStore::open(NullContainer::new(), &NullEnv::new()).unwrap();
        let flag = blobstate_store::CancelFlag::new();
        flag.cancel();

        let err = store
            .persist_meta_within(&Deadline::none().with_cancel(flag))
            .unwrap_err();
        assert!(matches!(
            err,
            LayoutError::Store(blobstate_store::StoreError::Cancelled)
        ));
        assert!(store.container().writes().is_empty());

        store.persist_meta_within(&Deadline::none()).unwrap();
        assert_eq!(store.container().writes(), vec![crate::META_KEY]);
    }

    #[test]
    fn future_version_opens_but_has_no_key_layout() {
        let container = NullContainer::new().with_blob(crate::META_KEY, "version: 42");
        let store = ResolvedStore::open(container, &NullEnv::new()).unwrap();
        assert_eq!(store.version(), 42);
        assert!(matches!(
            store.layout(),
            Err(LayoutError::UnsupportedVersion(42))
        ));
    }
}
