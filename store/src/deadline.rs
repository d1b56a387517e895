//! Deadline and cancellation propagation for container calls.
//!
//! Container operations may block on disk or network. Callers bound them with
//! a [`Deadline`]; wrapping a container in [`Bounded`] makes every operation
//! fail fast once the deadline has passed or the cancel flag is raised.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::{BlobContainer, StoreError};

/// A shareable cancellation flag.
///
/// Clones observe the same flag, so one clone can be handed to the operation
/// and another kept by whoever may want to abort it.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Upper bound on how long container operations may keep running.
#[derive(Clone, Debug, Default)]
pub struct Deadline {
    expires_at: Option<Instant>,
    cancel: Option<CancelFlag>,
}

impl Deadline {
    /// No time limit and no cancellation.
    pub fn none() -> Self {
        Self::default()
    }

    /// Expire `timeout` from now.
    pub fn after(timeout: Duration) -> Self {
        Self {
            expires_at: Some(Instant::now() + timeout),
            cancel: None,
        }
    }

    /// Expire at a fixed instant.
    pub fn at(instant: Instant) -> Self {
        Self {
            expires_at: Some(instant),
            cancel: None,
        }
    }

    /// Also fail once `flag` is raised.
    pub fn with_cancel(mut self, flag: CancelFlag) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn expires_at(&self) -> Option<Instant> {
        self.expires_at
    }

    /// Time left before expiry, if a limit is set. Zero once expired.
    pub fn remaining(&self) -> Option<Duration> {
        self.expires_at
            .map(|at| at.saturating_duration_since(Instant::now()))
    }

    /// Fail if cancelled or expired. Cancellation is reported first.
    pub fn check(&self) -> Result<(), StoreError> {
        if self.cancel.as_ref().is_some_and(CancelFlag::is_cancelled) {
            return Err(StoreError::Cancelled);
        }
        match self.expires_at {
            Some(at) if Instant::now() >= at => Err(StoreError::DeadlineExceeded),
            _ => Ok(()),
        }
    }
}

/// A container whose operations are checked against a [`Deadline`].
pub struct Bounded<C> {
    inner: C,
    deadline: Deadline,
}

impl<C: BlobContainer> Bounded<C> {
    pub fn new(inner: C, deadline: Deadline) -> Self {
        Self { inner, deadline }
    }

    pub fn deadline(&self) -> &Deadline {
        &self.deadline
    }

    pub fn into_inner(self) -> C {
        self.inner
    }
}

impl<C: BlobContainer> Bounded<C> {
    /// Run `op` only if the deadline still holds, and discard its result if
    /// the deadline passed while it ran.
    fn guarded<T>(&self, op: impl FnOnce(&C) -> Result<T, StoreError>) -> Result<T, StoreError> {
        self.deadline.check()?;
        let result = op(&self.inner);
        self.deadline.check()?;
        result
    }
}

impl<C: BlobContainer> BlobContainer for Bounded<C> {
    fn exists(&self, key: &str) -> Result<bool, StoreError> {
        self.guarded(|c| c.exists(key))
    }

    fn read_all(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        self.guarded(|c| c.read_all(key))
    }

    fn write_all(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        self.guarded(|c| c.write_all(key, bytes))
    }

    fn list(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        self.guarded(|c| c.list(prefix))
    }

    fn is_empty(&self) -> Result<bool, StoreError> {
        self.guarded(|c| c.is_empty())
    }
}
