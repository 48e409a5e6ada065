#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Copy-on-write snapshot cell for read-mostly caches.
//!
//! The location index and the design rule table are both loaded once,
//! read by every request, and only ever replaced as a whole when the
//! backing file is reloaded. [`Snapshot`] holds the current value behind
//! an [`Arc`] so readers clone the pointer and then work on an immutable
//! value with no lock held. A reload builds the replacement outside the
//! lock and swaps the pointer, so a reader sees either the old value or
//! the new one, never a mix.

use std::sync::{Arc, PoisonError, RwLock};

/// A shared, atomically replaceable `Arc<T>`.
#[derive(Debug)]
pub struct Snapshot<T> {
    current: RwLock<Arc<T>>,
}

impl<T> Snapshot<T> {
    /// Creates a cell holding `value` as its first snapshot.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            current: RwLock::new(Arc::new(value)),
        }
    }

    /// Returns the current snapshot.
    ///
    /// The read lock is held only while the `Arc` is cloned.
    #[must_use]
    pub fn load(&self) -> Arc<T> {
        // The guarded value is a whole `Arc`, so a panic while the lock was
        // held cannot have left it half-written.
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Publishes `value` as the new snapshot and returns the previous one.
    pub fn store(&self, value: T) -> Arc<T> {
        self.swap(Arc::new(value))
    }

    /// Builds a replacement with `build` and publishes it only if it
    /// succeeds.
    ///
    /// `build` runs without holding any lock. On error the current snapshot
    /// is left untouched and keeps serving readers.
    ///
    /// # Errors
    ///
    /// Returns whatever error `build` returns.
    pub fn try_refresh<E, F>(&self, build: F) -> Result<Arc<T>, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        let next = Arc::new(build()?);
        self.swap(Arc::clone(&next));
        Ok(next)
    }

    fn swap(&self, next: Arc<T>) -> Arc<T> {
        let mut guard = self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, next)
    }
}

impl<T: Default> Default for Snapshot<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
