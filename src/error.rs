//! Error types for the lrukit library.
//!
//! ## Key Components
//!
//! - [`LruError`]: Returned by fallible cache operations. Construction fails
//!   with [`LruError::InvalidConfiguration`]; `set` and `load` fail with
//!   [`LruError::InvalidKey`].
//! - [`InvariantError`]: Returned when internal data-structure invariants are
//!   violated (`check_invariants` methods).
//!
//! Lookups never error: a missing key is `None` / `false`.
//!
//! ## Example Usage
//!
//! ```
//! use lrukit::error::LruError;
//! use lrukit::{LruCache, LruOptions};
//!
//! let bad = LruCache::<u32>::new(LruOptions::new().max(-10));
//! assert!(matches!(bad, Err(LruError::InvalidConfiguration(_))));
//!
//! let mut cache = LruCache::<u32>::new(LruOptions::new().max(5)).unwrap();
//! assert_eq!(cache.set("", 1), Err(LruError::InvalidKey));
//! ```

use std::fmt;

use thiserror::Error;

// ---------------------------------------------------------------------------
// LruError
// ---------------------------------------------------------------------------

/// Caller-visible failures of the cache API.
///
/// Neither variant is recovered from internally; the operation that produced
/// it leaves the cache as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LruError {
    /// A finite capacity was supplied that is not a positive whole number.
    /// The payload describes the rejected value.
    #[error("max must be a whole number: {0}")]
    InvalidConfiguration(String),

    /// `set` was called with an empty key.
    #[error("invalid key")]
    InvalidKey,
}

impl LruError {
    pub(crate) fn invalid_config(msg: impl Into<String>) -> Self {
        LruError::InvalidConfiguration(msg.into())
    }
}

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when internal cache invariants are violated.
///
/// Produced by [`LruCache::check_invariants`](crate::policy::lru::LruCache::check_invariants).
/// Carries a human-readable description of which invariant failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantError(String);

impl InvariantError {
    /// Creates a new `InvariantError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for InvariantError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
