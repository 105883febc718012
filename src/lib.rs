//! lrukit: a fixed-capacity, string-keyed LRU cache with ordered
//! snapshot/restore.
//!
//! See `DESIGN.md` for internal architecture and invariants.

pub mod builder;
pub mod ds;
pub mod error;
pub mod policy;
pub mod prelude;
pub mod snapshot;

pub use crate::builder::{Capacity, LruOptions};
pub use crate::error::{InvariantError, LruError};
#[cfg(feature = "concurrency")]
pub use crate::policy::lru::ConcurrentLruCache;
pub use crate::policy::lru::LruCache;
pub use crate::snapshot::DumpEntry;
