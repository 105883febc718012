pub use crate::builder::{Capacity, LruOptions};
pub use crate::error::LruError;
#[cfg(feature = "concurrency")]
pub use crate::policy::lru::ConcurrentLruCache;
pub use crate::policy::lru::LruCache;
pub use crate::snapshot::DumpEntry;
