//! Snapshot records produced by [`LruCache::dump`](crate::LruCache::dump) and
//! consumed by [`LruCache::load`](crate::LruCache::load).
//!
//! A dump is an ordered `Vec<DumpEntry<V>>`: index 0 is the most recently
//! used entry, the last index the least recently used. The order is the
//! recency state itself, so anything that stores a dump must keep it.
//!
//! With the `serde` feature a dump serializes as a JSON array of
//! `{ "key": ..., "value": ... }` objects.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One `(key, value)` record of a cache dump.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DumpEntry<V> {
    pub key: String,
    pub value: V,
}

impl<V> DumpEntry<V> {
    pub fn new(key: impl Into<String>, value: V) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }

    pub fn into_pair(self) -> (String, V) {
        (self.key, self.value)
    }
}

impl<V> From<(String, V)> for DumpEntry<V> {
    fn from((key, value): (String, V)) -> Self {
        Self { key, value }
    }
}

impl<V> From<(&str, V)> for DumpEntry<V> {
    fn from((key, value): (&str, V)) -> Self {
        Self::new(key, value)
    }
}

impl<V> From<DumpEntry<V>> for (String, V) {
    fn from(entry: DumpEntry<V>) -> Self {
        entry.into_pair()
    }
}
