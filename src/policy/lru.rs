//! # Least Recently Used (LRU) Cache
//!
//! A fixed-capacity, string-keyed cache that evicts the least recently used
//! entry when an insertion would exceed capacity, plus an ordered
//! snapshot/restore contract (`dump` / `load`).
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────┐
//!   │                          LruCache<V>                             │
//!   │                                                                  │
//!   │   ┌──────────────────────────────────────────────────────────┐   │
//!   │   │  FxHashMap<String, SlotId>  (index)                      │   │
//!   │   │                                                          │   │
//!   │   │   "A" ──────────────────────────┐                        │   │
//!   │   │   "C" ───────────────────┐      │                        │   │
//!   │   │   "D" ──────────┐        │      │                        │   │
//!   │   └─────────────────┼────────┼──────┼────────────────────────┘   │
//!   │                     ▼        ▼      ▼                            │
//!   │   ┌──────────────────────────────────────────────────────────┐   │
//!   │   │  RecencyList<Entry<V>>  (recency order + values)         │   │
//!   │   │                                                          │   │
//!   │   │  mru ──► [D,4] ◄──► [A,1] ◄──► [C,3] ◄── lru             │   │
//!   │   └──────────────────────────────────────────────────────────┘   │
//!   │                                                                  │
//!   │   capacity: Capacity::Bounded(3) | Capacity::Unbounded           │
//!   └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each list node owns its key and value. The index maps a key to the node's
//! `SlotId`, so every operation is one hash lookup plus O(1) relinking.
//!
//! ## Operations Flow
//!
//! ```text
//!   set(D, 4) on a full cache (capacity = 3)
//!   ═══════════════════════════════════════════════════════════════
//!     Before:  mru ──► [C] ◄──► [A] ◄──► [B] ◄── lru
//!     1. pop_lru takes [B], drop "B" from the index
//!     2. push_mru [D]
//!     After:   mru ──► [D] ◄──► [C] ◄──► [A] ◄── lru
//!
//!   get(A)
//!   ═══════════════════════════════════════════════════════════════
//!     Before:  mru ──► [D] ◄──► [C] ◄──► [A] ◄── lru
//!     1. index lookup "A": O(1)
//!     2. touch: O(1)
//!     After:   mru ──► [A] ◄──► [D] ◄──► [C] ◄── lru
//!
//!   peek(C) / has(C)
//!   ═══════════════════════════════════════════════════════════════
//!     index lookup only, order unchanged
//! ```
//!
//! ## Methods
//!
//! | Method           | Complexity | Description                               |
//! |------------------|------------|-------------------------------------------|
//! | `new(options)`   | O(1)       | Validate options, create empty cache      |
//! | `set(k, v)`      | O(1)*      | Insert or update, may evict LRU           |
//! | `get(k)`         | O(1)       | Get value, moves to MRU position          |
//! | `peek(k)`        | O(1)       | Get value without affecting order         |
//! | `has(k)`         | O(1)       | Check if key exists                       |
//! | `del(k)`         | O(1)       | Remove entry by key                       |
//! | `reset()`        | O(n)       | Remove all entries                        |
//! | `for_each(f)`    | O(n)       | Visit entries MRU first                   |
//! | `rfor_each(f)`   | O(n)       | Visit entries LRU first                   |
//! | `iter_lru()`     | O(n)       | Iterate in eviction order                 |
//! | `dump()`         | O(n)       | Ordered snapshot, MRU first               |
//! | `load(dump)`     | O(n)       | Reset, then replay snapshot LRU first     |
//!
//! ## Thread Safety
//!
//! - `LruCache`: **not internally synchronized**. It is `Send`/`Sync` when `V`
//!   is, so callers may share it behind their own lock.
//! - `ConcurrentLruCache` (feature `concurrency`): one `parking_lot::RwLock`
//!   guards index and order together. `get` takes the write lock because it
//!   reorders.

use std::fmt;
use std::iter::Rev;

use log::{debug, trace};
#[cfg(feature = "concurrency")]
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::builder::{Capacity, LruOptions};
use crate::ds::{RecencyIter, RecencyList, SlotId};
use crate::error::{InvariantError, LruError};
use crate::snapshot::DumpEntry;

/// Upper bound on up-front index allocation, so huge bounded capacities
/// don't reserve memory they may never use.
const MAX_PREALLOC: usize = 4096;

/// A cached value together with its key. Lives in the recency list.
#[derive(Debug)]
struct Entry<V> {
    key: String,
    value: V,
}

/// Fixed-capacity string-keyed LRU cache.
///
/// # Example
///
/// ```
/// use lrukit::{LruCache, LruOptions};
///
/// let mut cache = LruCache::new(LruOptions::new().max(3)).unwrap();
/// cache.set("A", 1).unwrap();
/// cache.set("B", 2).unwrap();
/// cache.set("C", 3).unwrap();
/// cache.get("A");
/// cache.set("D", 4).unwrap();
///
/// assert!(!cache.has("B"));
/// let order: Vec<_> = cache.keys().collect();
/// assert_eq!(order, ["D", "A", "C"]);
/// ```
pub struct LruCache<V> {
    index: FxHashMap<String, SlotId>,
    order: RecencyList<Entry<V>>,
    capacity: Capacity,
}

impl<V> LruCache<V> {
    /// Creates an empty cache from `options`.
    ///
    /// # Errors
    ///
    /// [`LruError::InvalidConfiguration`] if `options` carries a finite
    /// maximum that is not a positive whole number.
    pub fn new(options: LruOptions) -> Result<Self, LruError> {
        let capacity = options.capacity()?;
        Ok(Self::with_capacity(capacity))
    }

    /// Creates an empty cache with an already validated capacity.
    pub fn with_capacity(capacity: Capacity) -> Self {
        let prealloc = capacity.limit().unwrap_or(0).min(MAX_PREALLOC);
        LruCache {
            index: FxHashMap::with_capacity_and_hasher(prealloc, Default::default()),
            order: RecencyList::with_capacity(prealloc),
            capacity,
        }
    }

    /// Creates an empty cache that never evicts.
    pub fn unbounded() -> Self {
        Self::with_capacity(Capacity::Unbounded)
    }

    /// Inserts or updates `key`.
    ///
    /// An existing key has its value replaced and becomes most recently
    /// used; the entry count is unchanged. A new key first evicts from the
    /// least recently used end until there is room, then is inserted as most
    /// recently used.
    ///
    /// # Errors
    ///
    /// [`LruError::InvalidKey`] if `key` is empty. The cache is untouched.
    pub fn set(&mut self, key: impl Into<String>, value: V) -> Result<(), LruError> {
        let key = key.into();
        if key.is_empty() {
            return Err(LruError::InvalidKey);
        }

        if let Some(&id) = self.index.get(key.as_str()) {
            if let Some(entry) = self.order.get_mut(id) {
                entry.value = value;
            }
            self.order.touch(id);
            return Ok(());
        }

        while !self.capacity.has_room(self.order.len()) {
            if self.evict_lru().is_none() {
                break;
            }
        }

        let id = self.order.push_mru(Entry {
            key: key.clone(),
            value,
        });
        self.index.insert(key, id);

        #[cfg(debug_assertions)]
        self.validate_invariants();

        Ok(())
    }

    /// Returns the value for `key` and marks it most recently used.
    pub fn get(&mut self, key: &str) -> Option<&V> {
        let id = *self.index.get(key)?;
        self.order.touch(id);
        self.order.get(id).map(|entry| &entry.value)
    }

    /// Like [`get`](Self::get), but hands out a mutable reference.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        let id = *self.index.get(key)?;
        self.order.touch(id);
        self.order.get_mut(id).map(|entry| &mut entry.value)
    }

    /// Returns the value for `key` without touching recency order.
    pub fn peek(&self, key: &str) -> Option<&V> {
        let id = *self.index.get(key)?;
        self.order.get(id).map(|entry| &entry.value)
    }

    /// Returns `true` if `key` is present. Does not touch recency order.
    pub fn has(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Removes `key` and returns its value. Absent keys are a no-op.
    pub fn del(&mut self, key: &str) -> Option<V> {
        let id = self.index.remove(key)?;
        let entry = self.order.remove(id)?;

        #[cfg(debug_assertions)]
        self.validate_invariants();

        Some(entry.value)
    }

    /// Removes every entry. Capacity is unchanged.
    pub fn reset(&mut self) {
        debug!("resetting lru cache ({} entries)", self.order.len());
        self.index.clear();
        self.order.clear();
    }

    /// Current number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// The configured capacity.
    #[inline]
    pub fn max(&self) -> Capacity {
        self.capacity
    }

    /// Returns the next eviction candidate without touching recency order.
    pub fn peek_lru(&self) -> Option<(&str, &V)> {
        self.order
            .lru()
            .map(|entry| (entry.key.as_str(), &entry.value))
    }

    /// Calls `f` for every entry, most recently used first.
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&str, &V),
    {
        for (key, value) in self.iter() {
            f(key, value);
        }
    }

    /// Calls `f` for every entry, least recently used first.
    pub fn rfor_each<F>(&self, mut f: F)
    where
        F: FnMut(&str, &V),
    {
        for (key, value) in self.iter_lru() {
            f(key, value);
        }
    }

    /// Iterates `(key, value)` most recently used first. `.rev()` gives
    /// least recently used first.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            inner: self.order.iter(),
        }
    }

    /// Iterates `(key, value)` least recently used first: the order
    /// eviction would take them.
    pub fn iter_lru(&self) -> Rev<Iter<'_, V>> {
        self.iter().rev()
    }

    /// Iterates keys most recently used first.
    pub fn keys(&self) -> impl DoubleEndedIterator<Item = &str> + ExactSizeIterator + '_ {
        self.iter().map(|(key, _)| key)
    }

    /// Reloads the cache from a dump, replacing everything it held.
    ///
    /// Records are replayed from the last (least recently used) to the first
    /// through the normal insert path, so a dump larger than this cache's
    /// capacity keeps only its most recently used records.
    ///
    /// # Errors
    ///
    /// [`LruError::InvalidKey`] if any record has an empty key. Records are
    /// checked before the reset, so a rejected dump leaves the cache as it was.
    pub fn load<I>(&mut self, dump: I) -> Result<(), LruError>
    where
        I: IntoIterator<Item = DumpEntry<V>>,
    {
        let records: Vec<DumpEntry<V>> = dump.into_iter().collect();
        if records.iter().any(|record| record.key.is_empty()) {
            return Err(LruError::InvalidKey);
        }

        self.reset();
        let total = records.len();
        for record in records.into_iter().rev() {
            self.set(record.key, record.value)?;
        }
        debug!(
            "loaded {} of {} dump records (capacity {})",
            self.len(),
            total,
            self.capacity
        );
        Ok(())
    }

    /// Verifies that the index and the recency list describe the same key
    /// set and that the size bound holds.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        if self.index.len() != self.order.len() {
            return Err(InvariantError::new(format!(
                "index holds {} keys but recency list holds {}",
                self.index.len(),
                self.order.len()
            )));
        }
        if let Some(limit) = self.capacity.limit() {
            if self.order.len() > limit {
                return Err(InvariantError::new(format!(
                    "{} entries exceed capacity {}",
                    self.order.len(),
                    limit
                )));
            }
        }

        let mut walked = 0usize;
        // One extra step so a cycle shows up as an overlong walk.
        for id in self.order.ids().take(self.order.len() + 1) {
            walked += 1;
            let entry = self
                .order
                .get(id)
                .ok_or_else(|| InvariantError::new("recency list links a freed slot"))?;
            match self.index.get(entry.key.as_str()) {
                Some(&indexed) if indexed == id => {},
                Some(_) => {
                    return Err(InvariantError::new(format!(
                        "key {:?} appears more than once in recency list",
                        entry.key
                    )));
                },
                None => {
                    return Err(InvariantError::new(format!(
                        "key {:?} is in recency list but not in index",
                        entry.key
                    )));
                },
            }
        }
        if walked != self.order.len() {
            return Err(InvariantError::new(format!(
                "walked {} list nodes, expected {}",
                walked,
                self.order.len()
            )));
        }
        Ok(())
    }

    fn evict_lru(&mut self) -> Option<Entry<V>> {
        let entry = self.order.pop_lru()?;
        self.index.remove(entry.key.as_str());
        trace!("evicting lru key {:?}", entry.key);
        Some(entry)
    }

    #[cfg(debug_assertions)]
    fn validate_invariants(&self) {
        debug_assert_eq!(self.index.len(), self.order.len());
        if let Some(limit) = self.capacity.limit() {
            debug_assert!(self.order.len() <= limit);
        }
    }
}

impl<V: Clone> LruCache<V> {
    /// Snapshots every entry, most recently used first.
    ///
    /// Feeding the result to [`load`](Self::load) on a cache of equal or
    /// greater capacity reproduces this cache's contents and order.
    pub fn dump(&self) -> Vec<DumpEntry<V>> {
        self.iter()
            .map(|(key, value)| DumpEntry::new(key, value.clone()))
            .collect()
    }
}

impl<V> Default for LruCache<V> {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl<V> fmt::Debug for LruCache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruCache")
            .field("len", &self.len())
            .field("max", &self.capacity)
            .finish()
    }
}

impl<'a, V> IntoIterator for &'a LruCache<V> {
    type Item = (&'a str, &'a V);
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Borrowing iterator over `(key, value)`, most recently used first.
pub struct Iter<'a, V> {
    inner: RecencyIter<'a, Entry<V>>,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (&'a str, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next()
            .map(|entry| (entry.key.as_str(), &entry.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, V> DoubleEndedIterator for Iter<'a, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner
            .next_back()
            .map(|entry| (entry.key.as_str(), &entry.value))
    }
}

impl<'a, V> ExactSizeIterator for Iter<'a, V> {}

/// Thread-safe LRU cache: an [`LruCache`] behind a `parking_lot::RwLock`.
///
/// Values are returned by clone so no lock guard escapes.
///
/// # Example
///
/// ```
/// # #[cfg(feature = "concurrency")]
/// # {
/// use lrukit::{ConcurrentLruCache, LruOptions};
/// use std::sync::Arc;
///
/// let cache = Arc::new(ConcurrentLruCache::new(LruOptions::new().max(2)).unwrap());
/// cache.set("a", 1).unwrap();
///
/// let reader = Arc::clone(&cache);
/// std::thread::spawn(move || assert_eq!(reader.get("a"), Some(1)))
///     .join()
///     .unwrap();
/// # }
/// ```
#[cfg(feature = "concurrency")]
pub struct ConcurrentLruCache<V> {
    inner: RwLock<LruCache<V>>,
}

#[cfg(feature = "concurrency")]
impl<V> ConcurrentLruCache<V> {
    /// Creates an empty cache from `options`.
    pub fn new(options: LruOptions) -> Result<Self, LruError> {
        Ok(Self::from_cache(LruCache::new(options)?))
    }

    pub fn with_capacity(capacity: Capacity) -> Self {
        Self::from_cache(LruCache::with_capacity(capacity))
    }

    pub fn unbounded() -> Self {
        Self::from_cache(LruCache::unbounded())
    }

    /// Wraps an existing cache, keeping its contents and order.
    pub fn from_cache(cache: LruCache<V>) -> Self {
        Self {
            inner: RwLock::new(cache),
        }
    }

    /// Unwraps the inner cache.
    pub fn into_inner(self) -> LruCache<V> {
        self.inner.into_inner()
    }

    /// Inserts or updates `key`. Takes the write lock.
    pub fn set(&self, key: impl Into<String>, value: V) -> Result<(), LruError> {
        let mut cache = self.inner.write();
        cache.set(key, value)
    }

    /// Removes `key`. Takes the write lock.
    pub fn del(&self, key: &str) -> Option<V> {
        let mut cache = self.inner.write();
        cache.del(key)
    }

    /// Removes every entry. Takes the write lock.
    pub fn reset(&self) {
        let mut cache = self.inner.write();
        cache.reset();
    }

    /// Returns `true` if `key` is present. Takes the read lock.
    pub fn has(&self, key: &str) -> bool {
        let cache = self.inner.read();
        cache.has(key)
    }

    pub fn len(&self) -> usize {
        let cache = self.inner.read();
        cache.len()
    }

    pub fn is_empty(&self) -> bool {
        let cache = self.inner.read();
        cache.is_empty()
    }

    pub fn max(&self) -> Capacity {
        let cache = self.inner.read();
        cache.max()
    }

    /// Runs `f` on the value for `key` and marks it most recently used.
    /// Takes the write lock for the duration of `f`.
    pub fn get_with<R>(&self, key: &str, f: impl FnOnce(&V) -> R) -> Option<R> {
        let mut cache = self.inner.write();
        cache.get(key).map(f)
    }

    /// Runs `f` on the value for `key` without reordering. Takes the read lock.
    pub fn peek_with<R>(&self, key: &str, f: impl FnOnce(&V) -> R) -> Option<R> {
        let cache = self.inner.read();
        cache.peek(key).map(f)
    }

    /// Visits entries most recently used first under the read lock.
    /// `f` must not call back into this cache.
    pub fn for_each<F>(&self, f: F)
    where
        F: FnMut(&str, &V),
    {
        let cache = self.inner.read();
        cache.for_each(f);
    }

    /// Visits entries least recently used first under the read lock.
    /// `f` must not call back into this cache.
    pub fn rfor_each<F>(&self, f: F)
    where
        F: FnMut(&str, &V),
    {
        let cache = self.inner.read();
        cache.rfor_each(f);
    }

    /// Replaces the contents from a dump. Takes the write lock once, so
    /// readers never observe a half-loaded cache.
    pub fn load<I>(&self, dump: I) -> Result<(), LruError>
    where
        I: IntoIterator<Item = DumpEntry<V>>,
    {
        let mut cache = self.inner.write();
        cache.load(dump)
    }

    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        let cache = self.inner.read();
        cache.check_invariants()
    }
}

#[cfg(feature = "concurrency")]
impl<V: Clone> ConcurrentLruCache<V> {
    /// Returns a clone of the value and marks it most recently used.
    pub fn get(&self, key: &str) -> Option<V> {
        self.get_with(key, V::clone)
    }

    /// Returns a clone of the value without reordering.
    pub fn peek(&self, key: &str) -> Option<V> {
        self.peek_with(key, V::clone)
    }

    /// Snapshot, most recently used first, taken under the read lock.
    pub fn dump(&self) -> Vec<DumpEntry<V>> {
        let cache = self.inner.read();
        cache.dump()
    }
}

#[cfg(feature = "concurrency")]
impl<V> Default for ConcurrentLruCache<V> {
    fn default() -> Self {
        Self::unbounded()
    }
}

#[cfg(feature = "concurrency")]
impl<V> fmt::Debug for ConcurrentLruCache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cache = self.inner.read();
        f.debug_struct("ConcurrentLruCache")
            .field("len", &cache.len())
            .field("max", &cache.max())
            .finish()
    }
}
