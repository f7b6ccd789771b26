//! # Strand Memo
//!
//! Two small memoization primitives:
//!
//! - [`MemoCache`]: a concurrent keyed get-or-compute map. The computation
//!   for a key runs at most once, even under concurrent first access.
//! - [`OwnedCache`]: a side table keyed by owner identity. An entry lives
//!   exactly as long as its owning object is reachable elsewhere; dead
//!   entries are purged on access.

use std::hash::Hash;
use std::sync::{Arc, Weak};

use dashmap::DashMap;
use once_cell::sync::OnceCell;

/// A concurrent get-or-compute cache.
///
/// # Examples
///
/// ```
/// use strand_memo::MemoCache;
///
/// let cache: MemoCache<String, u64> = MemoCache::new();
/// let v = cache.get_or_init("answer".to_string(), || 42);
/// assert_eq!(*v, 42);
///
/// // The closure no longer runs for a cached key.
/// let again = cache.get_or_init("answer".to_string(), || unreachable!());
/// assert_eq!(*again, 42);
/// ```
pub struct MemoCache<K, V> {
  entries: DashMap<K, Arc<OnceCell<Arc<V>>>>,
}

impl<K: Eq + Hash + Clone, V> Default for MemoCache<K, V> {
  fn default() -> Self {
    Self::new()
  }
}

impl<K: Eq + Hash + Clone, V> MemoCache<K, V> {
  pub fn new() -> Self {
    Self {
      entries: DashMap::new(),
    }
  }

  // The cell is taken out of the map before initialization so the shard
  // lock is not held while the computation runs.
  fn cell(&self, key: K) -> Arc<OnceCell<Arc<V>>> {
    self
      .entries
      .entry(key)
      .or_insert_with(|| Arc::new(OnceCell::new()))
      .clone()
  }

  /// Returns the cached value for `key`, computing it with `init` on first
  /// access. Concurrent first accesses run `init` once; the losers wait.
  pub fn get_or_init(&self, key: K, init: impl FnOnce() -> V) -> Arc<V> {
    self.cell(key).get_or_init(|| Arc::new(init())).clone()
  }

  /// Fallible variant of [`MemoCache::get_or_init`]. A failed computation
  /// leaves the entry empty, so a later call retries.
  pub fn get_or_try_init<E>(
    &self,
    key: K,
    init: impl FnOnce() -> Result<V, E>,
  ) -> Result<Arc<V>, E> {
    self
      .cell(key)
      .get_or_try_init(|| init().map(Arc::new))
      .cloned()
  }

  /// The cached value for `key`, if already computed.
  pub fn get(&self, key: &K) -> Option<Arc<V>> {
    self
      .entries
      .get(key)
      .and_then(|entry| entry.value().get().cloned())
  }

  /// Forgets the entry for `key`, returning the cached value if one was
  /// computed.
  pub fn remove(&self, key: &K) -> Option<Arc<V>> {
    self
      .entries
      .remove(key)
      .and_then(|(_, cell)| cell.get().cloned())
  }

  pub fn clear(&self) {
    self.entries.clear();
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}

struct OwnedEntry<O: ?Sized, V> {
  owner: Weak<O>,
  value: Arc<V>,
}

/// A cache keyed by owner identity.
///
/// Entries hold a weak back-reference to their owner; once the owning
/// `Arc` has no other referents the entry is dropped on the next access.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use strand_memo::OwnedCache;
///
/// struct Session;
///
/// let cache: OwnedCache<Session, String> = OwnedCache::new();
/// let session = Arc::new(Session);
///
/// let v = cache.get_or_init(&session, || "expensive".to_string());
/// assert_eq!(*v, "expensive");
/// assert_eq!(cache.len(), 1);
///
/// drop(session);
/// cache.purge();
/// assert_eq!(cache.len(), 0);
/// ```
pub struct OwnedCache<O: ?Sized, V> {
  entries: DashMap<usize, OwnedEntry<O, V>>,
}

impl<O: ?Sized, V> Default for OwnedCache<O, V> {
  fn default() -> Self {
    Self::new()
  }
}

impl<O: ?Sized, V> OwnedCache<O, V> {
  pub fn new() -> Self {
    Self {
      entries: DashMap::new(),
    }
  }

  fn key(owner: &Arc<O>) -> usize {
    Arc::as_ptr(owner).cast::<()>() as usize
  }

  /// Returns the value cached for `owner`, computing it on first access.
  pub fn get_or_init(&self, owner: &Arc<O>, init: impl FnOnce() -> V) -> Arc<V> {
    self.purge();
    let entry = self
      .entries
      .entry(Self::key(owner))
      .or_insert_with(|| OwnedEntry {
        owner: Arc::downgrade(owner),
        value: Arc::new(init()),
      });
    entry.value().value.clone()
  }

  /// The value cached for `owner`, if any.
  pub fn get(&self, owner: &Arc<O>) -> Option<Arc<V>> {
    self.purge();
    self
      .entries
      .get(&Self::key(owner))
      .map(|entry| entry.value().value.clone())
  }

  /// Drops the entry for `owner`, returning its value.
  pub fn remove(&self, owner: &Arc<O>) -> Option<Arc<V>> {
    self
      .entries
      .remove(&Self::key(owner))
      .map(|(_, entry)| entry.value)
  }

  /// Drops every entry whose owner is gone. Called automatically on
  /// access; exposed for explicit cleanup points.
  pub fn purge(&self) {
    self.entries.retain(|_, entry| entry.owner.strong_count() > 0);
  }

  /// The number of live entries, after purging dead ones.
  pub fn len(&self) -> usize {
    self.purge();
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}
