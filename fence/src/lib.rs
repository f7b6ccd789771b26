//! # Strand Fence
//!
//! Creation gates that limit how many instances of a type may exist:
//! exactly one ([`Fence::single`]), one per string key
//! ([`Fence::multiton`]) or up to a fixed count ([`Fence::limited`]).
//!
//! Instances live in a process-wide registry with an explicit lifecycle:
//! created on first access, never torn down implicitly, clearable per type
//! so tests can isolate state between cases.

use std::any::{Any, TypeId};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::{Lazy, OnceCell};
use thiserror::Error;

type Slot = Arc<OnceCell<Arc<dyn Any + Send + Sync>>>;

static INSTANCES: Lazy<DashMap<(TypeId, String), Slot>> = Lazy::new(DashMap::new);
static COUNTERS: Lazy<DashMap<TypeId, Arc<AtomicUsize>>> = Lazy::new(DashMap::new);

/// Errors raised by creation gates.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FenceError {
  /// The type already has as many instances as its gate allows.
  #[error("instance limit of {limit} exceeded for `{type_name}`")]
  LimitExceeded { type_name: &'static str, limit: usize },

  /// A requirement predicate rejected creation.
  #[error("requirement not met for `{type_name}`: {reason}")]
  RequirementNotMet {
    type_name: &'static str,
    reason: String,
  },
}

/// Starts a gate for `T`.
///
/// # Examples
///
/// ```
/// use strand_fence::fence;
///
/// struct Registry {
///   id: u32,
/// }
///
/// let first = fence::<Registry>().single(|| Registry { id: 1 }).unwrap();
/// let again = fence::<Registry>().single(|| Registry { id: 2 }).unwrap();
///
/// // The factory only ran once; both handles share the instance.
/// assert_eq!(again.id, 1);
/// assert!(std::sync::Arc::ptr_eq(&first, &again));
/// ```
pub fn fence<T: Any + Send + Sync>() -> Fence<T> {
  Fence {
    requirement: None,
    _marker: std::marker::PhantomData,
  }
}

/// Builder for gated instance creation. Obtained via [`fence`].
pub struct Fence<T> {
  requirement: Option<(Box<dyn Fn() -> bool>, String)>,
  _marker: std::marker::PhantomData<fn() -> T>,
}

impl<T: Any + Send + Sync> Fence<T> {

  /// Gates creation behind a predicate; a `false` answer yields
  /// [`FenceError::RequirementNotMet`]. Already-created instances are
  /// returned without re-checking.
  pub fn requirement(mut self, check: impl Fn() -> bool + 'static, reason: &str) -> Self {
    self.requirement = Some((Box::new(check), reason.to_owned()));
    self
  }

  fn slot(key: &str) -> Slot {
    INSTANCES
      .entry((TypeId::of::<T>(), key.to_owned()))
      .or_insert_with(|| Arc::new(OnceCell::new()))
      .clone()
  }

  fn check_requirement(&self) -> Result<(), FenceError> {
    if let Some((check, reason)) = &self.requirement {
      if !check() {
        return Err(FenceError::RequirementNotMet {
          type_name: std::any::type_name::<T>(),
          reason: reason.clone(),
        });
      }
    }
    Ok(())
  }

  fn settle(slot: &Slot, factory: impl FnOnce() -> T) -> Arc<T> {
    let stored = slot.get_or_init(|| Arc::new(factory()));
    // The slot only ever holds a T; a mismatch would mean a TypeId
    // collision in the registry itself.
    stored
      .clone()
      .downcast::<T>()
      .unwrap_or_else(|_| unreachable!("fence slot holds a foreign type"))
  }

  /// Exactly one instance for the type, created on first call.
  pub fn single(self, factory: impl FnOnce() -> T) -> Result<Arc<T>, FenceError> {
    let slot = Self::slot("");
    if slot.get().is_none() {
      self.check_requirement()?;
    }
    Ok(Self::settle(&slot, factory))
  }

  /// One instance per string key, created on first call for that key.
  pub fn multiton(self, key: &str, factory: impl FnOnce() -> T) -> Result<Arc<T>, FenceError> {
    let slot = Self::slot(key);
    if slot.get().is_none() {
      self.check_requirement()?;
    }
    Ok(Self::settle(&slot, factory))
  }

  /// A fresh instance per call, up to `limit` live creations; further
  /// calls yield [`FenceError::LimitExceeded`].
  pub fn limited(self, limit: usize, factory: impl FnOnce() -> T) -> Result<Arc<T>, FenceError> {
    self.check_requirement()?;
    let counter = COUNTERS
      .entry(TypeId::of::<T>())
      .or_insert_with(|| Arc::new(AtomicUsize::new(0)))
      .clone();
    let claimed = counter.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |current| {
      (current < limit).then_some(current + 1)
    });
    let index = claimed.map_err(|_| FenceError::LimitExceeded {
      type_name: std::any::type_name::<T>(),
      limit,
    })?;
    let slot = Self::slot(&format!("slot-{index}"));
    Ok(Self::settle(&slot, factory))
  }
}

/// The number of live gated instances for `T`, across all gate styles.
pub fn count<T: Any>() -> usize {
  let id = TypeId::of::<T>();
  INSTANCES
    .iter()
    .filter(|entry| entry.key().0 == id && entry.value().get().is_some())
    .count()
}

/// Drops every gated instance and the creation counter for `T`. The next
/// gate call starts fresh.
pub fn clear<T: Any>() {
  let id = TypeId::of::<T>();
  INSTANCES.retain(|key, _| key.0 != id);
  COUNTERS.remove(&id);
}
