//! Core data structures shared by the resolution pipeline.

use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::errors::{ContainerError, ContainerResult};

thread_local! {
  // This thread-local variable holds the set of keys currently being
  // resolved on this specific thread. This is the key to detecting
  // circular dependencies.
  static RESOLVING_STACK: RefCell<HashSet<GuardKey>> = RefCell::new(HashSet::new());
}

/// A key in the in-progress resolution set. Class resolution and definition
/// resolution share the mechanism but live in distinct key spaces.
#[derive(Clone, PartialEq, Eq, Hash)]
pub(crate) enum GuardKey {
  Type(TypeId),
  Id(String),
}

/// An RAII guard that detects circular dependencies.
///
/// On entry it adds a key to the thread-local resolution stack; if the key
/// is already present the construction fails with
/// [`ContainerError::CircularDependency`]. When the guard is dropped, the
/// key is removed from the stack, on success and failure paths alike.
pub(crate) struct ResolutionGuard {
  key: GuardKey,
}

impl ResolutionGuard {
  pub(crate) fn enter(key: GuardKey, label: &str) -> ContainerResult<Self> {
    let fresh = RESOLVING_STACK.with(|stack| stack.borrow_mut().insert(key.clone()));
    if !fresh {
      return Err(ContainerError::CircularDependency(label.to_owned()));
    }
    Ok(Self { key })
  }
}

impl Drop for ResolutionGuard {
  fn drop(&mut self) {
    RESOLVING_STACK.with(|stack| {
      stack.borrow_mut().remove(&self.key);
    });
  }
}

/// Identifies a service type: a `TypeId` plus the type name for
/// diagnostics. Trait objects (`dyn Trait`) are valid keys.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeKey {
  pub(crate) id: TypeId,
  name: &'static str,
}

impl TypeKey {
  pub fn of<T: ?Sized + Any>() -> Self {
    Self {
      id: TypeId::of::<T>(),
      name: std::any::type_name::<T>(),
    }
  }

  pub fn name(&self) -> &'static str {
    self.name
  }
}

impl fmt::Debug for TypeKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "TypeKey({})", self.name)
  }
}

/// A dynamically typed, cheaply clonable value handle.
///
/// Resolved class instances carry their concrete type `T` as the payload;
/// bound interfaces carry `Arc<dyn Trait>`. The payload's type name is
/// retained for error messages.
#[derive(Clone)]
pub struct Value {
  inner: Arc<dyn Any + Send + Sync>,
  type_name: &'static str,
}

impl Value {
  pub fn new<T: Any + Send + Sync>(payload: T) -> Self {
    Self {
      inner: Arc::new(payload),
      type_name: std::any::type_name::<T>(),
    }
  }

  pub fn from_arc<T: Any + Send + Sync>(payload: Arc<T>) -> Self {
    Self {
      inner: payload,
      type_name: std::any::type_name::<T>(),
    }
  }

  pub(crate) fn from_boxed(payload: Box<dyn Any + Send + Sync>, type_name: &'static str) -> Self {
    Self {
      inner: Arc::from(payload),
      type_name,
    }
  }

  /// The type name of the payload, as registered.
  pub fn type_name(&self) -> &'static str {
    self.type_name
  }

  pub(crate) fn payload_type(&self) -> TypeId {
    self.inner.as_ref().type_id()
  }

  pub(crate) fn any_ref(&self) -> &(dyn Any + Send + Sync) {
    self.inner.as_ref()
  }

  /// Returns `true` if the payload is a `T`.
  pub fn is<T: Any>(&self) -> bool {
    self.inner.as_ref().is::<T>()
  }

  /// Shares the payload as `Arc<T>`, or `None` on a type mismatch.
  pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
    self.inner.clone().downcast::<T>().ok()
  }

  /// Clones the payload out of the handle, or `None` on a type mismatch.
  pub fn cloned<T: Any + Send + Sync + Clone>(&self) -> Option<T> {
    self.inner.downcast_ref::<T>().cloned()
  }
}

impl fmt::Debug for Value {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Value({})", self.type_name)
  }
}

/// Wraps a payload into a [`Value`]. Shorthand for `Value::new`.
pub fn value<T: Any + Send + Sync>(payload: T) -> Value {
  Value::new(payload)
}

/// Caching policy for a definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Lifetime {
  /// A fresh value on every resolution.
  Transient,
  /// One value per container, shared across scopes.
  #[default]
  Singleton,
  /// One value per active scope.
  Scoped,
}

impl Lifetime {
  pub fn is_cached(self) -> bool {
    matches!(self, Lifetime::Singleton | Lifetime::Scoped)
  }
}

/// The outcome of settling a class: the instance, plus the return value of
/// the invoked method when one was requested.
#[derive(Debug, Clone)]
pub struct Settled {
  pub instance: Value,
  pub returned: Option<Value>,
}
