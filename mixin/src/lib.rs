//! # Strand Mixin
//!
//! A runtime method registry for a receiver type: named callables are
//! registered once and dispatched by name when no statically known method
//! matches.
//!
//! A mixed-in method may return a value, or return `None` to mean "yield
//! the receiver itself" so call sites can keep a fluent chain going.

use std::any::Any;
use std::sync::Arc;

use dashmap::DashMap;
use thiserror::Error;

/// Dynamically typed argument and return values.
pub type Value = Arc<dyn Any + Send + Sync>;

/// Wraps a payload into a [`Value`].
pub fn value<T: Any + Send + Sync>(payload: T) -> Value {
  Arc::new(payload)
}

type MixFn<T> = Arc<dyn Fn(&T, &[Value]) -> Option<Value> + Send + Sync>;

/// Errors raised during dispatch.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MixinError {
  /// No callable is registered under the requested name.
  #[error("no mixed-in method named `{method}`")]
  UnknownMethod { method: String },
}

/// A registry of named methods for the receiver type `T`.
///
/// # Examples
///
/// ```
/// use strand_mixin::{value, MixRegistry};
///
/// struct Order {
///   total_cents: u64,
/// }
///
/// let mixins: MixRegistry<Order> = MixRegistry::new();
/// mixins.mix("formatted_total", |order, _| {
///   Some(value(format!("${}.{:02}", order.total_cents / 100, order.total_cents % 100)))
/// });
///
/// let order = Order { total_cents: 1999 };
/// let rendered = mixins.call(&order, "formatted_total", &[]).unwrap();
/// let rendered = rendered.and_then(|v| v.downcast_ref::<String>().cloned());
/// assert_eq!(rendered.as_deref(), Some("$19.99"));
/// ```
pub struct MixRegistry<T: ?Sized + 'static> {
  methods: DashMap<String, MixFn<T>>,
}

impl<T: ?Sized + 'static> Default for MixRegistry<T> {
  fn default() -> Self {
    Self::new()
  }
}

impl<T: ?Sized + 'static> MixRegistry<T> {
  pub fn new() -> Self {
    Self {
      methods: DashMap::new(),
    }
  }

  /// Registers `method` under `name`. The last registration for a name
  /// wins.
  pub fn mix<F>(&self, name: &str, method: F)
  where
    F: Fn(&T, &[Value]) -> Option<Value> + Send + Sync + 'static,
  {
    self.methods.insert(name.to_owned(), Arc::new(method));
  }

  /// Imports every method of `other`, overwriting same-named entries.
  pub fn mix_from(&self, other: &MixRegistry<T>) {
    for entry in other.methods.iter() {
      self
        .methods
        .insert(entry.key().clone(), Arc::clone(entry.value()));
    }
  }

  pub fn has(&self, name: &str) -> bool {
    self.methods.contains_key(name)
  }

  /// The registered method names, sorted.
  pub fn names(&self) -> Vec<String> {
    let mut names: Vec<String> = self.methods.iter().map(|e| e.key().clone()).collect();
    names.sort();
    names
  }

  /// Dispatches `name` against `receiver`.
  ///
  /// `Ok(Some(value))` is the method's return value; `Ok(None)` means the
  /// method yields the receiver for chaining.
  pub fn call(&self, receiver: &T, name: &str, args: &[Value]) -> Result<Option<Value>, MixinError> {
    let method = self
      .methods
      .get(name)
      .map(|entry| Arc::clone(entry.value()))
      .ok_or_else(|| MixinError::UnknownMethod {
        method: name.to_owned(),
      })?;
    Ok(method(receiver, args))
  }
}
