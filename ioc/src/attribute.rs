//! Declarative injection attributes and the attribute-resolver registry.
//!
//! Attributes are structured metadata attached to a parameter or property
//! at blueprint registration time. The built-in payload forms (literal,
//! function call, definition lookup) are interpreted inline by the
//! resolvers; custom kinds are dispatched through the [`AttributeRegistry`],
//! where a resolver may decline by returning `Ok(None)` so that the caller
//! falls through to its next strategy.

use std::any::Any;
use std::sync::Arc;

use dashmap::DashMap;

use crate::container::Container;
use crate::core::Value;
use crate::definitions::DefinitionResolver;
use crate::errors::{ContainerError, ContainerResult};

/// Resolution instructions carried by one parameter or property.
#[derive(Clone)]
pub enum Attribute {
  /// Use the payload verbatim.
  Literal(Value),
  /// Invoke a named resolver function registered on the container.
  Call { function: String, args: Vec<Value> },
  /// Resolve a definition ID.
  Lookup(String),
  /// Dispatch to a custom resolver registered under `kind`.
  Custom { kind: String, payload: Value },
}

impl Attribute {
  pub fn literal<T: Any + Send + Sync>(payload: T) -> Self {
    Attribute::Literal(Value::new(payload))
  }

  pub fn call(function: &str, args: Vec<Value>) -> Self {
    Attribute::Call {
      function: function.to_owned(),
      args,
    }
  }

  pub fn lookup(id: &str) -> Self {
    Attribute::Lookup(id.to_owned())
  }

  pub fn custom(kind: &str, payload: Value) -> Self {
    Attribute::Custom {
      kind: kind.to_owned(),
      payload,
    }
  }
}

/// Where an attribute was encountered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
  Parameter,
  Property,
  Method,
}

/// The reflection target handed to custom resolvers.
#[derive(Debug, Clone, Copy)]
pub struct AttributeTarget<'a> {
  pub kind: TargetKind,
  /// The class or context label owning the target.
  pub owner: &'a str,
  /// The parameter or property name.
  pub name: &'a str,
}

/// A capability that interprets one attribute kind.
///
/// Returning `Ok(None)` signals "I decline to handle this attribute
/// instance"; the caller then falls through to its next resolution
/// strategy rather than treating the absence as a final value.
pub trait AttributeResolver: Send + Sync {
  fn resolve(
    &self,
    payload: &Value,
    target: &AttributeTarget<'_>,
    container: &Container,
  ) -> ContainerResult<Option<Value>>;
}

impl<F> AttributeResolver for F
where
  F: Fn(&Value, &AttributeTarget<'_>, &Container) -> ContainerResult<Option<Value>> + Send + Sync,
{
  fn resolve(
    &self,
    payload: &Value,
    target: &AttributeTarget<'_>,
    container: &Container,
  ) -> ContainerResult<Option<Value>> {
    self(payload, target, container)
  }
}

/// Maps attribute kinds to resolver capabilities.
#[derive(Default)]
pub struct AttributeRegistry {
  resolvers: DashMap<String, Arc<dyn AttributeResolver>>,
}

impl AttributeRegistry {
  pub(crate) fn new() -> Self {
    Self::default()
  }

  pub fn register<R: AttributeResolver + 'static>(&self, kind: &str, resolver: R) {
    tracing::debug!(kind, "registering attribute resolver");
    self.resolvers.insert(kind.to_owned(), Arc::new(resolver));
  }

  /// Resolves a custom attribute. Unregistered kinds resolve to `Ok(None)`,
  /// deferring to the caller's fallback.
  pub fn resolve(
    &self,
    kind: &str,
    payload: &Value,
    target: &AttributeTarget<'_>,
    container: &Container,
  ) -> ContainerResult<Option<Value>> {
    let resolver = match self.resolvers.get(kind) {
      Some(entry) => Arc::clone(entry.value()),
      None => return Ok(None),
    };
    resolver.resolve(payload, target, container)
  }
}

/// Interprets one attribute against the container. Shared by the parameter
/// and property resolvers; `Ok(None)` means the attribute declined and the
/// caller should fall through.
pub(crate) fn resolve_attribute(
  container: &Container,
  attribute: &Attribute,
  kind: TargetKind,
  owner: &str,
  name: &str,
) -> ContainerResult<Option<Value>> {
  match attribute {
    Attribute::Literal(payload) => Ok(Some(payload.clone())),
    Attribute::Call { function, args } => {
      let f = container.repository().function(function).ok_or_else(|| {
        ContainerError::MalformedAttribute {
          target: format!("{owner}::{name}"),
          reason: format!("unknown resolver function `{function}`"),
        }
      })?;
      f(container, args).map(Some)
    }
    Attribute::Lookup(id) => DefinitionResolver::resolve(container, id).map(Some),
    Attribute::Custom { kind: custom, payload } => {
      let target = AttributeTarget { kind, owner, name };
      container
        .attributes()
        .resolve(custom, payload, &target, container)
    }
  }
}
