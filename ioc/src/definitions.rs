//! Definitions bind string IDs to values, factories, types or other IDs.

use std::any::Any;
use std::sync::Arc;

use crate::class_resolver::ClassResolver;
use crate::container::Container;
use crate::core::{GuardKey, Lifetime, ResolutionGuard, TypeKey, Value};
use crate::errors::{ContainerError, ContainerResult};
use crate::repository::CONTAINER_SCOPE;

type FactoryFn = Arc<dyn Fn(&Container) -> ContainerResult<Value> + Send + Sync>;

/// What a definition resolves to.
#[derive(Clone)]
pub enum DefinitionSource {
  /// A literal, returned verbatim.
  Value(Value),
  /// A closure invoked with container access.
  Factory(FactoryFn),
  /// A registered service type, delegated to class resolution.
  Type(TypeKey),
  /// Another definition ID, resolved transitively.
  Alias(String),
}

/// A registered binding for one ID: its source, caching lifetime and tags.
#[derive(Clone)]
pub struct Definition {
  pub(crate) source: DefinitionSource,
  pub(crate) lifetime: Lifetime,
  pub(crate) tags: Vec<String>,
}

impl Definition {
  pub fn value<T: Any + Send + Sync>(payload: T) -> Self {
    Self::from_source(DefinitionSource::Value(Value::new(payload)))
  }

  pub fn factory<F>(factory: F) -> Self
  where
    F: Fn(&Container) -> ContainerResult<Value> + Send + Sync + 'static,
  {
    Self::from_source(DefinitionSource::Factory(Arc::new(factory)))
  }

  pub fn of_type<T: Any + Send + Sync>() -> Self {
    Self::from_source(DefinitionSource::Type(TypeKey::of::<T>()))
  }

  pub fn alias(target: &str) -> Self {
    Self::from_source(DefinitionSource::Alias(target.to_owned()))
  }

  fn from_source(source: DefinitionSource) -> Self {
    Self {
      source,
      lifetime: Lifetime::default(),
      tags: Vec::new(),
    }
  }

  pub fn lifetime(mut self, lifetime: Lifetime) -> Self {
    self.lifetime = lifetime;
    self
  }

  pub fn tag(mut self, tag: &str) -> Self {
    self.tags.push(tag.to_owned());
    self
  }
}

/// Resolves definition IDs, honoring environment overrides, alias chains
/// and lifetimes.
pub(crate) struct DefinitionResolver;

impl DefinitionResolver {
  pub(crate) fn resolve(container: &Container, id: &str) -> ContainerResult<Value> {
    let repo = container.repository();

    // An environment-scoped binding redirects the lookup before anything
    // else. The guard covers the hop so cyclic override chains fail the
    // same way cyclic aliases do.
    if let Some(env) = repo.environment() {
      if let Some(target) = repo.env_override(&env, id) {
        if target != id {
          let _guard = ResolutionGuard::enter(GuardKey::Id(id.to_owned()), id)?;
          return Self::resolve(container, &target);
        }
      }
    }

    let definition = repo
      .definition(id)
      .ok_or_else(|| ContainerError::NotFound(id.to_owned()))?;

    let cache_scope = match definition.lifetime {
      Lifetime::Singleton => Some(CONTAINER_SCOPE.to_owned()),
      Lifetime::Scoped => Some(repo.scope()),
      Lifetime::Transient => None,
    };

    if let Some(scope) = &cache_scope {
      if let Some(cached) = repo.cached_definition(scope, id) {
        return Ok(cached);
      }
    }

    let _guard = ResolutionGuard::enter(GuardKey::Id(id.to_owned()), id)?;

    let value = match definition.source {
      DefinitionSource::Value(value) => value,
      DefinitionSource::Factory(factory) => factory(container)?,
      DefinitionSource::Type(key) => {
        ClassResolver::resolve(container, key, None, false, container.resolution_mode())?.instance
      }
      DefinitionSource::Alias(target) => Self::resolve(container, &target)?,
    };

    if let Some(scope) = cache_scope {
      repo.cache_definition(scope, id, value.clone());
    }
    Ok(value)
  }
}
