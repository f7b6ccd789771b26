//! Class resolution: the full settle pipeline for one service type.

use crate::blueprint::Blueprint;
use crate::container::Container;
use crate::core::{GuardKey, ResolutionGuard, Settled, TypeKey, Value};
use crate::errors::{ContainerError, ContainerResult};
use crate::invocation::ResolutionMode;
use crate::params::ParameterResolver;
use crate::properties::PropertyResolver;
use crate::repository::ClassResource;

pub(crate) struct ClassResolver;

impl ClassResolver {
  /// Settles `key` into an instance and, when a method is determined, the
  /// method's return value.
  ///
  /// Without `make`, a cached instance in the active scope short-circuits
  /// construction; a requested method is still invoked fresh against the
  /// cached instance on every call. With `make`, the cache is neither read
  /// nor written.
  pub(crate) fn resolve(
    container: &Container,
    key: TypeKey,
    method: Option<&str>,
    make: bool,
    mode: ResolutionMode,
  ) -> ContainerResult<Settled> {
    let repo = container.repository();
    let options = repo.options();
    let scope = repo.scope();

    if !make {
      if let Some(instance) = repo.cached_instance(&scope, key.id) {
        if options.debug {
          tracing::debug!(service = key.name(), scope = %scope, "instance cache hit");
        } else {
          tracing::trace!(service = key.name(), scope = %scope, "instance cache hit");
        }
        let returned = Self::settle_method(container, key, &instance, method, mode)?;
        return Ok(Settled { instance, returned });
      }
    }

    // The generic strategy never recurses, so only injected resolution
    // carries the in-progress guard.
    let _guard = match mode {
      ResolutionMode::Injected => {
        Some(ResolutionGuard::enter(GuardKey::Type(key.id), key.name())?)
      }
      ResolutionMode::Generic => None,
    };

    let blueprint = repo
      .blueprint(key.id)
      .ok_or_else(|| ContainerError::NotFound(key.name().to_owned()))?;
    let resource = repo.resource(key.id);

    if options.debug {
      tracing::debug!(service = key.name(), make, "resolving");
    } else {
      tracing::trace!(service = key.name(), make, "resolving");
    }

    let param_mode = mode.param_mode(&options);
    let mut args = ParameterResolver::resolve(
      container,
      &blueprint.params,
      &resource.ctor_args,
      key.name(),
      param_mode,
    )?;
    let mut boxed = (blueprint.assemble)(&mut args, container)?;

    let property_attributes =
      matches!(mode, ResolutionMode::Injected) && options.property_attributes;
    PropertyResolver::apply(
      container,
      &blueprint,
      boxed.as_mut(),
      &resource,
      property_attributes,
    )?;

    let instance = Value::from_boxed(boxed, key.name());
    let returned = Self::invoke_method(container, &blueprint, &resource, &instance, method, mode)?;

    if !make {
      repo.cache_instance(scope, key.id, instance.clone());
    }
    Ok(Settled { instance, returned })
  }

  /// Method invocation against an already-cached instance.
  fn settle_method(
    container: &Container,
    key: TypeKey,
    instance: &Value,
    explicit: Option<&str>,
    mode: ResolutionMode,
  ) -> ContainerResult<Option<Value>> {
    let repo = container.repository();
    let Some(blueprint) = repo.blueprint(key.id) else {
      return match explicit {
        Some(method) => Err(ContainerError::MethodNotFound {
          method: method.to_owned(),
          class: key.name().to_owned(),
        }),
        None => Ok(None),
      };
    };
    let resource = repo.resource(key.id);
    Self::invoke_method(container, &blueprint, &resource, instance, explicit, mode)
  }

  /// Determines which method to invoke (explicit request, registered
  /// default, container-wide default, in that order) and invokes it.
  fn invoke_method(
    container: &Container,
    blueprint: &Blueprint,
    resource: &ClassResource,
    instance: &Value,
    explicit: Option<&str>,
    mode: ResolutionMode,
  ) -> ContainerResult<Option<Value>> {
    let repo = container.repository();
    let chosen: Option<String> = explicit
      .map(str::to_owned)
      .or_else(|| resource.default_method.clone())
      .or_else(|| blueprint.default_method.map(str::to_owned))
      .or_else(|| repo.default_method());
    let Some(name) = chosen else {
      return Ok(None);
    };
    let Some(method) = blueprint.methods.get(name.as_str()) else {
      // An implicitly determined method only fires when declared; an
      // explicitly requested one must exist.
      return if explicit.is_some() {
        Err(ContainerError::MethodNotFound {
          method: name,
          class: blueprint.key.name().to_owned(),
        })
      } else {
        Ok(None)
      };
    };

    let options = repo.options();
    let context = format!("{}::{}", blueprint.key.name(), name);
    let mut args = ParameterResolver::resolve(
      container,
      &method.params,
      &resource.method_args,
      &context,
      mode.param_mode(&options),
    )?;
    (method.body)(instance.any_ref(), &mut args, container).map(Some)
  }
}
