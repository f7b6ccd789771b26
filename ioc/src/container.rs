//! The container facade: wires the repository, the attribute registry and
//! the invocation strategies together behind one API.

use std::any::Any;
use std::sync::Arc;

use crate::attribute::{AttributeRegistry, AttributeResolver};
use crate::blueprint::{Blueprint, SuppliedArg};
use crate::core::{Settled, TypeKey, Value};
use crate::definitions::{Definition, DefinitionResolver};
use crate::errors::{ContainerError, ContainerResult};
use crate::invocation::{Callable, CallStrategy, GenericCall, InjectedCall, ResolutionMode};
use crate::repository::{ProviderFn, Repository};

/// An object that performs its own bindings against the container, invoked
/// once at import time.
pub trait ServiceProvider {
  fn register(&self, container: &Container);
}

/// The dependency-injection container.
///
/// Thread-safe; registration and resolution may interleave freely from any
/// thread. Each container owns an independent repository, so separate
/// instances never share registrations or cached values.
#[derive(Default)]
pub struct Container {
  repository: Repository,
  attributes: AttributeRegistry,
}

impl Container {
  /// Creates a new, empty container.
  pub fn new() -> Self {
    Self {
      repository: Repository::new(),
      attributes: AttributeRegistry::new(),
    }
  }

  pub(crate) fn repository(&self) -> &Repository {
    &self.repository
  }

  /// The attribute registry consulted for custom attribute kinds.
  pub fn attributes(&self) -> &AttributeRegistry {
    &self.attributes
  }

  fn strategy(&self) -> &'static dyn CallStrategy {
    if self.repository.options().injection {
      &InjectedCall
    } else {
      &GenericCall
    }
  }

  pub(crate) fn resolution_mode(&self) -> ResolutionMode {
    if self.repository.options().injection {
      ResolutionMode::Injected
    } else {
      ResolutionMode::Generic
    }
  }

  // --- Resolution ---

  /// Resolves `T`, honoring the per-scope instance cache.
  pub fn get<T: Any + Send + Sync>(&self) -> ContainerResult<Arc<T>> {
    let settled = self
      .strategy()
      .class_settler(self, TypeKey::of::<T>(), None, false)?;
    Self::shared::<T>(settled.instance)
  }

  /// Resolves a bound interface as `Arc<I>`.
  pub fn get_trait<I: ?Sized + Any + Send + Sync>(&self) -> ContainerResult<Arc<I>> {
    let key = TypeKey::of::<I>();
    let value = self.resolve_type_key(key)?;
    let found = value.type_name();
    value
      .downcast::<Arc<I>>()
      .map(|outer| (*outer).clone())
      .ok_or_else(|| ContainerError::TypeMismatch {
        context: key.name().to_owned(),
        expected: std::any::type_name::<Arc<I>>(),
        found,
      })
  }

  /// Resolves a definition ID.
  pub fn lookup(&self, id: &str) -> ContainerResult<Value> {
    DefinitionResolver::resolve(self, id)
  }

  /// Resolves a fresh `T`, bypassing the instance cache entirely: the
  /// cache is neither read nor written.
  pub fn make<T: Any + Send + Sync>(&self) -> ContainerResult<Arc<T>> {
    let settled = self
      .strategy()
      .class_settler(self, TypeKey::of::<T>(), None, true)?;
    Self::shared::<T>(settled.instance)
  }

  /// Like [`Container::make`], additionally invoking `method` on the fresh
  /// instance.
  pub fn make_with<T: Any + Send + Sync>(&self, method: &str) -> ContainerResult<Settled> {
    self
      .strategy()
      .class_settler(self, TypeKey::of::<T>(), Some(method), true)
  }

  /// Settles `T` and invokes `method` (or the determined default when
  /// `None`), returning the instance and the method's return value.
  pub fn call<T: Any + Send + Sync>(&self, method: Option<&str>) -> ContainerResult<Settled> {
    self
      .strategy()
      .class_settler(self, TypeKey::of::<T>(), method, false)
  }

  /// Settles `T` with its registered or default method and returns the
  /// method's value, falling back to the instance when none was invoked.
  pub fn get_return<T: Any + Send + Sync>(&self) -> ContainerResult<Value> {
    let settled = self
      .strategy()
      .class_settler(self, TypeKey::of::<T>(), None, false)?;
    Ok(settled.returned.unwrap_or(settled.instance))
  }

  /// Settles a standalone callable with the active strategy.
  pub fn call_callable(
    &self,
    callable: &Callable,
    supplied: &[SuppliedArg],
  ) -> ContainerResult<Value> {
    self.strategy().closure_settler(self, callable, supplied)
  }

  /// Auto-wiring entry point: a registered blueprint wins, then interface
  /// providers filtered by the active environment.
  pub(crate) fn resolve_type_key(&self, key: TypeKey) -> ContainerResult<Value> {
    if self.repository.blueprint(key.id).is_some() {
      return self
        .strategy()
        .class_settler(self, key, None, false)
        .map(|settled| settled.instance);
    }
    let env = self.repository.environment();
    if let Some(provider) = self
      .repository
      .interface_provider(key.id, env.as_deref())
    {
      return provider(self);
    }
    Err(ContainerError::NotFound(key.name().to_owned()))
  }

  fn shared<T: Any + Send + Sync>(instance: Value) -> ContainerResult<Arc<T>> {
    let found = instance.type_name();
    instance
      .downcast::<T>()
      .ok_or_else(|| ContainerError::TypeMismatch {
        context: std::any::type_name::<T>().to_owned(),
        expected: std::any::type_name::<T>(),
        found,
      })
  }

  // --- Environments ---

  /// Activates an environment; environment-scoped bindings take precedence
  /// while it is set.
  pub fn set_environment(&self, env: &str) {
    tracing::debug!(env, "switching environment");
    self.repository.set_environment(Some(env));
  }

  pub fn clear_environment(&self) {
    self.repository.set_environment(None);
  }

  pub fn environment(&self) -> Option<String> {
    self.repository.environment()
  }

  /// Redirects `interface_id` to `implementation_id` whenever `env` is the
  /// active environment.
  pub fn bind_interface_for_env(&self, env: &str, interface_id: &str, implementation_id: &str) {
    tracing::debug!(env, interface_id, implementation_id, "environment binding");
    self
      .repository
      .add_env_override(env, interface_id, implementation_id);
  }

  // --- Scopes ---

  /// Switches the active scope. Cached instances and scoped definitions
  /// from other scopes stay untouched but are no longer visible.
  pub fn set_scope(&self, name: &str) {
    tracing::debug!(scope = name, "switching scope");
    self.repository.set_scope(name);
  }

  pub fn scope(&self) -> String {
    self.repository.scope()
  }

  /// Enters `name` for the lifetime of the returned guard; the previous
  /// scope is restored on drop.
  pub fn scoped(&self, name: &str) -> ScopeGuard<'_> {
    let previous = self.repository.scope();
    self.repository.set_scope(name);
    ScopeGuard {
      container: self,
      previous,
    }
  }

  // --- Tags ---

  /// Resolves every definition carrying `tag`, in ID order.
  pub fn tagged(&self, tag: &str) -> ContainerResult<Vec<(String, Value)>> {
    self
      .repository
      .tagged_ids(tag)
      .into_iter()
      .map(|id| DefinitionResolver::resolve(self, &id).map(|value| (id, value)))
      .collect()
  }

  // --- Lifecycle ---

  /// Clears every cached instance and definition value while keeping all
  /// registrations. Intended for tests and scope teardown.
  pub fn reset(&self) {
    tracing::debug!("clearing container caches");
    self.repository.clear_caches();
  }

  // --- Builder surfaces ---

  pub fn options(&self) -> OptionsBuilder<'_> {
    OptionsBuilder { container: self }
  }

  pub fn definitions(&self) -> DefinitionsBuilder<'_> {
    DefinitionsBuilder { container: self }
  }

  pub fn registration(&self) -> RegistrationBuilder<'_> {
    RegistrationBuilder { container: self }
  }
}

/// Restores the previous scope when dropped.
pub struct ScopeGuard<'c> {
  container: &'c Container,
  previous: String,
}

impl Drop for ScopeGuard<'_> {
  fn drop(&mut self) {
    self.container.repository.set_scope(&self.previous);
  }
}

/// Chainable configuration of container-wide toggles.
pub struct OptionsBuilder<'c> {
  container: &'c Container,
}

impl OptionsBuilder<'_> {
  /// Toggles between the injected and generic invocation strategies.
  /// Switching is instantaneous; no cached state migrates.
  pub fn injection(self, on: bool) -> Self {
    self.container.repository.update_options(|o| o.injection = on);
    self
  }

  pub fn method_attributes(self, on: bool) -> Self {
    self
      .container
      .repository
      .update_options(|o| o.method_attributes = on);
    self
  }

  pub fn property_attributes(self, on: bool) -> Self {
    self
      .container
      .repository
      .update_options(|o| o.property_attributes = on);
    self
  }

  pub fn debug(self, on: bool) -> Self {
    self.container.repository.update_options(|o| o.debug = on);
    self
  }

  /// The container-wide default method, invoked when neither the call nor
  /// the registration names one.
  pub fn default_method(self, name: &str) -> Self {
    self.container.repository.set_default_method(Some(name));
    self
  }
}

/// Chainable binding of definition IDs and interface providers.
pub struct DefinitionsBuilder<'c> {
  container: &'c Container,
}

impl DefinitionsBuilder<'_> {
  pub fn bind(self, id: &str, definition: Definition) -> Self {
    tracing::debug!(id, "binding definition");
    self.container.repository.add_definition(id, definition);
    self
  }

  pub fn bind_value<T: Any + Send + Sync>(self, id: &str, payload: T) -> Self {
    self.bind(id, Definition::value(payload))
  }

  pub fn bind_factory<F>(self, id: &str, factory: F) -> Self
  where
    F: Fn(&Container) -> ContainerResult<Value> + Send + Sync + 'static,
  {
    self.bind(id, Definition::factory(factory))
  }

  pub fn bind_type<T: Any + Send + Sync>(self, id: &str) -> Self {
    self.bind(id, Definition::of_type::<T>())
  }

  pub fn alias(self, id: &str, target: &str) -> Self {
    self.bind(id, Definition::alias(target))
  }

  /// Provides an implementation for the interface `I`, consulted by
  /// auto-wiring when a parameter references `I`.
  pub fn provide_interface<I, F>(self, provider: F) -> Self
  where
    I: ?Sized + Any + Send + Sync,
    F: Fn(&Container) -> ContainerResult<Arc<I>> + Send + Sync + 'static,
  {
    self.bind_provider::<I, F>(None, provider)
  }

  /// Provides an implementation for `I` active only under `env`.
  pub fn provide_interface_for_env<I, F>(self, env: &str, provider: F) -> Self
  where
    I: ?Sized + Any + Send + Sync,
    F: Fn(&Container) -> ContainerResult<Arc<I>> + Send + Sync + 'static,
  {
    self.bind_provider::<I, F>(Some(env), provider)
  }

  fn bind_provider<I, F>(self, env: Option<&str>, provider: F) -> Self
  where
    I: ?Sized + Any + Send + Sync,
    F: Fn(&Container) -> ContainerResult<Arc<I>> + Send + Sync + 'static,
  {
    let key = TypeKey::of::<I>();
    tracing::debug!(interface = key.name(), ?env, "binding interface provider");
    let provider: ProviderFn =
      Arc::new(move |container| provider(container).map(Value::new::<Arc<I>>));
    self
      .container
      .repository
      .bind_interface(key.id, env, provider);
    self
  }
}

/// Chainable registration of blueprints and class resources.
pub struct RegistrationBuilder<'c> {
  container: &'c Container,
}

impl RegistrationBuilder<'_> {
  pub fn register(self, blueprint: Blueprint) -> Self {
    tracing::debug!(service = blueprint.key.name(), "registering blueprint");
    self.container.repository.add_blueprint(blueprint);
    self
  }

  /// Supplies constructor arguments for `T`. Replaces any previously
  /// supplied constructor arguments.
  pub fn ctor_args<T: Any>(self, args: impl IntoIterator<Item = SuppliedArg>) -> Self {
    let args: Vec<SuppliedArg> = args.into_iter().collect();
    self
      .container
      .repository
      .merge_resource(std::any::TypeId::of::<T>(), |resource| {
        resource.ctor_args = args;
      });
    self
  }

  /// Registers an explicit value for one property of `T`. Values merge per
  /// property name; the last write wins.
  pub fn property_value<T: Any>(self, name: &str, value: Value) -> Self {
    let name = name.to_owned();
    self
      .container
      .repository
      .merge_resource(std::any::TypeId::of::<T>(), |resource| {
        resource.properties.insert(name, value);
      });
    self
  }

  /// Registers the default method of `T` together with its supplied
  /// arguments.
  pub fn default_call<T: Any>(
    self,
    method: &str,
    args: impl IntoIterator<Item = SuppliedArg>,
  ) -> Self {
    let method = method.to_owned();
    let args: Vec<SuppliedArg> = args.into_iter().collect();
    self
      .container
      .repository
      .merge_resource(std::any::TypeId::of::<T>(), |resource| {
        resource.default_method = Some(method);
        resource.method_args = args;
      });
    self
  }

  /// Registers a named resolver function, invocable from attributes.
  pub fn register_function<F>(self, name: &str, function: F) -> Self
  where
    F: Fn(&Container, &[Value]) -> ContainerResult<Value> + Send + Sync + 'static,
  {
    tracing::debug!(name, "registering resolver function");
    self
      .container
      .repository
      .add_function(name, Arc::new(function));
    self
  }

  /// Registers a custom attribute resolver under `kind`.
  pub fn register_attribute<R: AttributeResolver + 'static>(self, kind: &str, resolver: R) -> Self {
    self.container.attributes.register(kind, resolver);
    self
  }

  /// Imports a service provider, letting it perform its own bindings.
  pub fn import<P: ServiceProvider>(self, provider: P) -> Self {
    provider.register(self.container);
    self
  }
}
