//! Process-local storage for everything the resolvers consult.
//!
//! The repository has no resolution behavior of its own; it stores and
//! retrieves registrations, caches and container-wide state. All maps are
//! concurrent so registration and resolution can interleave freely.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;

use crate::blueprint::{Blueprint, SuppliedArg};
use crate::container::Container;
use crate::core::Value;
use crate::definitions::Definition;
use crate::errors::ContainerResult;

/// Scope key under which singleton-lifetime definitions are cached,
/// regardless of the active scope.
pub(crate) const CONTAINER_SCOPE: &str = "__container";

/// The default active scope of a fresh container.
pub(crate) const DEFAULT_SCOPE: &str = "default";

pub(crate) type ResolverFn =
  Arc<dyn Fn(&Container, &[Value]) -> ContainerResult<Value> + Send + Sync>;
pub(crate) type ProviderFn = Arc<dyn Fn(&Container) -> ContainerResult<Value> + Send + Sync>;

/// Container-wide toggles.
#[derive(Clone, Debug)]
pub struct Options {
  /// Selects the injected (reflection-style) strategy when `true`, the
  /// generic explicit-only strategy when `false`.
  pub injection: bool,
  /// Enables attribute interpretation on constructor and method parameters.
  pub method_attributes: bool,
  /// Enables attribute interpretation on properties.
  pub property_attributes: bool,
  /// Raises resolution events from `trace` to `debug` verbosity.
  pub debug: bool,
}

impl Default for Options {
  fn default() -> Self {
    Self {
      injection: true,
      method_attributes: true,
      property_attributes: true,
      debug: false,
    }
  }
}

/// Registered payloads for one class: supplied constructor arguments,
/// explicit property values and the default method with its arguments.
/// Repeated registration merges; the last write for a sub-key wins.
#[derive(Clone, Default)]
pub(crate) struct ClassResource {
  pub(crate) ctor_args: Vec<SuppliedArg>,
  pub(crate) properties: HashMap<String, Value>,
  pub(crate) default_method: Option<String>,
  pub(crate) method_args: Vec<SuppliedArg>,
}

/// Interface providers: a default plus per-environment overrides.
#[derive(Default)]
pub(crate) struct InterfaceBinding {
  pub(crate) default: Option<ProviderFn>,
  pub(crate) envs: HashMap<String, ProviderFn>,
}

#[derive(Default)]
pub(crate) struct Repository {
  blueprints: DashMap<TypeId, Arc<Blueprint>>,
  resources: DashMap<TypeId, ClassResource>,
  definitions: DashMap<String, Definition>,
  interfaces: DashMap<TypeId, InterfaceBinding>,
  env_overrides: DashMap<(String, String), String>,
  functions: DashMap<String, ResolverFn>,
  instances: DashMap<(String, TypeId), Value>,
  definition_cache: DashMap<(String, String), Value>,
  scope: RwLock<Option<String>>,
  environment: RwLock<Option<String>>,
  default_method: RwLock<Option<String>>,
  options: RwLock<Options>,
}

impl Repository {
  pub(crate) fn new() -> Self {
    Self::default()
  }

  // --- Blueprints and class resources ---

  pub(crate) fn add_blueprint(&self, blueprint: Blueprint) {
    self.blueprints.insert(blueprint.key.id, Arc::new(blueprint));
  }

  pub(crate) fn blueprint(&self, id: TypeId) -> Option<Arc<Blueprint>> {
    self.blueprints.get(&id).map(|entry| Arc::clone(entry.value()))
  }

  pub(crate) fn merge_resource(&self, id: TypeId, merge: impl FnOnce(&mut ClassResource)) {
    let mut entry = self.resources.entry(id).or_default();
    merge(entry.value_mut());
  }

  pub(crate) fn resource(&self, id: TypeId) -> ClassResource {
    self
      .resources
      .get(&id)
      .map(|entry| entry.value().clone())
      .unwrap_or_default()
  }

  // --- Definitions ---

  pub(crate) fn add_definition(&self, id: &str, definition: Definition) {
    self.definitions.insert(id.to_owned(), definition);
  }

  pub(crate) fn definition(&self, id: &str) -> Option<Definition> {
    self.definitions.get(id).map(|entry| entry.value().clone())
  }

  pub(crate) fn tagged_ids(&self, tag: &str) -> Vec<String> {
    let mut ids: Vec<String> = self
      .definitions
      .iter()
      .filter(|entry| entry.value().tags.iter().any(|t| t == tag))
      .map(|entry| entry.key().clone())
      .collect();
    ids.sort();
    ids
  }

  // --- Interface providers and environment bindings ---

  pub(crate) fn bind_interface(&self, id: TypeId, env: Option<&str>, provider: ProviderFn) {
    let mut entry = self.interfaces.entry(id).or_default();
    match env {
      Some(env) => {
        entry.value_mut().envs.insert(env.to_owned(), provider);
      }
      None => entry.value_mut().default = Some(provider),
    }
  }

  /// The provider for an interface, preferring the active environment's
  /// binding over the default one.
  pub(crate) fn interface_provider(&self, id: TypeId, env: Option<&str>) -> Option<ProviderFn> {
    let entry = self.interfaces.get(&id)?;
    if let Some(env) = env {
      if let Some(provider) = entry.value().envs.get(env) {
        return Some(Arc::clone(provider));
      }
    }
    entry.value().default.as_ref().map(Arc::clone)
  }

  pub(crate) fn add_env_override(&self, env: &str, id: &str, target: &str) {
    self
      .env_overrides
      .insert((env.to_owned(), id.to_owned()), target.to_owned());
  }

  pub(crate) fn env_override(&self, env: &str, id: &str) -> Option<String> {
    self
      .env_overrides
      .get(&(env.to_owned(), id.to_owned()))
      .map(|entry| entry.value().clone())
  }

  // --- Named resolver functions ---

  pub(crate) fn add_function(&self, name: &str, function: ResolverFn) {
    self.functions.insert(name.to_owned(), function);
  }

  pub(crate) fn function(&self, name: &str) -> Option<ResolverFn> {
    self.functions.get(name).map(|entry| Arc::clone(entry.value()))
  }

  // --- Instance and definition caches ---

  pub(crate) fn cached_instance(&self, scope: &str, id: TypeId) -> Option<Value> {
    self
      .instances
      .get(&(scope.to_owned(), id))
      .map(|entry| entry.value().clone())
  }

  pub(crate) fn cache_instance(&self, scope: String, id: TypeId, instance: Value) {
    self.instances.insert((scope, id), instance);
  }

  pub(crate) fn cached_definition(&self, scope: &str, id: &str) -> Option<Value> {
    self
      .definition_cache
      .get(&(scope.to_owned(), id.to_owned()))
      .map(|entry| entry.value().clone())
  }

  pub(crate) fn cache_definition(&self, scope: String, id: &str, value: Value) {
    self.definition_cache.insert((scope, id.to_owned()), value);
  }

  /// Drops every cached instance and definition value, keeping all
  /// registrations. Used by tests and scope resets.
  pub(crate) fn clear_caches(&self) {
    self.instances.clear();
    self.definition_cache.clear();
  }

  // --- Container-wide state ---

  pub(crate) fn scope(&self) -> String {
    self
      .scope
      .read()
      .clone()
      .unwrap_or_else(|| DEFAULT_SCOPE.to_owned())
  }

  pub(crate) fn set_scope(&self, name: &str) {
    *self.scope.write() = Some(name.to_owned());
  }

  pub(crate) fn environment(&self) -> Option<String> {
    self.environment.read().clone()
  }

  pub(crate) fn set_environment(&self, env: Option<&str>) {
    *self.environment.write() = env.map(str::to_owned);
  }

  pub(crate) fn default_method(&self) -> Option<String> {
    self.default_method.read().clone()
  }

  pub(crate) fn set_default_method(&self, name: Option<&str>) {
    *self.default_method.write() = name.map(str::to_owned);
  }

  pub(crate) fn options(&self) -> Options {
    self.options.read().clone()
  }

  pub(crate) fn update_options(&self, update: impl FnOnce(&mut Options)) {
    update(&mut self.options.write());
  }
}
