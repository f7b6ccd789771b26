//! The two invocation strategies.
//!
//! `InjectedCall` runs the full resolution pipeline: attributes,
//! auto-wiring, cycle detection. `GenericCall` instantiates exclusively
//! from pre-registered and supplied argument arrays plus declared
//! defaults, with no attribute interpretation, no auto-wiring and no
//! cycle guard (nothing recurses). Both consult the same repository, so
//! switching strategies migrates no state.

use std::sync::Arc;

use crate::blueprint::{Param, ResolvedArgs, SuppliedArg};
use crate::class_resolver::ClassResolver;
use crate::container::Container;
use crate::core::{Settled, TypeKey, Value};
use crate::errors::ContainerResult;
use crate::params::{ParamMode, ParameterResolver};
use crate::repository::Options;

/// Distinguishes the two strategies inside the shared pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ResolutionMode {
  Injected,
  Generic,
}

impl ResolutionMode {
  pub(crate) fn param_mode(self, options: &Options) -> ParamMode {
    match self {
      ResolutionMode::Injected => ParamMode {
        attributes: options.method_attributes,
        autowire: true,
      },
      ResolutionMode::Generic => ParamMode {
        attributes: false,
        autowire: false,
      },
    }
  }
}

/// A standalone callable settled through the container: a closure plus the
/// parameter list describing its signature.
pub struct Callable {
  pub(crate) label: String,
  pub(crate) params: Vec<Param>,
  pub(crate) body: Arc<dyn Fn(&mut ResolvedArgs, &Container) -> ContainerResult<Value> + Send + Sync>,
}

impl Callable {
  pub fn new<F>(label: &str, body: F) -> Self
  where
    F: Fn(&mut ResolvedArgs, &Container) -> ContainerResult<Value> + Send + Sync + 'static,
  {
    Self {
      label: label.to_owned(),
      params: Vec::new(),
      body: Arc::new(body),
    }
  }

  pub fn param(mut self, param: Param) -> Self {
    self.params.push(param);
    self
  }
}

/// The common external contract of both strategies.
pub(crate) trait CallStrategy: Send + Sync {
  fn class_settler(
    &self,
    container: &Container,
    key: TypeKey,
    method: Option<&str>,
    make: bool,
  ) -> ContainerResult<Settled>;

  fn closure_settler(
    &self,
    container: &Container,
    callable: &Callable,
    supplied: &[SuppliedArg],
  ) -> ContainerResult<Value>;
}

pub(crate) struct InjectedCall;

impl CallStrategy for InjectedCall {
  fn class_settler(
    &self,
    container: &Container,
    key: TypeKey,
    method: Option<&str>,
    make: bool,
  ) -> ContainerResult<Settled> {
    ClassResolver::resolve(container, key, method, make, ResolutionMode::Injected)
  }

  fn closure_settler(
    &self,
    container: &Container,
    callable: &Callable,
    supplied: &[SuppliedArg],
  ) -> ContainerResult<Value> {
    let options = container.repository().options();
    let mode = ResolutionMode::Injected.param_mode(&options);
    let mut args =
      ParameterResolver::resolve(container, &callable.params, supplied, &callable.label, mode)?;
    (callable.body)(&mut args, container)
  }
}

pub(crate) struct GenericCall;

impl CallStrategy for GenericCall {
  fn class_settler(
    &self,
    container: &Container,
    key: TypeKey,
    method: Option<&str>,
    make: bool,
  ) -> ContainerResult<Settled> {
    ClassResolver::resolve(container, key, method, make, ResolutionMode::Generic)
  }

  fn closure_settler(
    &self,
    container: &Container,
    callable: &Callable,
    supplied: &[SuppliedArg],
  ) -> ContainerResult<Value> {
    let options = container.repository().options();
    let mode = ResolutionMode::Generic.param_mode(&options);
    let mut args =
      ParameterResolver::resolve(container, &callable.params, supplied, &callable.label, mode)?;
    (callable.body)(&mut args, container)
  }
}
