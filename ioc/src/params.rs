//! Parameter resolution: turns a parameter list plus supplied arguments
//! into the concrete argument set for a constructor or method.

use std::collections::{HashMap, VecDeque};

use crate::attribute::{resolve_attribute, TargetKind};
use crate::blueprint::{Param, ResolvedArgs, SuppliedArg};
use crate::container::Container;
use crate::core::Value;
use crate::errors::{ContainerError, ContainerResult};

/// Which resolution strategies are active for a parameter pass.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ParamMode {
  /// Interpret injection attributes.
  pub(crate) attributes: bool,
  /// Recurse into class resolution for type-referenced parameters.
  pub(crate) autowire: bool,
}

pub(crate) struct ParameterResolver;

impl ParameterResolver {
  /// Resolves each parameter in declaration order, first match wins:
  /// named supplied value, positional supplied value, attribute,
  /// auto-wiring, declared default. A variadic parameter swallows the
  /// remaining positional values; without one, leftovers are discarded.
  pub(crate) fn resolve(
    container: &Container,
    params: &[Param],
    supplied: &[SuppliedArg],
    context: &str,
    mode: ParamMode,
  ) -> ContainerResult<ResolvedArgs> {
    let mut named: HashMap<String, Value> = HashMap::new();
    let mut positional: VecDeque<Value> = VecDeque::new();
    for argument in supplied {
      match &argument.name {
        Some(name) => {
          // Last write wins for repeated names, matching registration.
          named.insert(name.clone(), argument.value.clone());
        }
        None => positional.push_back(argument.value.clone()),
      }
    }

    let mut resolved = ResolvedArgs::new(context);
    let mut variadic_slot: Option<&Param> = None;

    for param in params {
      if param.variadic {
        variadic_slot = Some(param);
        continue;
      }
      let value =
        Self::resolve_one(container, param, &mut named, &mut positional, context, mode)?;
      resolved.insert(param.name, value);
    }

    if variadic_slot.is_some() {
      resolved.set_variadic(positional.drain(..).collect());
    } else if !positional.is_empty() || !named.is_empty() {
      // Documented policy: excess supplied arguments are ignored, not
      // errors.
      tracing::trace!(
        context,
        excess = positional.len() + named.len(),
        "discarding supplied arguments with no matching slot"
      );
    }

    Ok(resolved)
  }

  fn resolve_one(
    container: &Container,
    param: &Param,
    named: &mut HashMap<String, Value>,
    positional: &mut VecDeque<Value>,
    context: &str,
    mode: ParamMode,
  ) -> ContainerResult<Value> {
    // 1. Supplied by name.
    if let Some(value) = named.remove(param.name) {
      return Ok(value);
    }

    // 2. Supplied by position. A type-referenced parameter only consumes
    // the head of the pool when the payload type matches the reference;
    // otherwise the value is left for a later slot and the parameter
    // auto-wires instead.
    let head_matches = positional
      .front()
      .map(|front| match param.type_ref {
        None => true,
        Some(key) => front.payload_type() == key.id,
      })
      .unwrap_or(false);
    if head_matches {
      if let Some(value) = positional.pop_front() {
        return Ok(value);
      }
    }

    // 3. Injection attribute; a declined custom attribute falls through.
    if mode.attributes {
      if let Some(attribute) = &param.attribute {
        if let Some(value) =
          resolve_attribute(container, attribute, TargetKind::Parameter, context, param.name)?
        {
          return Ok(value);
        }
      }
    }

    // 4. Auto-wiring from the type reference.
    if mode.autowire {
      if let Some(key) = param.type_ref {
        match container.resolve_type_key(key) {
          Ok(value) => return Ok(value),
          // An unregistered type falls back to the declared default when
          // one exists; every other failure propagates.
          Err(ContainerError::NotFound(_)) if param.default.is_some() => {}
          Err(err) => return Err(err),
        }
      }
    }

    // 6. Declared default.
    if let Some(default) = &param.default {
      return Ok(default());
    }

    Err(ContainerError::UnresolvableParameter {
      parameter: param.name.to_owned(),
      context: context.to_owned(),
    })
  }
}
