//! Property resolution: assigns declared properties after construction,
//! before the instance is published.

use std::any::Any;
use std::collections::HashSet;

use crate::attribute::{resolve_attribute, TargetKind};
use crate::blueprint::{Blueprint, Property, PropertyTarget};
use crate::container::Container;
use crate::core::Value;
use crate::errors::{ContainerError, ContainerResult};
use crate::repository::ClassResource;

pub(crate) struct PropertyResolver;

impl PropertyResolver {
  /// Applies every declared property that has an explicit registered value
  /// or carries an attribute. Explicit values win over attribute-derived
  /// ones. Instance targets are assigned directly on the instance under
  /// construction; static targets go through their slot closure. When one
  /// name is declared with both targets, the instance target wins and the
  /// static duplicate is skipped.
  pub(crate) fn apply(
    container: &Container,
    blueprint: &Blueprint,
    instance: &mut (dyn Any + Send + Sync),
    resource: &ClassResource,
    attributes: bool,
  ) -> ContainerResult<()> {
    let class = blueprint.key.name();

    let instance_names: HashSet<&'static str> = blueprint
      .properties
      .iter()
      .filter(|p| matches!(p.target, PropertyTarget::Instance(_)))
      .map(|p| p.name)
      .collect();

    for property in &blueprint.properties {
      if matches!(property.target, PropertyTarget::Static(_))
        && instance_names.contains(property.name)
      {
        tracing::trace!(class, property = property.name, "skipping static duplicate");
        continue;
      }

      if let Some(explicit) = resource.properties.get(property.name) {
        Self::assign(instance, property, explicit.clone())?;
        continue;
      }

      let Some(attribute) = &property.attribute else {
        continue;
      };
      if !attributes {
        continue;
      }

      let resolved =
        resolve_attribute(container, attribute, TargetKind::Property, class, property.name)?;
      let value = match resolved {
        Some(value) => value,
        None => match property.type_ref {
          Some(key) => container.resolve_type_key(key)?,
          None => {
            return Err(ContainerError::UnresolvableProperty {
              property: property.name.to_owned(),
              class: class.to_owned(),
            })
          }
        },
      };
      Self::assign(instance, property, value)?;
    }
    Ok(())
  }

  fn assign(
    instance: &mut (dyn Any + Send + Sync),
    property: &Property,
    value: Value,
  ) -> ContainerResult<()> {
    match &property.target {
      PropertyTarget::Instance(setter) => setter(instance, value),
      PropertyTarget::Static(setter) => setter(value),
    }
  }
}
