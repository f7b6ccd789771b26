//! Declarative service blueprints.
//!
//! A [`Blueprint`] is the registration-time description of how a service is
//! built: its ordered constructor parameters, its properties, its named
//! methods and the assemble closure that turns a resolved argument set into
//! the concrete value. Blueprints stand in for the reflected class metadata
//! of dynamic languages; the container interprets them instead of scanning
//! anything at runtime.

use std::any::Any;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::attribute::Attribute;
use crate::container::Container;
use crate::core::{TypeKey, Value};
use crate::errors::{ContainerError, ContainerResult};

pub(crate) type AssembleFn =
  Arc<dyn Fn(&mut ResolvedArgs, &Container) -> ContainerResult<Box<dyn Any + Send + Sync>> + Send + Sync>;
pub(crate) type MethodFn = Arc<
  dyn Fn(&(dyn Any + Send + Sync), &mut ResolvedArgs, &Container) -> ContainerResult<Value>
    + Send
    + Sync,
>;
pub(crate) type InstanceSetter =
  Arc<dyn Fn(&mut (dyn Any + Send + Sync), Value) -> ContainerResult<()> + Send + Sync>;
pub(crate) type StaticSetter = Arc<dyn Fn(Value) -> ContainerResult<()> + Send + Sync>;
type DefaultFn = Arc<dyn Fn() -> Value + Send + Sync>;

/// The ordered argument set produced by parameter resolution, consumed by
/// assemble and method closures.
pub struct ResolvedArgs {
  context: String,
  by_name: HashMap<&'static str, Value>,
  variadic: Vec<Value>,
}

impl ResolvedArgs {
  pub(crate) fn new(context: impl Into<String>) -> Self {
    Self {
      context: context.into(),
      by_name: HashMap::new(),
      variadic: Vec::new(),
    }
  }

  pub(crate) fn insert(&mut self, name: &'static str, value: Value) {
    self.by_name.insert(name, value);
  }

  pub(crate) fn set_variadic(&mut self, values: Vec<Value>) {
    self.variadic = values;
  }

  /// Removes the raw value resolved for `name`.
  pub fn take_value(&mut self, name: &str) -> ContainerResult<Value> {
    self
      .by_name
      .remove(name)
      .ok_or_else(|| ContainerError::UnresolvableParameter {
        parameter: name.to_owned(),
        context: self.context.clone(),
      })
  }

  /// Removes the value resolved for `name`, shared as `Arc<T>`.
  pub fn take<T: Any + Send + Sync>(&mut self, name: &str) -> ContainerResult<Arc<T>> {
    let value = self.take_value(name)?;
    let found = value.type_name();
    value
      .downcast::<T>()
      .ok_or_else(|| ContainerError::TypeMismatch {
        context: format!("{}::{}", self.context, name),
        expected: std::any::type_name::<T>(),
        found,
      })
  }

  /// Removes the value resolved for `name` and clones the payload out.
  pub fn take_cloned<T: Any + Send + Sync + Clone>(&mut self, name: &str) -> ContainerResult<T> {
    self.take::<T>(name).map(|payload| (*payload).clone())
  }

  /// Removes a bound interface value resolved for `name` as `Arc<I>`.
  pub fn take_trait<I: ?Sized + Any + Send + Sync>(&mut self, name: &str) -> ContainerResult<Arc<I>> {
    let value = self.take_value(name)?;
    let found = value.type_name();
    value
      .downcast::<Arc<I>>()
      .map(|outer| (*outer).clone())
      .ok_or_else(|| ContainerError::TypeMismatch {
        context: format!("{}::{}", self.context, name),
        expected: std::any::type_name::<Arc<I>>(),
        found,
      })
  }

  /// The values packed into the variadic slot, in their original order.
  pub fn variadic(&self) -> &[Value] {
    &self.variadic
  }

  pub fn take_variadic(&mut self) -> Vec<Value> {
    std::mem::take(&mut self.variadic)
  }

  /// Clones every variadic payload out as `T`.
  pub fn variadic_cloned<T: Any + Send + Sync + Clone>(&mut self) -> ContainerResult<Vec<T>> {
    self
      .take_variadic()
      .into_iter()
      .map(|v| {
        let found = v.type_name();
        v.cloned::<T>().ok_or(ContainerError::TypeMismatch {
          context: format!("{}::...", self.context),
          expected: std::any::type_name::<T>(),
          found,
        })
      })
      .collect()
  }
}

/// An explicitly supplied argument: named (associative) or positional.
#[derive(Clone, Debug)]
pub struct SuppliedArg {
  pub(crate) name: Option<String>,
  pub(crate) value: Value,
}

/// A named supplied argument.
pub fn arg(name: &str, value: Value) -> SuppliedArg {
  SuppliedArg {
    name: Some(name.to_owned()),
    value,
  }
}

/// A positional supplied argument.
pub fn pos(value: Value) -> SuppliedArg {
  SuppliedArg { name: None, value }
}

/// One constructor or method parameter.
#[derive(Clone)]
pub struct Param {
  pub(crate) name: &'static str,
  pub(crate) type_ref: Option<TypeKey>,
  pub(crate) attribute: Option<Attribute>,
  pub(crate) default: Option<DefaultFn>,
  pub(crate) variadic: bool,
}

impl Param {
  /// A plain parameter with no type reference.
  pub fn new(name: &'static str) -> Self {
    Self {
      name,
      type_ref: None,
      attribute: None,
      default: None,
      variadic: false,
    }
  }

  /// A parameter referencing a class or interface type, eligible for
  /// auto-wiring.
  pub fn of<T: ?Sized + Any>(name: &'static str) -> Self {
    Self {
      type_ref: Some(TypeKey::of::<T>()),
      ..Self::new(name)
    }
  }

  pub fn attribute(mut self, attribute: Attribute) -> Self {
    self.attribute = Some(attribute);
    self
  }

  pub fn default<T, F>(mut self, default: F) -> Self
  where
    T: Any + Send + Sync,
    F: Fn() -> T + Send + Sync + 'static,
  {
    self.default = Some(Arc::new(move || Value::new(default())));
    self
  }

  /// Marks this parameter as the variadic slot; leftover positional values
  /// are packed into it.
  pub fn variadic(mut self) -> Self {
    self.variadic = true;
    self
  }
}

/// Assignment target of a property: a field of the instance under
/// construction, or a static slot outside it.
#[derive(Clone)]
pub(crate) enum PropertyTarget {
  Instance(InstanceSetter),
  Static(StaticSetter),
}

/// One declared property of a blueprint.
#[derive(Clone)]
pub struct Property {
  pub(crate) name: &'static str,
  pub(crate) type_ref: Option<TypeKey>,
  pub(crate) attribute: Option<Attribute>,
  pub(crate) target: PropertyTarget,
}

impl Property {
  /// A property assigned on the instance before it is shared. The setter
  /// receives exclusive access to the not-yet-published instance.
  pub fn instance<T, F>(name: &'static str, setter: F) -> Self
  where
    T: Any,
    F: Fn(&mut T, Value) -> ContainerResult<()> + Send + Sync + 'static,
  {
    let setter: InstanceSetter = Arc::new(move |payload, value| {
      let typed = payload
        .downcast_mut::<T>()
        .ok_or_else(|| ContainerError::TypeMismatch {
          context: format!("property `{name}`"),
          expected: std::any::type_name::<T>(),
          found: "foreign instance",
        })?;
      setter(typed, value)
    });
    Self {
      name,
      type_ref: None,
      attribute: None,
      target: PropertyTarget::Instance(setter),
    }
  }

  /// A property assigned through a static slot rather than the instance.
  pub fn static_slot<F>(name: &'static str, setter: F) -> Self
  where
    F: Fn(Value) -> ContainerResult<()> + Send + Sync + 'static,
  {
    Self {
      name,
      type_ref: None,
      attribute: None,
      target: PropertyTarget::Static(Arc::new(setter)),
    }
  }

  pub fn attribute(mut self, attribute: Attribute) -> Self {
    self.attribute = Some(attribute);
    self
  }

  /// References a type to auto-wire when the attribute declines (or is
  /// absent while an explicit value is registered for another target).
  pub fn wired<T: ?Sized + Any>(mut self) -> Self {
    self.type_ref = Some(TypeKey::of::<T>());
    self
  }
}

/// A named method declared on a blueprint.
#[derive(Clone)]
pub struct Method {
  pub(crate) name: &'static str,
  pub(crate) params: Vec<Param>,
  pub(crate) body: MethodFn,
}

impl Method {
  pub fn new<T, F>(name: &'static str, body: F) -> Self
  where
    T: Any,
    F: Fn(&T, &mut ResolvedArgs, &Container) -> ContainerResult<Value> + Send + Sync + 'static,
  {
    let body: MethodFn = Arc::new(move |receiver, args, container| {
      let typed = receiver
        .downcast_ref::<T>()
        .ok_or_else(|| ContainerError::TypeMismatch {
          context: format!("method `{name}`"),
          expected: std::any::type_name::<T>(),
          found: "foreign instance",
        })?;
      body(typed, args, container)
    });
    Self {
      name,
      params: Vec::new(),
      body,
    }
  }

  pub fn param(mut self, param: Param) -> Self {
    self.params.push(param);
    self
  }
}

/// The full registration-time description of one service.
#[derive(Clone)]
pub struct Blueprint {
  pub(crate) key: TypeKey,
  pub(crate) params: Vec<Param>,
  pub(crate) assemble: AssembleFn,
  pub(crate) properties: Vec<Property>,
  pub(crate) methods: HashMap<&'static str, Method>,
  pub(crate) default_method: Option<&'static str>,
}

impl Blueprint {
  /// Starts a blueprint for the concrete type `T`.
  pub fn of<T: Any + Send + Sync>() -> BlueprintBuilder<T> {
    BlueprintBuilder {
      key: TypeKey::of::<T>(),
      params: Vec::new(),
      assemble: None,
      properties: Vec::new(),
      methods: HashMap::new(),
      default_method: None,
      _marker: PhantomData,
    }
  }
}

pub struct BlueprintBuilder<T> {
  key: TypeKey,
  params: Vec<Param>,
  assemble: Option<AssembleFn>,
  properties: Vec<Property>,
  methods: HashMap<&'static str, Method>,
  default_method: Option<&'static str>,
  _marker: PhantomData<fn() -> T>,
}

impl<T: Any + Send + Sync> BlueprintBuilder<T> {
  /// Appends a constructor parameter. Declaration order matters for
  /// positional matching and variadic packing.
  pub fn param(mut self, param: Param) -> Self {
    self.params.push(param);
    self
  }

  /// The closure that builds the value from the resolved argument set.
  pub fn constructor<F>(mut self, constructor: F) -> Self
  where
    F: Fn(&mut ResolvedArgs, &Container) -> ContainerResult<T> + Send + Sync + 'static,
  {
    self.assemble = Some(Arc::new(move |args, container| {
      constructor(args, container).map(|built| Box::new(built) as Box<dyn Any + Send + Sync>)
    }));
    self
  }

  pub fn property(mut self, property: Property) -> Self {
    self.properties.push(property);
    self
  }

  pub fn method(mut self, method: Method) -> Self {
    self.methods.insert(method.name, method);
    self
  }

  /// The method invoked when a settling call names none explicitly.
  pub fn default_method(mut self, name: &'static str) -> Self {
    self.default_method = Some(name);
    self
  }

  pub fn build(self) -> Blueprint {
    let key = self.key;
    let assemble = self.assemble.unwrap_or_else(|| {
      Arc::new(move |_args, _container| {
        Err(ContainerError::FactoryFailed {
          context: key.name().to_owned(),
          message: "blueprint declares no constructor".to_owned(),
        })
      })
    });
    Blueprint {
      key,
      params: self.params,
      assemble,
      properties: self.properties,
      methods: self.methods,
      default_method: self.default_method,
    }
  }
}
