//! # Strand IoC
//!
//! A dynamic, thread-safe dependency-injection container for Rust.
//!
//! Strand IoC manages object graphs through declarative *blueprints*: each
//! service registers the shape of its constructor, properties and methods
//! once, and the container settles instances on demand — filling
//! parameters from supplied arguments, injection attributes, bound
//! definitions and recursive auto-wiring, in a fixed precedence order.
//!
//! ## Core Concepts
//!
//! - **Container**: the central registry and facade. Each instance owns
//!   independent state; aliased process-wide instances are available via
//!   [`instance`] and [`global`].
//! - **Blueprint**: the registration-time description of one service:
//!   parameters, constructor, properties, methods.
//! - **Definition**: a string ID bound to a value, factory, type or other
//!   ID, with a transient, singleton or scoped lifetime.
//! - **Attribute**: declarative resolution instructions attached to a
//!   parameter or property — a literal, a named resolver function, a
//!   definition lookup, or a custom kind dispatched through the
//!   [`AttributeRegistry`].
//! - **Scope**: a named partition of the instance cache, switchable at
//!   runtime; **environments** redirect interface bindings per deployment
//!   flavor.
//!
//! ## Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use strand_ioc::{global, resolve, Attribute, Blueprint, Param};
//!
//! // Define a trait and a concrete implementation.
//! trait Greeter: Send + Sync {
//!   fn greet(&self) -> String;
//! }
//!
//! struct EnglishGreeter {
//!   message: String,
//! }
//!
//! impl Greeter for EnglishGreeter {
//!   fn greet(&self) -> String {
//!     self.message.clone()
//!   }
//! }
//!
//! fn main() {
//!   // Bind a value any part of the application can reference.
//!   global()
//!     .definitions()
//!     .bind_value("greeting.message", String::from("Hello, World!"));
//!
//!   // Register the service; its parameter is filled from the definition.
//!   global().registration().register(
//!     Blueprint::of::<EnglishGreeter>()
//!       .param(Param::new("message").attribute(Attribute::lookup("greeting.message")))
//!       .constructor(|args, _| {
//!         Ok(EnglishGreeter {
//!           message: args.take_cloned::<String>("message")?,
//!         })
//!       })
//!       .build(),
//!   );
//!
//!   // Expose it behind the trait.
//!   global().definitions().provide_interface::<dyn Greeter, _>(|c| {
//!     let greeter: Arc<dyn Greeter> = c.get::<EnglishGreeter>()?;
//!     Ok(greeter)
//!   });
//!
//!   // Resolve by trait from anywhere in the application.
//!   let greeter = resolve!(trait Greeter);
//!   assert_eq!(greeter.greet(), "Hello, World!");
//! }
//! ```

mod attribute;
mod blueprint;
mod class_resolver;
mod container;
mod core;
mod definitions;
mod errors;
mod global;
mod invocation;
mod macros;
mod params;
mod properties;
mod repository;

pub use attribute::{Attribute, AttributeRegistry, AttributeResolver, AttributeTarget, TargetKind};
pub use blueprint::{
  arg, pos, Blueprint, BlueprintBuilder, Method, Param, Property, ResolvedArgs, SuppliedArg,
};
pub use container::{
  Container, DefinitionsBuilder, OptionsBuilder, RegistrationBuilder, ScopeGuard, ServiceProvider,
};
pub use self::core::{value, Lifetime, Settled, TypeKey, Value};
pub use definitions::{Definition, DefinitionSource};
pub use errors::{ContainerError, ContainerResult};
pub use global::{global, instance, remove, DEFAULT_ALIAS};
pub use invocation::Callable;
pub use repository::Options;
