//! Error taxonomy for the container.
//!
//! A single [`ContainerError`] enum covers every synchronous failure mode of
//! the resolution pipeline, per spec.md §7. All failures propagate
//! synchronously; no partially-constructed instance is ever cached.

use thiserror::Error;

/// The result type returned throughout the container API.
pub type ContainerResult<T> = Result<T, ContainerError>;

/// Every way resolution can fail.
#[derive(Error, Debug)]
pub enum ContainerError {
  /// No service, definition or binding is registered under the given ID.
  #[error("no binding registered for `{0}`")]
  NotFound(String),

  /// A dependency cycle was detected while settling the labelled service.
  #[error("circular dependency detected while resolving `{0}`")]
  CircularDependency(String),

  /// An injection attribute could not be interpreted.
  #[error("malformed attribute on `{target}`: {reason}")]
  MalformedAttribute { target: String, reason: String },

  /// A requested method is not declared on the resolved class.
  #[error("no method named `{method}` on `{class}`")]
  MethodNotFound { method: String, class: String },

  /// A resolved value did not have the expected type.
  #[error("type mismatch for `{context}`: expected `{expected}`, found `{found}`")]
  TypeMismatch {
    context: String,
    expected: &'static str,
    found: &'static str,
  },

  /// A constructor parameter could not be filled from any source.
  #[error("unresolvable parameter `{parameter}` in `{context}`")]
  UnresolvableParameter { parameter: String, context: String },

  /// A property could not be resolved for assignment.
  #[error("unresolvable property `{property}` on `{class}`")]
  UnresolvableProperty { property: String, class: String },

  /// A factory / constructor failed to produce an instance.
  #[error("factory failed for `{context}`: {message}")]
  FactoryFailed { context: String, message: String },
}
