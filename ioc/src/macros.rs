//! Public macros for ergonomic service resolution.

/// Resolves a service from the global container.
///
/// This macro is the primary way to get dependencies in application code.
/// It panics if the requested service cannot be resolved, ensuring that
/// all required dependencies are present at runtime.
///
/// # Panics
///
/// Panics when resolution fails. For a fallible version, use
/// `global().get(...)` directly.
///
/// # Examples
///
/// ```
/// use strand_ioc::{global, resolve, Blueprint};
///
/// struct Motd(&'static str);
///
/// global()
///   .registration()
///   .register(Blueprint::of::<Motd>().constructor(|_, _| Ok(Motd("hi"))).build());
///
/// let motd = resolve!(Motd);
/// assert_eq!(motd.0, "hi");
/// ```
#[macro_export]
macro_rules! resolve {
  // Arm for resolving a concrete type: resolve!(MyService)
  ($type:ty) => {
    $crate::global().get::<$type>().unwrap_or_else(|err| {
      panic!(
        "Failed to resolve required service `{}`: {}",
        std::any::type_name::<$type>(),
        err
      )
    })
  };

  // Arm for resolving a bound interface: resolve!(trait MyTrait)
  // `:ident` captures the trait's name; `dyn Trait` is constructed inside
  // the expansion.
  (trait $trait_ident:ident) => {
    $crate::global()
      .get_trait::<dyn $trait_ident>()
      .unwrap_or_else(|err| {
        panic!(
          "Failed to resolve required trait service `{}`: {}",
          std::any::type_name::<dyn $trait_ident>(),
          err
        )
      })
  };
}

/// Resolves a definition ID from the global container, panicking when the
/// definition is missing or fails to resolve.
#[macro_export]
macro_rules! lookup {
  ($id:expr) => {
    $crate::global()
      .lookup($id)
      .unwrap_or_else(|err| panic!("Failed to resolve definition `{}`: {}", $id, err))
  };
}
