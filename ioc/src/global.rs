//! Process-wide container instances, keyed by alias.
//!
//! Aliased containers are long-lived by design: created on first access,
//! never torn down implicitly, removable explicitly so tests can isolate
//! state between cases.

use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::Lazy;

use crate::container::Container;

static CONTAINERS: Lazy<DashMap<String, Arc<Container>>> = Lazy::new(DashMap::new);

/// The alias used by [`global`].
pub const DEFAULT_ALIAS: &str = "default";

/// Returns the container registered under `alias`, creating it on first
/// access.
///
/// # Examples
///
/// ```
/// use strand_ioc::instance;
///
/// let request = instance("request-7");
/// request.definitions().bind_value("request.id", 7_u64);
/// assert_eq!(request.lookup("request.id").unwrap().cloned::<u64>(), Some(7));
/// ```
pub fn instance(alias: &str) -> Arc<Container> {
  CONTAINERS
    .entry(alias.to_owned())
    .or_insert_with(|| Arc::new(Container::new()))
    .clone()
}

/// The default process-wide container.
pub fn global() -> Arc<Container> {
  instance(DEFAULT_ALIAS)
}

/// Drops the container registered under `alias`, if any. The next
/// [`instance`] call for the alias starts from an empty container.
pub fn remove(alias: &str) {
  CONTAINERS.remove(alias);
}
