use std::sync::Arc;

use strand_ioc::{global, resolve, Blueprint, Param};

// A root dependency and a service auto-wired on top of it.
struct AppConfig {
  database_url: String,
}

struct Database {
  config: Arc<AppConfig>,
}

fn main() {
  // Register the config and the database blueprint; the database's
  // constructor parameter is filled by auto-wiring.
  global().registration().register(
    Blueprint::of::<AppConfig>()
      .constructor(|_, _| {
        Ok(AppConfig {
          database_url: "postgres://localhost:5432/app".to_string(),
        })
      })
      .build(),
  );
  global().registration().register(
    Blueprint::of::<Database>()
      .param(Param::of::<AppConfig>("config"))
      .constructor(|args, _| {
        Ok(Database {
          config: args.take::<AppConfig>("config")?,
        })
      })
      .build(),
  );

  // Resolve twice; the same instance comes back both times.
  let first = resolve!(Database);
  let second = resolve!(Database);

  println!("database url: {}", first.config.database_url);
  assert!(Arc::ptr_eq(&first, &second));
  println!("both resolutions returned the same cached instance");

  // A fresh instance on demand, without touching the cache.
  let fresh = global().make::<Database>().expect("make should succeed");
  assert!(!Arc::ptr_eq(&first, &fresh));
  println!("make() produced an independent instance");
}
