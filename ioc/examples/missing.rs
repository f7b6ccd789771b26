use strand_ioc::{global, resolve, ContainerError};

struct UnregisteredService;

fn main() {
  // --- Using the panicking `resolve!` macro ---
  println!("Attempting to resolve a service that was never registered...");

  let result = std::panic::catch_unwind(|| {
    // This line will panic!
    let _service = resolve!(UnregisteredService);
  });

  assert!(result.is_err(), "resolve! should have panicked.");
  println!("Successfully caught the expected panic from resolve!.");

  // --- Using the fallible `get()` method ---
  println!("\nNow, attempting to resolve using the fallible `get()` method...");

  match global().get::<UnregisteredService>() {
    Ok(_) => panic!("Should not have found the service!"),
    Err(ContainerError::NotFound(name)) => {
      println!("Correctly received NotFound for `{name}`.");
    }
    Err(other) => panic!("Unexpected error: {other}"),
  }
}
