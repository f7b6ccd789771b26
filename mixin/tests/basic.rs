use strand_mixin::{value, MixRegistry, MixinError};

// --- Test Fixtures ---

struct Invoice {
  number: u32,
  total_cents: u64,
}

fn registry_with_render() -> MixRegistry<Invoice> {
  let mixins: MixRegistry<Invoice> = MixRegistry::new();
  mixins.mix("render", |invoice, _| {
    Some(value(format!("invoice #{}", invoice.number)))
  });
  mixins
}

// --- Tests ---

#[test]
fn test_dispatch_by_name() {
  // Arrange
  let mixins = registry_with_render();
  let invoice = Invoice {
    number: 7,
    total_cents: 0,
  };

  // Act
  let rendered = mixins.call(&invoice, "render", &[]).unwrap();

  // Assert
  let rendered = rendered.and_then(|v| v.downcast_ref::<String>().cloned());
  assert_eq!(rendered.as_deref(), Some("invoice #7"));
}

#[test]
fn test_arguments_are_passed_through() {
  // Arrange
  let mixins: MixRegistry<Invoice> = MixRegistry::new();
  mixins.mix("add", |invoice, args| {
    let amount = args
      .first()
      .and_then(|v| v.downcast_ref::<u64>())
      .copied()
      .unwrap_or(0);
    Some(value(invoice.total_cents + amount))
  });
  let invoice = Invoice {
    number: 1,
    total_cents: 100,
  };

  // Act
  let sum = mixins.call(&invoice, "add", &[value(25_u64)]).unwrap();

  // Assert
  assert_eq!(
    sum.and_then(|v| v.downcast_ref::<u64>().copied()),
    Some(125)
  );
}

#[test]
fn test_unknown_method_errors() {
  // Arrange
  let mixins = registry_with_render();
  let invoice = Invoice {
    number: 1,
    total_cents: 0,
  };

  // Act
  let result = mixins.call(&invoice, "explode", &[]);

  // Assert
  assert_eq!(
    result.unwrap_err(),
    MixinError::UnknownMethod {
      method: "explode".to_string()
    }
  );
}

#[test]
fn test_none_return_yields_receiver_for_chaining() {
  // Arrange: a side-effecting method with no return value of its own.
  use std::sync::atomic::{AtomicUsize, Ordering};
  static TOUCHES: AtomicUsize = AtomicUsize::new(0);

  let mixins: MixRegistry<Invoice> = MixRegistry::new();
  mixins.mix("touch", |_, _| {
    TOUCHES.fetch_add(1, Ordering::SeqCst);
    None
  });
  let invoice = Invoice {
    number: 1,
    total_cents: 0,
  };

  // Act: a None result signals "keep chaining on the receiver".
  let outcome = mixins.call(&invoice, "touch", &[]).unwrap();

  // Assert
  assert!(outcome.is_none());
  assert_eq!(TOUCHES.load(Ordering::SeqCst), 1);
}

#[test]
fn test_mix_from_imports_and_overwrites() {
  // Arrange
  let base = registry_with_render();
  let extra: MixRegistry<Invoice> = MixRegistry::new();
  extra.mix("render", |invoice, _| {
    Some(value(format!("INVOICE {:04}", invoice.number)))
  });
  extra.mix("void", |_, _| None);

  // Act
  base.mix_from(&extra);

  // Assert
  assert_eq!(base.names(), vec!["render".to_string(), "void".to_string()]);
  let invoice = Invoice {
    number: 9,
    total_cents: 0,
  };
  let rendered = base.call(&invoice, "render", &[]).unwrap();
  assert_eq!(
    rendered.and_then(|v| v.downcast_ref::<String>().cloned()),
    Some("INVOICE 0009".to_string())
  );
}

#[test]
fn test_last_registration_wins() {
  // Arrange
  let mixins = registry_with_render();
  mixins.mix("render", |_, _| Some(value(String::from("overwritten"))));
  let invoice = Invoice {
    number: 3,
    total_cents: 0,
  };

  // Act
  let rendered = mixins.call(&invoice, "render", &[]).unwrap();

  // Assert
  assert_eq!(
    rendered.and_then(|v| v.downcast_ref::<String>().cloned()),
    Some("overwritten".to_string())
  );
}
