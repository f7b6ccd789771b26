//! Parameter and property resolution order, attribute handling and the
//! documented leftover-discard policy.

use std::sync::{Arc, Mutex};

use pretty_assertions::assert_eq;
use strand_ioc::{
  arg, pos, value, Attribute, AttributeTarget, Blueprint, Container, ContainerError,
  ContainerResult, Method, Param, Property, Value,
};

// --- Test Fixtures ---

struct ClassB {
  tag: &'static str,
}

fn register_class_b(container: &Container) {
  container.registration().register(
    Blueprint::of::<ClassB>()
      .constructor(|_, _| Ok(ClassB { tag: "wired" }))
      .build(),
  );
}

// --- Parameter Precedence ---

#[test]
fn test_explicit_registered_value_beats_attribute() {
  // A parameter carrying an injection attribute still yields the
  // explicitly registered value.
  struct Repo {
    db_s: String,
  }

  // Arrange
  let container = Container::new();
  container
    .definitions()
    .bind_value("db.suffix", String::from("from-attribute"));
  container.registration().register(
    Blueprint::of::<Repo>()
      .param(Param::new("dbS").attribute(Attribute::lookup("db.suffix")))
      .constructor(|args, _| {
        Ok(Repo {
          db_s: args.take_cloned::<String>("dbS")?,
        })
      })
      .build(),
  );
  container
    .registration()
    .ctor_args::<Repo>([arg("dbS", value(String::from("ghi")))]);

  // Act
  let repo = container.get::<Repo>().unwrap();

  // Assert
  assert_eq!(repo.db_s, "ghi");
}

#[test]
fn test_variadic_packing() {
  // Signature: (ClassB b, parameterA, #[attr] parameterB, ...parameterC)
  // Supplied: ["abc", "def", parameterB => "ghi", "jkl"]
  struct VariadicSvc {
    b: Arc<ClassB>,
    parameter_a: String,
    parameter_b: String,
    parameter_c: Vec<String>,
  }

  // Arrange
  let container = Container::new();
  register_class_b(&container);
  container
    .definitions()
    .bind_value("unused.fallback", String::from("attribute-value"));
  container.registration().register(
    Blueprint::of::<VariadicSvc>()
      .param(Param::of::<ClassB>("b"))
      .param(Param::new("parameterA"))
      .param(Param::new("parameterB").attribute(Attribute::lookup("unused.fallback")))
      .param(Param::new("parameterC").variadic())
      .constructor(|args, _| {
        Ok(VariadicSvc {
          b: args.take::<ClassB>("b")?,
          parameter_a: args.take_cloned::<String>("parameterA")?,
          parameter_b: args.take_cloned::<String>("parameterB")?,
          parameter_c: args.variadic_cloned::<String>()?,
        })
      })
      .build(),
  );
  container.registration().ctor_args::<VariadicSvc>([
    pos(value(String::from("abc"))),
    pos(value(String::from("def"))),
    arg("parameterB", value(String::from("ghi"))),
    pos(value(String::from("jkl"))),
  ]);

  // Act
  let svc = container.get::<VariadicSvc>().unwrap();

  // Assert
  assert_eq!(svc.b.tag, "wired");
  assert_eq!(svc.parameter_a, "abc");
  // The named match wins over the attribute.
  assert_eq!(svc.parameter_b, "ghi");
  // Leftover positional values land in the variadic slot, in order.
  assert_eq!(svc.parameter_c, vec!["def".to_string(), "jkl".to_string()]);
}

#[test]
fn test_leftover_arguments_are_discarded() {
  // Supplying more positional arguments than the signature accepts is not
  // an error; the excess is ignored.
  struct Narrow {
    only: String,
  }

  // Arrange
  let container = Container::new();
  container.registration().register(
    Blueprint::of::<Narrow>()
      .param(Param::new("only"))
      .constructor(|args, _| {
        Ok(Narrow {
          only: args.take_cloned::<String>("only")?,
        })
      })
      .build(),
  );
  container.registration().ctor_args::<Narrow>([
    pos(value(String::from("kept"))),
    pos(value(String::from("extra-1"))),
    pos(value(String::from("extra-2"))),
    arg("stray", value(String::from("extra-3"))),
  ]);

  // Act
  let narrow = container.get::<Narrow>().unwrap();

  // Assert
  assert_eq!(narrow.only, "kept");
}

#[test]
fn test_unresolvable_parameter_errors() {
  struct Needy {
    _missing: String,
  }

  // Arrange
  let container = Container::new();
  container.registration().register(
    Blueprint::of::<Needy>()
      .param(Param::new("missing"))
      .constructor(|args, _| {
        Ok(Needy {
          _missing: args.take_cloned::<String>("missing")?,
        })
      })
      .build(),
  );

  // Act
  let result = container.get::<Needy>();

  // Assert
  assert!(matches!(
    result,
    Err(ContainerError::UnresolvableParameter { parameter, .. }) if parameter == "missing"
  ));
}

#[test]
fn test_default_value_is_last_resort() {
  struct WithDefault {
    retries: u32,
  }

  // Arrange
  let container = Container::new();
  container.registration().register(
    Blueprint::of::<WithDefault>()
      .param(Param::new("retries").default(|| 3_u32))
      .constructor(|args, _| {
        Ok(WithDefault {
          retries: args.take_cloned::<u32>("retries")?,
        })
      })
      .build(),
  );

  // Act
  let fallback = container.make::<WithDefault>().unwrap();
  container
    .registration()
    .ctor_args::<WithDefault>([arg("retries", value(9_u32))]);
  let supplied = container.make::<WithDefault>().unwrap();

  // Assert
  assert_eq!(fallback.retries, 3);
  assert_eq!(supplied.retries, 9);
}

// --- Attributes ---

#[test]
fn test_attribute_literal_payload() {
  struct Fixed {
    label: String,
  }

  // Arrange
  let container = Container::new();
  container.registration().register(
    Blueprint::of::<Fixed>()
      .param(Param::new("label").attribute(Attribute::literal(String::from("pinned"))))
      .constructor(|args, _| {
        Ok(Fixed {
          label: args.take_cloned::<String>("label")?,
        })
      })
      .build(),
  );

  // Act
  let fixed = container.get::<Fixed>().unwrap();

  // Assert
  assert_eq!(fixed.label, "pinned");
}

#[test]
fn test_attribute_function_call() {
  struct Shouty {
    text: String,
  }

  // Arrange
  let container = Container::new();
  container
    .registration()
    .register_function(
      "upper",
      |_: &Container, args: &[Value]| -> ContainerResult<Value> {
        let input = args
          .first()
          .and_then(|v| v.cloned::<String>())
          .unwrap_or_default();
        Ok(value(input.to_uppercase()))
      },
    )
    .register(
      Blueprint::of::<Shouty>()
        .param(Param::new("text").attribute(Attribute::call(
          "upper",
          vec![value(String::from("quiet"))],
        )))
        .constructor(|args, _| {
          Ok(Shouty {
            text: args.take_cloned::<String>("text")?,
          })
        })
        .build(),
    );

  // Act
  let shouty = container.get::<Shouty>().unwrap();

  // Assert
  assert_eq!(shouty.text, "QUIET");
}

#[test]
fn test_unknown_resolver_function_is_malformed() {
  struct Broken {
    _text: String,
  }

  // Arrange
  let container = Container::new();
  container.registration().register(
    Blueprint::of::<Broken>()
      .param(Param::new("text").attribute(Attribute::call("nonexistent", vec![])))
      .constructor(|args, _| {
        Ok(Broken {
          _text: args.take_cloned::<String>("text")?,
        })
      })
      .build(),
  );

  // Act
  let result = container.get::<Broken>();

  // Assert
  assert!(matches!(
    result,
    Err(ContainerError::MalformedAttribute { .. })
  ));
}

#[test]
fn test_custom_attribute_decline_falls_through() {
  struct Configurable {
    mode: String,
  }

  // Arrange: the resolver declines every payload, so the declared default
  // must win.
  let container = Container::new();
  container
    .registration()
    .register_attribute(
      "setting",
      |_: &Value, _: &AttributeTarget<'_>, _: &Container| -> ContainerResult<Option<Value>> {
        Ok(None)
      },
    )
    .register(
      Blueprint::of::<Configurable>()
        .param(
          Param::new("mode")
            .attribute(Attribute::custom("setting", value(String::from("mode"))))
            .default(|| String::from("standard")),
        )
        .constructor(|args, _| {
          Ok(Configurable {
            mode: args.take_cloned::<String>("mode")?,
          })
        })
        .build(),
    );

  // Act
  let configurable = container.get::<Configurable>().unwrap();

  // Assert
  assert_eq!(configurable.mode, "standard");
}

#[test]
fn test_unregistered_attribute_kind_falls_through() {
  struct Loose {
    mode: String,
  }

  // Arrange: nothing is registered for the kind at all.
  let container = Container::new();
  container.registration().register(
    Blueprint::of::<Loose>()
      .param(
        Param::new("mode")
          .attribute(Attribute::custom("unknown-kind", value(0_u8)))
          .default(|| String::from("fallback")),
      )
      .constructor(|args, _| {
        Ok(Loose {
          mode: args.take_cloned::<String>("mode")?,
        })
      })
      .build(),
  );

  // Act
  let loose = container.get::<Loose>().unwrap();

  // Assert
  assert_eq!(loose.mode, "fallback");
}

#[test]
fn test_custom_attribute_resolution() {
  struct EnvReader {
    region: String,
  }

  // Arrange: a resolver that understands its own payloads.
  let container = Container::new();
  container
    .registration()
    .register_attribute(
      "config-key",
      |payload: &Value, _: &AttributeTarget<'_>, c: &Container| -> ContainerResult<Option<Value>> {
        match payload.cloned::<String>() {
          Some(key) => c.lookup(&key).map(Some),
          None => Ok(None),
        }
      },
    )
    .register(
      Blueprint::of::<EnvReader>()
        .param(Param::new("region").attribute(Attribute::custom(
          "config-key",
          value(String::from("deploy.region")),
        )))
        .constructor(|args, _| {
          Ok(EnvReader {
            region: args.take_cloned::<String>("region")?,
          })
        })
        .build(),
    );
  container
    .definitions()
    .bind_value("deploy.region", String::from("eu-west-1"));

  // Act
  let reader = container.get::<EnvReader>().unwrap();

  // Assert
  assert_eq!(reader.region, "eu-west-1");
}

// --- Properties ---

#[test]
fn test_property_attribute_assignment() {
  struct Labeled {
    label: String,
  }

  // Arrange
  let container = Container::new();
  container
    .definitions()
    .bind_value("labels.default", String::from("from-definition"));
  container.registration().register(
    Blueprint::of::<Labeled>()
      .constructor(|_, _| Ok(Labeled { label: String::new() }))
      .property(
        Property::instance("label", |l: &mut Labeled, v| {
          l.label = v.cloned::<String>().unwrap_or_default();
          Ok(())
        })
        .attribute(Attribute::lookup("labels.default")),
      )
      .build(),
  );

  // Act
  let labeled = container.get::<Labeled>().unwrap();

  // Assert
  assert_eq!(labeled.label, "from-definition");
}

#[test]
fn test_registered_property_value_beats_attribute() {
  struct Labeled {
    label: String,
  }

  // Arrange
  let container = Container::new();
  container
    .definitions()
    .bind_value("labels.default", String::from("from-attribute"));
  container
    .registration()
    .register(
      Blueprint::of::<Labeled>()
        .constructor(|_, _| Ok(Labeled { label: String::new() }))
        .property(
          Property::instance("label", |l: &mut Labeled, v| {
            l.label = v.cloned::<String>().unwrap_or_default();
            Ok(())
          })
          .attribute(Attribute::lookup("labels.default")),
        )
        .build(),
    )
    .property_value::<Labeled>("label", value(String::from("explicit")));

  // Act
  let labeled = container.get::<Labeled>().unwrap();

  // Assert
  assert_eq!(labeled.label, "explicit");
}

#[test]
fn test_static_property_assignment() {
  static SLOT: Mutex<Option<u64>> = Mutex::new(None);

  struct HasStatic;

  // Arrange
  let container = Container::new();
  container
    .registration()
    .register(
      Blueprint::of::<HasStatic>()
        .constructor(|_, _| Ok(HasStatic))
        .property(Property::static_slot("shared_counter", |v| {
          *SLOT.lock().unwrap() = v.cloned::<u64>();
          Ok(())
        }))
        .build(),
    )
    .property_value::<HasStatic>("shared_counter", value(77_u64));

  // Act
  container.get::<HasStatic>().unwrap();

  // Assert
  assert_eq!(*SLOT.lock().unwrap(), Some(77));
}

#[test]
fn test_instance_target_wins_over_static_duplicate() {
  static SLOT: Mutex<Option<String>> = Mutex::new(None);

  struct Shadowed {
    name: String,
  }

  // Arrange: the same property name is declared with both targets.
  let container = Container::new();
  container
    .registration()
    .register(
      Blueprint::of::<Shadowed>()
        .constructor(|_, _| Ok(Shadowed { name: String::new() }))
        .property(Property::instance("name", |s: &mut Shadowed, v| {
          s.name = v.cloned::<String>().unwrap_or_default();
          Ok(())
        }))
        .property(Property::static_slot("name", |v| {
          *SLOT.lock().unwrap() = v.cloned::<String>();
          Ok(())
        }))
        .build(),
    )
    .property_value::<Shadowed>("name", value(String::from("instance-bound")));

  // Act
  let shadowed = container.get::<Shadowed>().unwrap();

  // Assert
  assert_eq!(shadowed.name, "instance-bound");
  assert_eq!(*SLOT.lock().unwrap(), None);
}

#[test]
fn test_autowired_property() {
  struct Wired {
    b: Option<Arc<ClassB>>,
  }

  // Arrange: the attribute declines, the type reference wires it.
  let container = Container::new();
  register_class_b(&container);
  container.registration().register(
    Blueprint::of::<Wired>()
      .constructor(|_, _| Ok(Wired { b: None }))
      .property(
        Property::instance("b", |w: &mut Wired, v| {
          w.b = v.downcast::<ClassB>();
          Ok(())
        })
        .attribute(Attribute::custom("never-registered", value(())))
        .wired::<ClassB>(),
      )
      .build(),
  );

  // Act
  let wired = container.get::<Wired>().unwrap();

  // Assert
  assert_eq!(wired.b.as_ref().map(|b| b.tag), Some("wired"));
}

// --- Methods ---

#[test]
fn test_method_parameters_resolve_like_constructors() {
  struct Calculator {
    base: i64,
  }

  // Arrange
  let container = Container::new();
  container
    .registration()
    .register(
      Blueprint::of::<Calculator>()
        .constructor(|_, _| Ok(Calculator { base: 10 }))
        .method(
          Method::new("add", |calc: &Calculator, args, _| {
            let amount = args.take_cloned::<i64>("amount")?;
            Ok(value(calc.base + amount))
          })
          .param(Param::new("amount").default(|| 1_i64)),
        )
        .build(),
    )
    .default_call::<Calculator>("add", [arg("amount", value(32_i64))]);

  // Act
  let settled = container.call::<Calculator>(None).unwrap();

  // Assert
  let returned = settled.returned.expect("method should have been invoked");
  assert_eq!(returned.cloned::<i64>(), Some(42));
}
