use std::sync::Arc;

use strand_ioc::Container;

// One interface, two implementations, chosen by the active environment.
trait Mailer: Send + Sync {
  fn deliver(&self, to: &str) -> String;
}

struct LogMailer;
impl Mailer for LogMailer {
  fn deliver(&self, to: &str) -> String {
    format!("[dev] would mail {to}")
  }
}

struct SmtpMailer;
impl Mailer for SmtpMailer {
  fn deliver(&self, to: &str) -> String {
    format!("[prod] mailing {to} over smtp")
  }
}

fn main() {
  let container = Container::new();

  container
    .definitions()
    .provide_interface_for_env::<dyn Mailer, _>("dev", |_| {
      let mailer: Arc<dyn Mailer> = Arc::new(LogMailer);
      Ok(mailer)
    })
    .provide_interface_for_env::<dyn Mailer, _>("prod", |_| {
      let mailer: Arc<dyn Mailer> = Arc::new(SmtpMailer);
      Ok(mailer)
    });

  container.set_environment("dev");
  let mailer = container.get_trait::<dyn Mailer>().expect("dev mailer");
  println!("{}", mailer.deliver("ops@example.com"));

  container.set_environment("prod");
  let mailer = container.get_trait::<dyn Mailer>().expect("prod mailer");
  println!("{}", mailer.deliver("ops@example.com"));
}
