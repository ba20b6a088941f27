pub mod monitor;
pub mod notify;
pub mod state;

pub use monitor::{Monitor, NotificationOutcome, RunSummary, Transition, should_notify};
pub use notify::{Notifier, NotifyError, SmtpNotifier, compose_alert};
pub use state::{StateError, StateStore};
