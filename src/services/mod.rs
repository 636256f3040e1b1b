pub mod notifier;

pub use notifier::{dispatch_welcome, LogNotifier, Notifier, NotifyError};
