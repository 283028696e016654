//! Push-event side of the system: the handler a service worker registers to
//! turn an incoming push message into a system notification, plus an
//! in-process host that delivers events to it.

pub mod event;
pub mod host;
pub mod notifier;
pub mod runtime;

pub use event::{PushEvent, PushMessageData};
pub use host::{NotificationHost, TracingHost};
pub use notifier::PushNotifier;
pub use runtime::ServiceWorker;
