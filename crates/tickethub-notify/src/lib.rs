//! # tickethub-notify
//!
//! The notification fan-out core: recipient-set computation with
//! per-event inclusion/exclusion rules, notification rendering, and
//! per-recipient delivery with isolated failure boundaries.

pub mod channels;
pub mod dispatcher;
pub mod formatter;
pub mod message;
pub mod recipients;
pub mod resolver;

pub use dispatcher::{DispatchReport, NotificationDispatcher};
pub use message::NotificationMessage;
pub use recipients::RecipientSet;
pub use resolver::RecipientResolver;
