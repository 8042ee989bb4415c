//! Notification services.

mod flush;

pub use flush::EmailFlushService;
