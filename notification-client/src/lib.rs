pub mod api;

pub use api::{HttpNotificationSource, NotificationSource, DEFAULT_REQUEST_TIMEOUT};
