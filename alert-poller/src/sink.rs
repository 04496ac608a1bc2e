use async_trait::async_trait;
use landwarn_core::{CoreError, NotificationRecord};
use notify_rust::{Notification, Urgency};
use tracing::{debug, error};

/// Push-id space for alerts. Slots derived from notification ids stay in
/// `[ALERT_SLOT_BASE, ALERT_SLOT_BASE + ALERT_SLOT_RANGE)`.
pub const ALERT_SLOT_BASE: u32 = 2000;
pub const ALERT_SLOT_RANGE: u32 = 1000;

/// Receives each new notification exactly once, in feed order. Hosts that
/// prefer a channel can implement this with a sender and consume elsewhere.
#[async_trait]
pub trait AlertSink: Send + Sync {
    async fn deliver(&self, record: &NotificationRecord) -> Result<(), CoreError>;
}

/// Raises alerts as desktop notifications.
pub struct DesktopAlertSink {
    app_name: String,
}

impl DesktopAlertSink {
    pub fn new() -> Self {
        Self {
            app_name: "landwarn".to_string(),
        }
    }

    pub fn with_app_name(app_name: String) -> Self {
        Self { app_name }
    }
}

impl Default for DesktopAlertSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AlertSink for DesktopAlertSink {
    async fn deliver(&self, record: &NotificationRecord) -> Result<(), CoreError> {
        let result = Notification::new()
            .appname(&self.app_name)
            .summary(&record.title)
            .body(&record.message)
            .icon("dialog-warning")
            .urgency(Urgency::Critical)
            .id(alert_slot(&record.notification_id))
            .show();

        match result {
            Ok(_) => {
                debug!("Alert shown for {}", record.notification_id);
                Ok(())
            }
            Err(e) => {
                error!("Failed to show desktop alert: {}", e);
                Err(CoreError::Delivery {
                    message: e.to_string(),
                })
            }
        }
    }
}

/// Maps a notification id onto a stable push slot. Redelivery of the same id
/// replaces the earlier alert in place instead of stacking a duplicate.
pub fn alert_slot(notification_id: &str) -> u32 {
    let mut hash: i32 = 0;
    for c in notification_id.chars() {
        hash = hash.wrapping_mul(31).wrapping_add(c as i32);
    }
    let mut offset = hash % ALERT_SLOT_RANGE as i32;
    if offset < 0 {
        offset += ALERT_SLOT_RANGE as i32;
    }
    ALERT_SLOT_BASE + offset as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alert_slot_known_value() {
        assert_eq!(alert_slot("n-1"), 2154);
    }

    #[test]
    fn test_alert_slot_stable_and_in_range() {
        for id in [
            "",
            "a",
            "n-2",
            "550e8400-e29b-41d4-a716-446655440000",
            "a-very-long-notification-identifier-0123456789-abcdefghijklmnopqrstuvwxyz",
        ] {
            let slot = alert_slot(id);
            assert_eq!(slot, alert_slot(id));
            assert!((ALERT_SLOT_BASE..ALERT_SLOT_BASE + ALERT_SLOT_RANGE).contains(&slot));
        }
    }
}
