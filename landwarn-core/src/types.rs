use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One notification row as the alert server returns it. Every field except
/// the id is optional on the wire; absent fields take the same fallbacks the
/// mobile clients apply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationRecord {
    #[serde(default)]
    pub notification_id: String,
    #[serde(default)]
    pub user_id: String,
    /// Prediction-log entry this alert refers to, when the server linked one.
    #[serde(default)]
    pub log_id: Option<String>,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub sent_at: Option<String>,
    #[serde(default)]
    pub is_read: i64,
}

fn default_title() -> String {
    "Alert".to_string()
}

impl NotificationRecord {
    /// Records without a usable id cannot be deduplicated and are skipped.
    pub fn has_id(&self) -> bool {
        !self.notification_id.trim().is_empty()
    }

    pub fn is_unread(&self) -> bool {
        self.is_read == 0
    }

    /// `sent_at` arrives as a naive ISO-8601 timestamp, with or without a
    /// fractional second.
    pub fn sent_at_time(&self) -> Option<NaiveDateTime> {
        self.sent_at
            .as_deref()
            .and_then(|raw| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").ok())
    }
}
