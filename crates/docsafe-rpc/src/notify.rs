use serde::Serialize;
use tracing::warn;

/// Tone of a user-facing notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Feeling {
    Positive,
    Neutral,
    Negative,
}

/// A user-facing notification (toast, flash message, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub icon: String,
    pub feeling: Feeling,
}

impl Notification {
    /// Negative notification with the alert icon.
    pub fn failure(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            icon: "alert".to_string(),
            feeling: Feeling::Negative,
        }
    }
}

/// Destination for user-facing notifications.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Sink that only logs, for contexts without a user interface.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl NotificationSink for LogSink {
    fn notify(&self, notification: Notification) {
        warn!(
            title = %notification.title,
            description = %notification.description,
            feeling = ?notification.feeling,
            "notification"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_notifications_are_negative_alerts() {
        let n = Notification::failure("Operation Failed", "Bad result");
        assert_eq!(n.icon, "alert");
        assert_eq!(n.feeling, Feeling::Negative);
        assert_eq!(
            serde_json::to_value(&n).unwrap()["feeling"],
            serde_json::json!("negative")
        );
    }

    #[test]
    fn log_sink_accepts_notifications() {
        LogSink.notify(Notification::failure("t", "d"));
    }
}
