//! Notification content, channels and the wire payload.
//!
//! The `data` payload is the only part of a notification that survives a
//! round-trip through the scheduler, so it carries the reconciliation
//! version stamp as a string (`dateModified`).

use crate::model::reminder::{Priority, Reminder};
use crate::model::trigger::TriggerSpec;
use serde::{Deserialize, Serialize};

/// Payload discriminator stored in `data.type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NotificationKind {
    Reminder,
    PinnedNote,
    QuickNote,
}

/// Scheduler-persisted notification payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationData {
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    /// Opaque passthrough value.
    #[serde(default)]
    pub payload: String,
    /// Stringified epoch milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_modified: Option<String>,
}

impl NotificationData {
    /// Reminder payload stamped with `date_modified`.
    pub fn reminder(payload: impl Into<String>, date_modified: i64) -> Self {
        Self {
            kind: NotificationKind::Reminder,
            payload: payload.into(),
            date_modified: Some(date_modified.to_string()),
        }
    }

    /// Parsed version stamp, `None` when absent or malformed.
    pub fn date_modified_ms(&self) -> Option<i64> {
        self.date_modified.as_deref()?.trim().parse().ok()
    }
}

/// Android-style delivery channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Channel {
    pub id: &'static str,
    pub name: &'static str,
    pub vibration: bool,
    pub sound: Option<&'static str>,
}

impl Channel {
    /// Channel for non-reminder displays (pinned/ongoing notifications).
    pub const DEFAULT: Channel = Channel {
        id: "remindkit.default",
        name: "Default",
        vibration: true,
        sound: None,
    };
    pub const SILENT: Channel = Channel {
        id: "remindkit.silent",
        name: "Silent",
        vibration: false,
        sound: None,
    };
    pub const VIBRATE: Channel = Channel {
        id: "remindkit.vibrate",
        name: "Vibrate",
        vibration: true,
        sound: None,
    };
    pub const URGENT: Channel = Channel {
        id: "remindkit.urgent",
        name: "Urgent",
        vibration: true,
        sound: Some("default"),
    };
}

/// iOS-style interruption level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InterruptionLevel {
    Passive,
    Active,
}

impl Priority {
    pub fn channel(self) -> Channel {
        match self {
            Self::Silent => Channel::SILENT,
            Self::Vibrate => Channel::VIBRATE,
            Self::Urgent => Channel::URGENT,
        }
    }

    pub fn interruption_level(self) -> InterruptionLevel {
        match self {
            Self::Silent => InterruptionLevel::Passive,
            Self::Vibrate | Self::Urgent => InterruptionLevel::Active,
        }
    }
}

/// Notification content handed to the scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub id: String,
    pub title: String,
    pub body: Option<String>,
    pub subtitle: Option<String>,
    /// Expanded big-text style body.
    pub big_text: Option<String>,
    pub data: NotificationData,
    pub channel: Channel,
    pub interruption_level: InterruptionLevel,
    /// Cannot be swiped away while `true`.
    pub ongoing: bool,
}

impl Notification {
    /// Content for one planned trigger of `reminder`.
    pub fn for_trigger(reminder: &Reminder, trigger: &TriggerSpec, payload: &str) -> Self {
        let description = non_empty(reminder.description.as_deref());
        Self {
            id: trigger.id.clone(),
            title: reminder.title.clone(),
            body: description.clone(),
            subtitle: description.clone(),
            big_text: description,
            data: NotificationData::reminder(payload, trigger.date_modified),
            channel: reminder.priority.channel(),
            interruption_level: reminder.priority.interruption_level(),
            ongoing: false,
        }
    }

    /// Ongoing display for a permanent reminder.
    pub fn ongoing_for(reminder: &Reminder) -> Self {
        let description = non_empty(reminder.description.as_deref());
        Self {
            id: reminder.id.clone(),
            title: reminder.title.clone(),
            body: Some(description.clone().unwrap_or_default()),
            subtitle: description,
            big_text: None,
            data: NotificationData {
                kind: NotificationKind::PinnedNote,
                payload: String::new(),
                date_modified: Some(reminder.date_modified.to_string()),
            },
            channel: Channel::DEFAULT,
            interruption_level: InterruptionLevel::Active,
            ongoing: true,
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::{Channel, InterruptionLevel, NotificationData, NotificationKind};
    use crate::model::reminder::Priority;

    #[test]
    fn data_parses_stringified_stamp() {
        let data = NotificationData::reminder("", 1_700_000_000_123);
        assert_eq!(data.date_modified.as_deref(), Some("1700000000123"));
        assert_eq!(data.date_modified_ms(), Some(1_700_000_000_123));
    }

    #[test]
    fn malformed_stamp_reads_as_none() {
        let data = NotificationData {
            kind: NotificationKind::Reminder,
            payload: String::new(),
            date_modified: Some("yesterday".to_string()),
        };
        assert_eq!(data.date_modified_ms(), None);
    }

    #[test]
    fn priority_maps_to_channel_and_interruption() {
        assert_eq!(Priority::Silent.channel(), Channel::SILENT);
        assert!(!Priority::Silent.channel().vibration);
        assert_eq!(Priority::Urgent.channel().sound, Some("default"));
        assert_eq!(
            Priority::Silent.interruption_level(),
            InterruptionLevel::Passive
        );
        assert_eq!(
            Priority::Vibrate.interruption_level(),
            InterruptionLevel::Active
        );
    }
}
