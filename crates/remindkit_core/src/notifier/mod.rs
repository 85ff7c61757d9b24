//! Notification scheduler port.
//!
//! # Responsibility
//! - Define the async contract the OS notification subsystem implements.
//! - Define the read-back shapes (`RegisteredTrigger`, displayed items).
//!
//! # Invariants
//! - The scheduler is the only source of truth for live triggers; callers
//!   re-read it instead of caching across passes.
//! - Prefix cancellation uses anchored trigger-id ownership.

pub mod memory;

use crate::model::notification::{Notification, NotificationData, NotificationKind};
use crate::model::trigger::{is_owned_by, TriggerSpec};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type NotifierResult<T> = Result<T, NotifierError>;

/// Scheduler call failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifierError {
    /// The host scheduler rejected or failed the call.
    Backend {
        operation: &'static str,
        message: String,
    },
    /// The host refused the call for lack of notification permission.
    PermissionDenied(&'static str),
}

impl NotifierError {
    pub fn backend(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Backend {
            operation,
            message: message.into(),
        }
    }
}

impl Display for NotifierError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Backend { operation, message } => {
                write!(f, "notifier `{operation}` failed: {message}")
            }
            Self::PermissionDenied(operation) => {
                write!(f, "notifier `{operation}` denied: missing permission")
            }
        }
    }
}

impl Error for NotifierError {}

/// OS notification authorization state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorizationStatus {
    NotDetermined,
    Denied,
    Authorized,
    Provisional,
}

/// Exact-alarm scheduling capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlarmCapability {
    Enabled,
    Disabled,
    /// Platform has no separate alarm permission.
    NotApplicable,
}

/// Snapshot of notification permissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationSettings {
    pub authorization: AuthorizationStatus,
    pub alarm: AlarmCapability,
}

impl NotificationSettings {
    pub const AUTHORIZED: Self = Self {
        authorization: AuthorizationStatus::Authorized,
        alarm: AlarmCapability::Enabled,
    };

    pub fn is_authorized(&self) -> bool {
        self.authorization == AuthorizationStatus::Authorized
    }

    pub fn has_alarm_capability(&self) -> bool {
        self.alarm != AlarmCapability::Disabled
    }

    /// Authorized and able to schedule exact alarms.
    pub fn is_fully_authorized(&self) -> bool {
        self.is_authorized() && self.has_alarm_capability()
    }
}

/// One trigger notification as reported by the scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredTrigger {
    pub id: String,
    #[serde(default)]
    pub data: Option<NotificationData>,
}

impl RegisteredTrigger {
    /// Version stamp stored in the payload, if readable.
    pub fn date_modified(&self) -> Option<i64> {
        self.data.as_ref()?.date_modified_ms()
    }
}

/// One currently displayed (non-trigger) notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayedNotification {
    pub id: String,
    pub data: Option<NotificationData>,
    pub ongoing: bool,
}

/// Async contract of the host notification scheduler.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Lists every registered trigger notification.
    async fn list_triggers(&self) -> NotifierResult<Vec<RegisteredTrigger>>;
    /// Registers `notification` to fire according to `trigger`.
    async fn create_trigger(
        &self,
        notification: &Notification,
        trigger: &TriggerSpec,
    ) -> NotifierResult<()>;
    /// Cancels one trigger. Unknown ids are not an error.
    async fn cancel_trigger(&self, id: &str) -> NotifierResult<()>;
    /// Cancels every trigger.
    async fn cancel_all_triggers(&self) -> NotifierResult<()>;
    /// Shows a notification immediately.
    async fn display(&self, notification: &Notification) -> NotifierResult<()>;
    /// Lists currently displayed notifications.
    async fn list_displayed(&self) -> NotifierResult<Vec<DisplayedNotification>>;
    /// Removes one displayed notification.
    async fn cancel_displayed(&self, id: &str) -> NotifierResult<()>;
    /// Reads current permission settings.
    async fn notification_settings(&self) -> NotifierResult<NotificationSettings>;
    /// Prompts for notification permission and returns the result.
    async fn request_authorization(&self) -> NotifierResult<NotificationSettings>;
    /// Opens the OS exact-alarm settings surface.
    async fn open_alarm_settings(&self) -> NotifierResult<()>;

    /// Cancels every trigger owned by `reminder_id`; returns how many.
    async fn cancel_triggers_by_prefix(&self, reminder_id: &str) -> NotifierResult<usize> {
        let owned = self
            .list_triggers()
            .await?
            .into_iter()
            .filter(|trigger| is_owned_by(&trigger.id, reminder_id))
            .collect::<Vec<_>>();
        for trigger in &owned {
            self.cancel_trigger(&trigger.id).await?;
        }
        Ok(owned.len())
    }
}

/// Caller-owned snapshot of displayed notifications.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayedSnapshot {
    items: Vec<DisplayedNotification>,
}

impl DisplayedSnapshot {
    /// Reads the current displayed set from `notifier`.
    pub async fn refresh<N: Notifier + ?Sized>(notifier: &N) -> NotifierResult<Self> {
        Ok(Self {
            items: notifier.list_displayed().await?,
        })
    }

    pub fn items(&self) -> &[DisplayedNotification] {
        &self.items
    }

    /// Displayed notifications pinned from notes.
    pub fn pinned_notes(&self) -> impl Iterator<Item = &DisplayedNotification> {
        self.items.iter().filter(|item| {
            item.data
                .as_ref()
                .is_some_and(|data| data.kind == NotificationKind::PinnedNote)
        })
    }

    pub fn contains(&self, id: &str) -> bool {
        self.items.iter().any(|item| item.id == id)
    }
}
