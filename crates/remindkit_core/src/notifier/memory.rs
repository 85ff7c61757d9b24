//! In-process scheduler used for dry runs and tests.
//!
//! Records every mutating call so callers can assert on the exact
//! create/cancel traffic a reconciliation pass produced.

use super::{
    DisplayedNotification, NotificationSettings, Notifier, NotifierError, NotifierResult,
    RegisteredTrigger,
};
use crate::model::notification::Notification;
use crate::model::trigger::{is_owned_by, TriggerSpec};
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard};

/// One recorded scheduler call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifierCall {
    ListTriggers,
    CreateTrigger(String),
    CancelTrigger(String),
    CancelTriggersByPrefix(String),
    CancelAllTriggers,
    Display(String),
    CancelDisplayed(String),
    RequestAuthorization,
    OpenAlarmSettings,
}

impl NotifierCall {
    /// Whether this call created or cancelled a trigger.
    pub fn is_trigger_mutation(&self) -> bool {
        matches!(
            self,
            Self::CreateTrigger(_)
                | Self::CancelTrigger(_)
                | Self::CancelTriggersByPrefix(_)
                | Self::CancelAllTriggers
        )
    }
}

/// Trigger held by [`InMemoryNotifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredTrigger {
    pub notification: Notification,
    pub trigger: TriggerSpec,
}

#[derive(Debug)]
struct State {
    triggers: BTreeMap<String, StoredTrigger>,
    displayed: BTreeMap<String, Notification>,
    settings: NotificationSettings,
    granted_on_request: NotificationSettings,
    alarm_on_settings_open: bool,
    failing_creates: BTreeSet<String>,
    fail_listing: bool,
    calls: Vec<NotifierCall>,
}

/// Thread-safe fake of the host notification scheduler.
#[derive(Debug)]
pub struct InMemoryNotifier {
    state: Mutex<State>,
}

impl Default for InMemoryNotifier {
    fn default() -> Self {
        Self::with_settings(NotificationSettings::AUTHORIZED)
    }
}

impl InMemoryNotifier {
    /// Fully authorized scheduler with no triggers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scheduler starting from `settings`. Authorization requests keep the
    /// same settings until [`Self::grant_on_request`] says otherwise.
    pub fn with_settings(settings: NotificationSettings) -> Self {
        Self {
            state: Mutex::new(State {
                triggers: BTreeMap::new(),
                displayed: BTreeMap::new(),
                settings,
                granted_on_request: settings,
                alarm_on_settings_open: false,
                failing_creates: BTreeSet::new(),
                fail_listing: false,
                calls: Vec::new(),
            }),
        }
    }

    /// Settings the user ends up with after a permission prompt.
    pub fn grant_on_request(&self, settings: NotificationSettings) {
        self.lock().granted_on_request = settings;
    }

    /// Whether visiting alarm settings enables the alarm capability.
    pub fn enable_alarm_on_settings_open(&self, enabled: bool) {
        self.lock().alarm_on_settings_open = enabled;
    }

    /// Makes `create_trigger` fail for `trigger_id`.
    pub fn fail_create_for(&self, trigger_id: impl Into<String>) {
        self.lock().failing_creates.insert(trigger_id.into());
    }

    /// Makes `list_triggers` fail.
    pub fn fail_listing(&self, fail: bool) {
        self.lock().fail_listing = fail;
    }

    /// Registers a trigger directly, bypassing call recording.
    pub fn seed_trigger(&self, notification: Notification, trigger: TriggerSpec) {
        self.lock().triggers.insert(
            trigger.id.clone(),
            StoredTrigger {
                notification,
                trigger,
            },
        );
    }

    pub fn triggers(&self) -> Vec<StoredTrigger> {
        self.lock().triggers.values().cloned().collect()
    }

    pub fn trigger(&self, id: &str) -> Option<StoredTrigger> {
        self.lock().triggers.get(id).cloned()
    }

    pub fn trigger_ids(&self) -> Vec<String> {
        self.lock().triggers.keys().cloned().collect()
    }

    pub fn displayed(&self, id: &str) -> Option<Notification> {
        self.lock().displayed.get(id).cloned()
    }

    pub fn calls(&self) -> Vec<NotifierCall> {
        self.lock().calls.clone()
    }

    /// Number of trigger create/cancel calls recorded so far.
    pub fn trigger_mutation_count(&self) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|call| call.is_trigger_mutation())
            .count()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl Notifier for InMemoryNotifier {
    async fn list_triggers(&self) -> NotifierResult<Vec<RegisteredTrigger>> {
        let mut state = self.lock();
        state.calls.push(NotifierCall::ListTriggers);
        if state.fail_listing {
            return Err(NotifierError::backend("list_triggers", "listing unavailable"));
        }
        Ok(state
            .triggers
            .values()
            .map(|stored| RegisteredTrigger {
                id: stored.trigger.id.clone(),
                data: Some(stored.notification.data.clone()),
            })
            .collect())
    }

    async fn create_trigger(
        &self,
        notification: &Notification,
        trigger: &TriggerSpec,
    ) -> NotifierResult<()> {
        let mut state = self.lock();
        state
            .calls
            .push(NotifierCall::CreateTrigger(trigger.id.clone()));
        if state.failing_creates.contains(&trigger.id) {
            return Err(NotifierError::backend(
                "create_trigger",
                format!("scheduler rejected `{}`", trigger.id),
            ));
        }
        if !state.settings.is_fully_authorized() {
            return Err(NotifierError::PermissionDenied("create_trigger"));
        }
        state.triggers.insert(
            trigger.id.clone(),
            StoredTrigger {
                notification: notification.clone(),
                trigger: trigger.clone(),
            },
        );
        Ok(())
    }

    async fn cancel_trigger(&self, id: &str) -> NotifierResult<()> {
        let mut state = self.lock();
        state.calls.push(NotifierCall::CancelTrigger(id.to_string()));
        state.triggers.remove(id);
        Ok(())
    }

    async fn cancel_all_triggers(&self) -> NotifierResult<()> {
        let mut state = self.lock();
        state.calls.push(NotifierCall::CancelAllTriggers);
        state.triggers.clear();
        Ok(())
    }

    async fn display(&self, notification: &Notification) -> NotifierResult<()> {
        let mut state = self.lock();
        state
            .calls
            .push(NotifierCall::Display(notification.id.clone()));
        if !state.settings.is_authorized() {
            return Err(NotifierError::PermissionDenied("display"));
        }
        state
            .displayed
            .insert(notification.id.clone(), notification.clone());
        Ok(())
    }

    async fn list_displayed(&self) -> NotifierResult<Vec<DisplayedNotification>> {
        Ok(self
            .lock()
            .displayed
            .values()
            .map(|notification| DisplayedNotification {
                id: notification.id.clone(),
                data: Some(notification.data.clone()),
                ongoing: notification.ongoing,
            })
            .collect())
    }

    async fn cancel_displayed(&self, id: &str) -> NotifierResult<()> {
        let mut state = self.lock();
        state
            .calls
            .push(NotifierCall::CancelDisplayed(id.to_string()));
        state.displayed.remove(id);
        Ok(())
    }

    async fn notification_settings(&self) -> NotifierResult<NotificationSettings> {
        Ok(self.lock().settings)
    }

    async fn request_authorization(&self) -> NotifierResult<NotificationSettings> {
        let mut state = self.lock();
        state.calls.push(NotifierCall::RequestAuthorization);
        let granted = state.granted_on_request.authorization;
        state.settings.authorization = granted;
        Ok(state.settings)
    }

    async fn open_alarm_settings(&self) -> NotifierResult<()> {
        let mut state = self.lock();
        state.calls.push(NotifierCall::OpenAlarmSettings);
        if state.alarm_on_settings_open {
            state.settings.alarm = super::AlarmCapability::Enabled;
        }
        Ok(())
    }

    async fn cancel_triggers_by_prefix(&self, reminder_id: &str) -> NotifierResult<usize> {
        let mut state = self.lock();
        state
            .calls
            .push(NotifierCall::CancelTriggersByPrefix(reminder_id.to_string()));
        let before = state.triggers.len();
        state
            .triggers
            .retain(|id, _| !is_owned_by(id, reminder_id));
        Ok(before - state.triggers.len())
    }
}
