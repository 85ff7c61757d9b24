//! Reminder scheduling core.
//! Turns reminder records into notification triggers and keeps the host
//! scheduler's registered set in line with them.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod notifier;
pub mod permission;
pub mod planner;
pub mod reconcile;
pub mod repo;
pub mod service;

pub use config::{ConfigError, EngineConfig};
pub use logging::{default_log_level, init_logging, init_logging_with_config, logging_status};
pub use model::notification::{
    Channel, InterruptionLevel, Notification, NotificationData, NotificationKind,
};
pub use model::reminder::{
    Priority, RecurringMode, Reminder, ReminderId, ReminderMode, ReminderValidationError, Schedule,
};
pub use model::trigger::{is_owned_by, trigger_id, RepeatFrequency, TriggerSpec};
pub use notifier::memory::{InMemoryNotifier, NotifierCall};
pub use notifier::{
    AlarmCapability, AuthorizationStatus, DisplayedNotification, DisplayedSnapshot,
    NotificationSettings, Notifier, NotifierError, NotifierResult, RegisteredTrigger,
};
pub use permission::PermissionGate;
pub use planner::{plan, plan_in, Plan};
pub use reconcile::{
    diff, needs_reschedule, ReconcileDiff, ReconcileError, ReconcileReport, Reconciler,
    ScheduleOutcome,
};
pub use repo::reminder_repo::{ReminderRepository, RepoError, RepoResult, SqliteReminderRepository};
pub use service::reminder_service::{ReminderDraft, ReminderService};

/// Minimal health-check API for bridge integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
