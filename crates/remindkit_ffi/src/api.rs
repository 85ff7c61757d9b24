//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose reminder planning and reconciliation previews to Dart via FRB.
//! - Keep error semantics simple: every call returns an envelope, never throws.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Reminder and trigger lists cross the boundary as JSON using the
//!   camelCase reminder schema and the scheduler's `{ id, data }` shape.
//! - Preview calls never touch the host scheduler; they only compute.

use log::warn;
use remindkit_core::db::{default_db_path, open_db};
use remindkit_core::{
    core_version as core_version_inner, diff, init_logging as init_logging_inner,
    is_owned_by, ping as ping_inner, plan, Plan, RegisteredTrigger, Reminder, ReminderService,
    RepeatFrequency, SqliteReminderRepository, TriggerSpec,
};
use std::path::PathBuf;
use std::sync::OnceLock;

static REMINDER_DB_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// One trigger the scheduler would register.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedTriggerItem {
    pub trigger_id: String,
    /// Unix epoch milliseconds of the first fire.
    pub fire_at_ms: i64,
    /// `daily|weekly`, or `None` for one-shot triggers.
    pub repeat: Option<String>,
    /// Version stamp written into the trigger payload.
    pub date_modified: i64,
}

/// Planning result for one reminder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderPlanResponse {
    pub ok: bool,
    /// Permanent reminder: shown as an ongoing notification, no triggers.
    pub ongoing: bool,
    pub triggers: Vec<PlannedTriggerItem>,
    /// Human-readable response message for diagnostics.
    pub message: String,
}

impl ReminderPlanResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            ongoing: false,
            triggers: Vec::new(),
            message: message.into(),
        }
    }
}

/// What a reconciliation pass would do, without doing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcilePreviewResponse {
    pub ok: bool,
    /// Reminder ids that would be (re)scheduled.
    pub reschedule_ids: Vec<String>,
    /// Reminder ids whose triggers are current.
    pub up_to_date_ids: Vec<String>,
    /// Registered trigger ids that would be cancelled (stale or orphaned).
    pub cancel_trigger_ids: Vec<String>,
    pub message: String,
}

impl ReconcilePreviewResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            reschedule_ids: Vec::new(),
            up_to_date_ids: Vec::new(),
            cancel_trigger_ids: Vec::new(),
            message: message.into(),
        }
    }
}

/// Plans triggers for one JSON-encoded reminder in device-local time.
///
/// # FFI contract
/// - Sync call, pure computation.
/// - Malformed JSON or reminder fields return `ok=false` with a message.
#[flutter_rust_bridge::frb(sync)]
pub fn plan_reminder_json(reminder_json: String) -> ReminderPlanResponse {
    let reminder: Reminder = match serde_json::from_str(&reminder_json) {
        Ok(reminder) => reminder,
        Err(err) => return ReminderPlanResponse::failure(format!("invalid reminder JSON: {err}")),
    };

    match plan(&reminder) {
        Ok(Plan::Ongoing) => ReminderPlanResponse {
            ok: true,
            ongoing: true,
            triggers: Vec::new(),
            message: "Shown as ongoing notification.".to_string(),
        },
        Ok(Plan::Triggers(triggers)) => ReminderPlanResponse {
            ok: true,
            ongoing: false,
            message: format!("Planned {} trigger(s).", triggers.len()),
            triggers: triggers.iter().map(to_planned_trigger_item).collect(),
        },
        Err(err) => {
            warn!(
                "event=plan_reminder module=ffi status=error reminder_id={} error={}",
                reminder.id, err
            );
            ReminderPlanResponse::failure(format!("plan_reminder_json failed: {err}"))
        }
    }
}

/// Previews one reconciliation pass.
///
/// Input semantics:
/// - `reminders_json`: JSON array of reminders.
/// - `registered_json`: JSON array of `{ "id": ..., "data": {...} }` as
///   reported by the host scheduler.
#[flutter_rust_bridge::frb(sync)]
pub fn reconcile_preview_json(
    reminders_json: String,
    registered_json: String,
) -> ReconcilePreviewResponse {
    let reminders: Vec<Reminder> = match serde_json::from_str(&reminders_json) {
        Ok(reminders) => reminders,
        Err(err) => {
            return ReconcilePreviewResponse::failure(format!("invalid reminders JSON: {err}"))
        }
    };
    match parse_registered(&registered_json) {
        Ok(registered) => preview(&reminders, &registered),
        Err(message) => ReconcilePreviewResponse::failure(message),
    }
}

/// Previews one reconciliation pass over the reminders in the local store.
///
/// # FFI contract
/// - Sync call, DB-backed execution (`REMINDKIT_DB_PATH`, else temp dir).
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn reconcile_preview_stored(registered_json: String) -> ReconcilePreviewResponse {
    let registered = match parse_registered(&registered_json) {
        Ok(registered) => registered,
        Err(message) => return ReconcilePreviewResponse::failure(message),
    };
    match load_stored_reminders() {
        Ok(reminders) => preview(&reminders, &registered),
        Err(err) => {
            warn!(
                "event=reconcile_preview module=ffi status=error error_code=store_unavailable error={}",
                err
            );
            ReconcilePreviewResponse::failure(format!("reconcile_preview_stored failed: {err}"))
        }
    }
}

fn parse_registered(registered_json: &str) -> Result<Vec<RegisteredTrigger>, String> {
    serde_json::from_str(registered_json)
        .map_err(|err| format!("invalid registered triggers JSON: {err}"))
}

fn preview(reminders: &[Reminder], registered: &[RegisteredTrigger]) -> ReconcilePreviewResponse {
    let result = diff(reminders, registered);

    let mut cancel_trigger_ids = Vec::new();
    for pending in result.reschedule.iter().filter(|p| p.registered > 0) {
        cancel_trigger_ids.extend(
            registered
                .iter()
                .filter(|trigger| is_owned_by(&trigger.id, &pending.reminder.id))
                .map(|trigger| trigger.id.clone()),
        );
    }
    cancel_trigger_ids.extend(result.orphans.iter().map(|trigger| trigger.id.clone()));

    let reschedule_ids = result
        .reschedule
        .iter()
        .map(|pending| pending.reminder.id.clone())
        .collect::<Vec<_>>();
    ReconcilePreviewResponse {
        ok: true,
        message: format!(
            "{} to reschedule, {} trigger(s) to cancel.",
            reschedule_ids.len(),
            cancel_trigger_ids.len()
        ),
        reschedule_ids,
        up_to_date_ids: result
            .up_to_date
            .iter()
            .map(|reminder| reminder.id.clone())
            .collect(),
        cancel_trigger_ids,
    }
}

fn resolve_reminder_db_path() -> PathBuf {
    REMINDER_DB_PATH.get_or_init(default_db_path).clone()
}

fn load_stored_reminders() -> Result<Vec<Reminder>, String> {
    let db_path = resolve_reminder_db_path();
    let conn = open_db(&db_path).map_err(|err| format!("reminder DB open failed: {err}"))?;
    let service = ReminderService::new(SqliteReminderRepository::new(&conn));
    service.list_reminders().map_err(|err| err.to_string())
}

fn to_planned_trigger_item(trigger: &TriggerSpec) -> PlannedTriggerItem {
    PlannedTriggerItem {
        trigger_id: trigger.id.clone(),
        fire_at_ms: trigger.fire_at_ms,
        repeat: trigger.repeat.map(|repeat| repeat_label(repeat).to_string()),
        date_modified: trigger.date_modified,
    }
}

fn repeat_label(repeat: RepeatFrequency) -> &'static str {
    match repeat {
        RepeatFrequency::Daily => "daily",
        RepeatFrequency::Weekly => "weekly",
    }
}

#[cfg(test)]
mod tests {
    use super::{
        core_version, init_logging, ping, plan_reminder_json, reconcile_preview_json,
        reconcile_preview_stored,
    };
    use remindkit_core::db::open_db;
    use remindkit_core::{
        Priority, ReminderDraft, ReminderMode, ReminderService, SqliteReminderRepository,
    };

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        let error = init_logging("info".to_string(), String::new());
        assert!(!error.is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn plan_reports_one_trigger_per_selected_weekday() {
        let response = plan_reminder_json(
            r#"{
                "id": "r1",
                "title": "Gym",
                "mode": "repeat",
                "recurringMode": "week",
                "selectedDays": [1, 3, 5],
                "date": 1704274200000,
                "dateModified": 9
            }"#
            .to_string(),
        );

        assert!(response.ok, "{}", response.message);
        assert!(!response.ongoing);
        let ids = response
            .triggers
            .iter()
            .map(|item| item.trigger_id.as_str())
            .collect::<Vec<_>>();
        assert_eq!(ids, vec!["r1_1", "r1_3", "r1_5"]);
        assert!(response
            .triggers
            .iter()
            .all(|item| item.repeat.as_deref() == Some("weekly") && item.date_modified == 9));
    }

    #[test]
    fn plan_reports_permanent_as_ongoing() {
        let response = plan_reminder_json(
            r#"{ "id": "p", "title": "Pinned", "mode": "permanent", "dateModified": 1 }"#
                .to_string(),
        );
        assert!(response.ok);
        assert!(response.ongoing);
        assert!(response.triggers.is_empty());
    }

    #[test]
    fn plan_rejects_malformed_input() {
        let response = plan_reminder_json("not json".to_string());
        assert!(!response.ok);
        assert!(response.message.contains("invalid reminder JSON"));

        let response = plan_reminder_json(
            r#"{ "id": "w", "title": "x", "mode": "repeat", "recurringMode": "week", "date": 1, "dateModified": 1 }"#
                .to_string(),
        );
        assert!(!response.ok);
        assert!(response.message.contains("selected day"));
    }

    #[test]
    fn preview_lists_stale_and_orphaned_triggers() {
        let reminders = r#"[
            { "id": "r1", "title": "a", "mode": "once", "date": 1000, "dateModified": 5 },
            { "id": "r2", "title": "b", "mode": "once", "date": 1000, "dateModified": 5 }
        ]"#;
        let registered = r#"[
            { "id": "r1", "data": { "type": "reminder", "payload": "", "dateModified": "4" } },
            { "id": "r2", "data": { "type": "reminder", "payload": "", "dateModified": "5" } },
            { "id": "r10" }
        ]"#;

        let response = reconcile_preview_json(reminders.to_string(), registered.to_string());

        assert!(response.ok, "{}", response.message);
        assert_eq!(response.reschedule_ids, vec!["r1"]);
        assert_eq!(response.up_to_date_ids, vec!["r2"]);
        assert_eq!(response.cancel_trigger_ids, vec!["r1", "r10"]);
    }

    #[test]
    fn preview_rejects_malformed_trigger_list() {
        let response = reconcile_preview_json("[]".to_string(), "{".to_string());
        assert!(!response.ok);
        assert!(response.message.contains("registered triggers"));
    }

    #[test]
    fn stored_preview_schedules_new_reminders() {
        let dir = tempfile::tempdir().expect("temp dir");
        let db_path = dir.path().join("reminders.sqlite3");
        super::REMINDER_DB_PATH
            .set(db_path.clone())
            .expect("store path not resolved yet");
        let conn = open_db(&db_path).expect("open db");
        let created = ReminderService::new(SqliteReminderRepository::new(&conn))
            .create_reminder(ReminderDraft {
                title: "Stand up".to_string(),
                description: None,
                priority: Priority::Silent,
                mode: ReminderMode::Once,
                recurring_mode: None,
                selected_days: Vec::new(),
                date: Some(1_704_274_200_000),
            })
            .expect("create reminder");

        let response = reconcile_preview_stored("[]".to_string());

        assert!(response.ok, "{}", response.message);
        assert_eq!(response.reschedule_ids, vec![created.id]);
    }
}
