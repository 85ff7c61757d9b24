//! Reminder to scheduler reconciliation.
//!
//! # Responsibility
//! - Diff the desired trigger set (reminders) against the scheduler's live
//!   registrations and issue the minimal cancel/create calls.
//! - Sweep triggers owned by no known reminder.
//!
//! # Invariants
//! - Live triggers are re-read at the start of every pass; nothing is cached
//!   between passes.
//! - A reminder is rescheduled only when it owns no trigger or its first
//!   owned trigger carries a missing or older `dateModified` stamp.
//! - Failures are contained per reminder (and per orphan); one bad reminder
//!   never aborts the pass.
//! - After a pass a reminder is either fully scheduled or owns no triggers.
//! - Callers must serialize passes; overlapping passes may double-schedule.

use crate::config::EngineConfig;
use crate::model::notification::Notification;
use crate::model::reminder::{Reminder, ReminderValidationError};
use crate::model::trigger::{is_owned_by, TriggerSpec};
use crate::notifier::{Notifier, NotifierError, NotifierResult, RegisteredTrigger};
use crate::permission::PermissionGate;
use crate::planner::{plan, Plan};
use log::{debug, error, info, warn};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Per-reminder scheduling failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileError {
    Notifier(NotifierError),
    InvalidReminder(ReminderValidationError),
    /// Some planned triggers were rejected; the rest were rolled back.
    PartialSchedule {
        reminder_id: String,
        failed: usize,
        source: NotifierError,
    },
}

impl Display for ReconcileError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Notifier(err) => write!(f, "{err}"),
            Self::InvalidReminder(err) => write!(f, "invalid reminder: {err}"),
            Self::PartialSchedule {
                reminder_id,
                failed,
                source,
            } => write!(
                f,
                "{failed} trigger(s) of reminder `{reminder_id}` failed to register: {source}"
            ),
        }
    }
}

impl Error for ReconcileError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Notifier(err) => Some(err),
            Self::InvalidReminder(err) => Some(err),
            Self::PartialSchedule { source, .. } => Some(source),
        }
    }
}

impl From<NotifierError> for ReconcileError {
    fn from(value: NotifierError) -> Self {
        Self::Notifier(value)
    }
}

impl From<ReminderValidationError> for ReconcileError {
    fn from(value: ReminderValidationError) -> Self {
        Self::InvalidReminder(value)
    }
}

/// Result of (re)scheduling one reminder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleOutcome {
    Scheduled { created: usize },
    /// Permanent reminder shown as an ongoing notification.
    Displayed,
    /// Permission missing; retried on the next pass.
    Unauthorized,
    /// Reminder notifications are switched off by configuration.
    Disabled,
}

/// Counters for one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub up_to_date: usize,
    pub scheduled: usize,
    pub triggers_created: usize,
    pub displayed: usize,
    pub unauthorized: usize,
    pub disabled: usize,
    pub invalid: usize,
    pub failed: usize,
    pub swept: usize,
}

impl ReconcileReport {
    fn record(&mut self, outcome: ScheduleOutcome) {
        match outcome {
            ScheduleOutcome::Scheduled { created } => {
                self.scheduled += 1;
                self.triggers_created += created;
            }
            ScheduleOutcome::Displayed => self.displayed += 1,
            ScheduleOutcome::Unauthorized => self.unauthorized += 1,
            ScheduleOutcome::Disabled => self.disabled += 1,
        }
    }

    fn record_error(&mut self, err: &ReconcileError) {
        match err {
            ReconcileError::InvalidReminder(_) => self.invalid += 1,
            ReconcileError::Notifier(_) | ReconcileError::PartialSchedule { .. } => {
                self.failed += 1
            }
        }
    }
}

/// Reminder that needs (re)scheduling in this pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingReminder<'a> {
    pub reminder: &'a Reminder,
    /// Number of live triggers it currently owns.
    pub registered: usize,
}

/// Desired-versus-live comparison for one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileDiff<'a> {
    pub reschedule: Vec<PendingReminder<'a>>,
    pub up_to_date: Vec<&'a Reminder>,
    /// Live triggers owned by no known reminder.
    pub orphans: Vec<&'a RegisteredTrigger>,
}

/// Compares `reminders` with the scheduler's `registered` triggers.
///
/// Later reminders repeating an earlier id are ignored. Reminders that fail
/// validation own no triggers: they are always pending (and rejected when
/// planned), and their leftover triggers count as orphans.
pub fn diff<'a>(
    reminders: &'a [Reminder],
    registered: &'a [RegisteredTrigger],
) -> ReconcileDiff<'a> {
    let mut result = ReconcileDiff::default();
    let mut seen = HashSet::new();
    let mut first_seen = HashSet::new();
    let valid = reminders
        .iter()
        .filter(|reminder| first_seen.insert(reminder.id.as_str()))
        .filter(|reminder| reminder.validate().is_ok())
        .map(|reminder| reminder.id.as_str())
        .collect::<HashSet<_>>();

    for reminder in reminders {
        if !seen.insert(reminder.id.as_str()) {
            continue;
        }
        let owned = if valid.contains(reminder.id.as_str()) {
            registered
                .iter()
                .filter(|trigger| is_owned_by(&trigger.id, &reminder.id))
                .collect::<Vec<_>>()
        } else {
            Vec::new()
        };
        if needs_reschedule(reminder, &owned) {
            result.reschedule.push(PendingReminder {
                reminder,
                registered: owned.len(),
            });
        } else {
            result.up_to_date.push(reminder);
        }
    }

    result.orphans = registered
        .iter()
        .filter(|trigger| !valid.iter().any(|id| is_owned_by(&trigger.id, id)))
        .collect();

    result
}

/// Whether `reminder` must be rescheduled given the triggers it owns.
pub fn needs_reschedule(reminder: &Reminder, owned: &[&RegisteredTrigger]) -> bool {
    match owned.first() {
        None => true,
        Some(first) => first
            .date_modified()
            .map_or(true, |stamp| stamp < reminder.date_modified),
    }
}

/// Converges scheduler state towards a reminder set.
pub struct Reconciler<N: Notifier> {
    notifier: N,
    config: EngineConfig,
}

impl<N: Notifier> Reconciler<N> {
    /// Reconciler with default configuration.
    pub fn new(notifier: N) -> Self {
        Self::with_config(notifier, EngineConfig::default())
    }

    pub fn with_config(notifier: N, config: EngineConfig) -> Self {
        Self { notifier, config }
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Runs one reconciliation pass over the full reminder set.
    ///
    /// # Errors
    /// - Returns an error only when the live trigger list cannot be read;
    ///   nothing has been mutated in that case.
    pub async fn reconcile(&self, reminders: &[Reminder]) -> NotifierResult<ReconcileReport> {
        let started_at = Instant::now();
        info!(
            "event=reconcile module=reconciler status=start reminders={}",
            reminders.len()
        );

        let registered = match self.notifier.list_triggers().await {
            Ok(registered) => registered,
            Err(err) => {
                error!(
                    "event=reconcile module=reconciler status=error duration_ms={} error_code=list_failed error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                return Err(err);
            }
        };

        let diff = diff(reminders, &registered);
        let mut report = ReconcileReport {
            up_to_date: diff.up_to_date.len(),
            ..ReconcileReport::default()
        };
        let mut authorized = None;

        for pending in &diff.reschedule {
            let reminder_id = pending.reminder.id.as_str();
            match self
                .reschedule(pending.reminder, pending.registered > 0, &mut authorized)
                .await
            {
                Ok(outcome) => {
                    debug!(
                        "event=reminder_reconcile module=reconciler status=ok reminder_id={} outcome={:?}",
                        reminder_id, outcome
                    );
                    report.record(outcome);
                }
                Err(err) => {
                    warn!(
                        "event=reminder_reconcile module=reconciler status=error reminder_id={} error={}",
                        reminder_id, err
                    );
                    report.record_error(&err);
                }
            }
        }

        if self.config.sweep_orphans {
            for orphan in &diff.orphans {
                match self.notifier.cancel_trigger(&orphan.id).await {
                    Ok(()) => report.swept += 1,
                    Err(err) => {
                        warn!(
                            "event=orphan_sweep module=reconciler status=error trigger_id={} error={}",
                            orphan.id, err
                        );
                        report.failed += 1;
                    }
                }
            }
        }

        info!(
            "event=reconcile module=reconciler status=ok duration_ms={} up_to_date={} scheduled={} displayed={} unauthorized={} invalid={} failed={} swept={}",
            started_at.elapsed().as_millis(),
            report.up_to_date,
            report.scheduled,
            report.displayed,
            report.unauthorized,
            report.invalid,
            report.failed,
            report.swept
        );
        Ok(report)
    }

    /// Forces a reschedule of one reminder, e.g. right after an edit.
    pub async fn schedule(&self, reminder: &Reminder) -> Result<ScheduleOutcome, ReconcileError> {
        self.reschedule(reminder, true, &mut None).await
    }

    /// Cancels every trigger and the ongoing display of one reminder.
    pub async fn unschedule(&self, reminder_id: &str) -> NotifierResult<usize> {
        let cancelled = self.notifier.cancel_triggers_by_prefix(reminder_id).await?;
        self.notifier.cancel_displayed(reminder_id).await?;
        info!(
            "event=reminder_unschedule module=reconciler status=ok reminder_id={} cancelled={}",
            reminder_id, cancelled
        );
        Ok(cancelled)
    }

    /// Cancels every registered trigger.
    pub async fn clear_all_triggers(&self) -> NotifierResult<()> {
        self.notifier.cancel_all_triggers().await
    }

    /// Ids of all live triggers.
    pub async fn scheduled_trigger_ids(&self) -> NotifierResult<Vec<String>> {
        Ok(self
            .notifier
            .list_triggers()
            .await?
            .into_iter()
            .map(|trigger| trigger.id)
            .collect())
    }

    async fn reschedule(
        &self,
        reminder: &Reminder,
        has_registered: bool,
        authorized: &mut Option<bool>,
    ) -> Result<ScheduleOutcome, ReconcileError> {
        if !self.config.reminders_enabled {
            return Ok(ScheduleOutcome::Disabled);
        }

        if has_registered {
            let cancelled = self.notifier.cancel_triggers_by_prefix(&reminder.id).await?;
            debug!(
                "event=trigger_cancel module=reconciler status=ok reminder_id={} cancelled={}",
                reminder.id, cancelled
            );
        }

        let triggers = match plan(reminder)? {
            Plan::Ongoing => {
                self.notifier
                    .display(&Notification::ongoing_for(reminder))
                    .await?;
                return Ok(ScheduleOutcome::Displayed);
            }
            Plan::Triggers(triggers) => triggers,
        };

        // Only trigger registration is permission gated.
        if !self.is_authorized(authorized).await {
            return Ok(ScheduleOutcome::Unauthorized);
        }
        self.register(reminder, &triggers).await
    }

    async fn register(
        &self,
        reminder: &Reminder,
        triggers: &[TriggerSpec],
    ) -> Result<ScheduleOutcome, ReconcileError> {
        let mut created = 0;
        let mut failed = 0;
        let mut first_error = None;

        for trigger in triggers {
            let notification = Notification::for_trigger(reminder, trigger, "");
            match self.notifier.create_trigger(&notification, trigger).await {
                Ok(()) => created += 1,
                Err(err) => {
                    warn!(
                        "event=trigger_create module=reconciler status=error reminder_id={} trigger_id={} error={}",
                        reminder.id, trigger.id, err
                    );
                    failed += 1;
                    first_error.get_or_insert(err);
                }
            }
        }

        let Some(source) = first_error else {
            return Ok(ScheduleOutcome::Scheduled { created });
        };

        if created > 0 {
            if let Err(err) = self.notifier.cancel_triggers_by_prefix(&reminder.id).await {
                warn!(
                    "event=trigger_rollback module=reconciler status=error reminder_id={} error={}",
                    reminder.id, err
                );
            }
        }
        Err(ReconcileError::PartialSchedule {
            reminder_id: reminder.id.clone(),
            failed,
            source,
        })
    }

    /// Runs the permission gate at most once per pass.
    async fn is_authorized(&self, cached: &mut Option<bool>) -> bool {
        if let Some(authorized) = *cached {
            return authorized;
        }
        let authorized = PermissionGate::new(&self.notifier)
            .ensure_authorized()
            .await;
        *cached = Some(authorized);
        authorized
    }
}
