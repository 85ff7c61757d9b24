//! Reminder use-case service.
//!
//! # Responsibility
//! - Create reminders with generated stable ids.
//! - Stamp `date_modified` on every edit.
//!
//! # Invariants
//! - `date_modified` strictly increases on every update, even when the
//!   wall clock stalls or moves backwards.
//! - `id` and `date_created` never change after creation.

use crate::model::reminder::{Priority, RecurringMode, Reminder, ReminderMode};
use crate::repo::reminder_repo::{ReminderRepository, RepoError, RepoResult};
use uuid::Uuid;

/// Input for creating one reminder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderDraft {
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub mode: ReminderMode,
    pub recurring_mode: Option<RecurringMode>,
    pub selected_days: Vec<u8>,
    /// Epoch milliseconds.
    pub date: Option<i64>,
}

/// Use-case service wrapper for reminder records.
pub struct ReminderService<R: ReminderRepository> {
    repo: R,
    clock: fn() -> i64,
}

impl<R: ReminderRepository> ReminderService<R> {
    /// Service stamping edits with the system clock.
    pub fn new(repo: R) -> Self {
        Self::with_clock(repo, now_epoch_ms)
    }

    /// Service stamping edits with `clock` (epoch milliseconds).
    pub fn with_clock(repo: R, clock: fn() -> i64) -> Self {
        Self { repo, clock }
    }

    /// Persists a new reminder and returns the stored record.
    pub fn create_reminder(&self, draft: ReminderDraft) -> RepoResult<Reminder> {
        let now = (self.clock)();
        let reminder = Reminder {
            id: Uuid::new_v4().to_string(),
            title: draft.title,
            description: draft.description,
            priority: draft.priority,
            mode: draft.mode,
            recurring_mode: draft.recurring_mode,
            selected_days: draft.selected_days,
            date: draft.date,
            date_created: now,
            date_modified: now,
        };
        self.repo.create_reminder(&reminder)?;
        Ok(reminder)
    }

    /// Replaces an existing reminder and bumps its version stamp.
    ///
    /// `date_created` and `date_modified` from the input are ignored.
    pub fn update_reminder(&self, mut reminder: Reminder) -> RepoResult<Reminder> {
        let existing = self
            .repo
            .get_reminder(&reminder.id)?
            .ok_or_else(|| RepoError::NotFound(reminder.id.clone()))?;

        reminder.date_created = existing.date_created;
        reminder.date_modified = next_date_modified(existing.date_modified, (self.clock)());
        self.repo.update_reminder(&reminder)?;
        Ok(reminder)
    }

    pub fn get_reminder(&self, id: &str) -> RepoResult<Option<Reminder>> {
        self.repo.get_reminder(id)
    }

    pub fn list_reminders(&self) -> RepoResult<Vec<Reminder>> {
        self.repo.list_reminders()
    }

    pub fn delete_reminder(&self, id: &str) -> RepoResult<()> {
        self.repo.delete_reminder(id)
    }
}

/// Next version stamp: the clock, or one past `previous` if the clock lags.
pub fn next_date_modified(previous: i64, now: i64) -> i64 {
    now.max(previous.saturating_add(1))
}

fn now_epoch_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
