//! Reminder domain model.
//!
//! # Responsibility
//! - Define the flat reminder record exchanged with the reminder store.
//! - Convert the flat `mode`/`recurringMode`/`selectedDays` fields into a
//!   validated [`Schedule`] variant.
//!
//! # Invariants
//! - `id` is non-empty and stable for the reminder lifetime.
//! - `id` never ends in `_<digits>`; that suffix is reserved for per-day
//!   trigger ids.
//! - `date_modified` is the reconciliation version stamp; it must strictly
//!   increase on every edit.
//! - Week days use `0..=6` with `0 = Sunday`; month days use `1..=31`.

use crate::model::trigger::has_day_suffix;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable external identifier of a reminder.
pub type ReminderId = String;

/// Number of weekdays covered by a full week selection.
pub const DAYS_IN_WEEK: usize = 7;
/// Number of month days covered by a full month selection.
pub const DAYS_IN_MONTH: usize = 31;

/// Delivery priority of a reminder notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Delivered without sound or vibration.
    Silent,
    /// Delivered with vibration only.
    #[default]
    Vibrate,
    /// Delivered with vibration and the default alert sound.
    Urgent,
}

/// Top-level reminder mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderMode {
    Once,
    Repeat,
    /// Shown as an ongoing notification instead of a trigger.
    Permanent,
}

/// Recurrence shape for `ReminderMode::Repeat`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecurringMode {
    Day,
    Week,
    Month,
}

/// Reminder record as provided by the reminder store.
///
/// Serialized with camelCase keys to match the store/bridge schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    pub id: ReminderId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Priority,
    pub mode: ReminderMode,
    /// Meaningful only when `mode == Repeat`.
    #[serde(default)]
    pub recurring_mode: Option<RecurringMode>,
    /// Meaningful only for week/month recurrences.
    #[serde(default)]
    pub selected_days: Vec<u8>,
    /// Unix epoch milliseconds. Anchor for once/repeat; unused for permanent.
    #[serde(default)]
    pub date: Option<i64>,
    /// Unix epoch milliseconds.
    #[serde(default)]
    pub date_created: i64,
    /// Unix epoch milliseconds, bumped on every edit.
    pub date_modified: i64,
}

/// Validated recurrence shape, one payload per case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Schedule {
    Once { at: i64 },
    Daily { anchor: i64 },
    Weekly { anchor: i64, days: BTreeSet<u8> },
    Monthly { anchor: i64, days: BTreeSet<u8> },
    Permanent,
}

/// Reminder validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReminderValidationError {
    EmptyId,
    /// Id ends in `_<digits>` and would collide with another reminder's
    /// per-day trigger ids.
    ReservedIdSuffix(String),
    MissingDate(ReminderMode),
    MissingRecurringMode,
    EmptySelectedDays(RecurringMode),
    DayOutOfRange { recurring_mode: RecurringMode, day: u8 },
    InvalidDate(i64),
}

impl Display for ReminderValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyId => write!(f, "reminder id must not be empty"),
            Self::ReservedIdSuffix(id) => write!(
                f,
                "reminder id `{id}` ends in a reserved `_<day>` trigger suffix"
            ),
            Self::MissingDate(mode) => {
                write!(f, "reminder mode `{}` requires a date", mode_label(*mode))
            }
            Self::MissingRecurringMode => {
                write!(f, "repeat reminders require a recurring mode")
            }
            Self::EmptySelectedDays(recurring_mode) => write!(
                f,
                "recurring mode `{}` requires at least one selected day",
                recurring_mode_label(*recurring_mode)
            ),
            Self::DayOutOfRange {
                recurring_mode,
                day,
            } => write!(
                f,
                "selected day {day} is out of range for recurring mode `{}`",
                recurring_mode_label(*recurring_mode)
            ),
            Self::InvalidDate(value) => write!(f, "reminder date {value} is not representable"),
        }
    }
}

impl Error for ReminderValidationError {}

impl Reminder {
    /// Creates a one-shot reminder with a generated id.
    ///
    /// `date_created` and `date_modified` are both set to `now_ms`.
    pub fn once(title: impl Into<String>, at: i64, now_ms: i64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            description: None,
            priority: Priority::default(),
            mode: ReminderMode::Once,
            recurring_mode: None,
            selected_days: Vec::new(),
            date: Some(at),
            date_created: now_ms,
            date_modified: now_ms,
        }
    }

    /// Validates the id and recurrence fields.
    pub fn validate(&self) -> Result<(), ReminderValidationError> {
        self.schedule().map(|_| ())
    }

    /// Converts the flat recurrence fields into a [`Schedule`].
    ///
    /// Duplicate selected days are merged. Fields irrelevant to the mode
    /// are ignored.
    pub fn schedule(&self) -> Result<Schedule, ReminderValidationError> {
        if self.id.trim().is_empty() {
            return Err(ReminderValidationError::EmptyId);
        }
        if has_day_suffix(&self.id) {
            return Err(ReminderValidationError::ReservedIdSuffix(self.id.clone()));
        }

        match self.mode {
            ReminderMode::Permanent => Ok(Schedule::Permanent),
            ReminderMode::Once => Ok(Schedule::Once {
                at: self.require_date()?,
            }),
            ReminderMode::Repeat => {
                let anchor = self.require_date()?;
                match self
                    .recurring_mode
                    .ok_or(ReminderValidationError::MissingRecurringMode)?
                {
                    RecurringMode::Day => Ok(Schedule::Daily { anchor }),
                    RecurringMode::Week => Ok(Schedule::Weekly {
                        anchor,
                        days: self.collect_days(RecurringMode::Week, 0..=6)?,
                    }),
                    RecurringMode::Month => Ok(Schedule::Monthly {
                        anchor,
                        days: self.collect_days(RecurringMode::Month, 1..=31)?,
                    }),
                }
            }
        }
    }

    fn require_date(&self) -> Result<i64, ReminderValidationError> {
        let date = self
            .date
            .ok_or(ReminderValidationError::MissingDate(self.mode))?;
        if chrono::DateTime::<chrono::Utc>::from_timestamp_millis(date).is_none() {
            return Err(ReminderValidationError::InvalidDate(date));
        }
        Ok(date)
    }

    fn collect_days(
        &self,
        recurring_mode: RecurringMode,
        range: std::ops::RangeInclusive<u8>,
    ) -> Result<BTreeSet<u8>, ReminderValidationError> {
        if self.selected_days.is_empty() {
            return Err(ReminderValidationError::EmptySelectedDays(recurring_mode));
        }
        let mut days = BTreeSet::new();
        for &day in &self.selected_days {
            if !range.contains(&day) {
                return Err(ReminderValidationError::DayOutOfRange {
                    recurring_mode,
                    day,
                });
            }
            days.insert(day);
        }
        Ok(days)
    }
}

/// Stable lowercase label for a reminder mode.
pub fn mode_label(mode: ReminderMode) -> &'static str {
    match mode {
        ReminderMode::Once => "once",
        ReminderMode::Repeat => "repeat",
        ReminderMode::Permanent => "permanent",
    }
}

/// Stable lowercase label for a recurring mode.
pub fn recurring_mode_label(recurring_mode: RecurringMode) -> &'static str {
    match recurring_mode {
        RecurringMode::Day => "day",
        RecurringMode::Week => "week",
        RecurringMode::Month => "month",
    }
}
