//! Reminder to trigger planning.
//!
//! # Responsibility
//! - Derive the ordered trigger set for one reminder. No I/O.
//!
//! # Invariants
//! - Permanent reminders yield [`Plan::Ongoing`], never triggers.
//! - A full week (7 days) or full month (31 days) selection collapses to a
//!   single daily trigger with the plain reminder id.
//! - Per-day triggers fire at the next occurrence of their day, on or after
//!   the reminder date, at the reminder's local time-of-day.
//! - Month per-day triggers repeat weekly, not monthly (see DESIGN.md).
//! - Every trigger carries the reminder's `date_modified`.
//! - Malformed reminders produce an error and no triggers.

use crate::model::reminder::{Reminder, ReminderValidationError, Schedule};
use crate::model::reminder::{DAYS_IN_MONTH, DAYS_IN_WEEK};
use crate::model::trigger::{trigger_id, RepeatFrequency, TriggerSpec};
use chrono::{Datelike, Days, Duration, Local, NaiveDate, NaiveDateTime, TimeZone};
use std::collections::BTreeSet;

/// Months scanned when looking for the next month with a given day.
const MONTH_SEARCH_LIMIT: u32 = 13;

/// Planning outcome for one reminder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plan {
    /// Triggers to register, ordered by day discriminator.
    Triggers(Vec<TriggerSpec>),
    /// Display an ongoing notification instead of scheduling.
    Ongoing,
}

impl Plan {
    pub fn triggers(&self) -> &[TriggerSpec] {
        match self {
            Self::Triggers(triggers) => triggers,
            Self::Ongoing => &[],
        }
    }
}

/// Plans triggers using the host's local timezone.
pub fn plan(reminder: &Reminder) -> Result<Plan, ReminderValidationError> {
    plan_in(reminder, &Local)
}

/// Plans triggers with time-of-day anchoring in `tz`.
pub fn plan_in<Tz: TimeZone>(
    reminder: &Reminder,
    tz: &Tz,
) -> Result<Plan, ReminderValidationError> {
    let stamp = reminder.date_modified;
    let single = |at: i64, repeat: Option<RepeatFrequency>| TriggerSpec {
        id: trigger_id(&reminder.id, None),
        reminder_id: reminder.id.clone(),
        fire_at_ms: at,
        repeat,
        date_modified: stamp,
        allow_while_idle: true,
    };

    let triggers = match reminder.schedule()? {
        Schedule::Permanent => return Ok(Plan::Ongoing),
        Schedule::Once { at } => vec![single(at, None)],
        Schedule::Daily { anchor } => vec![single(anchor, Some(RepeatFrequency::Daily))],
        Schedule::Weekly { anchor, days } if days.len() == DAYS_IN_WEEK => {
            vec![single(anchor, Some(RepeatFrequency::Daily))]
        }
        Schedule::Weekly { anchor, days } => {
            per_day(reminder, &days, |day| next_weekday(anchor, day, tz))?
        }
        Schedule::Monthly { anchor, days } if days.len() == DAYS_IN_MONTH => {
            vec![single(anchor, Some(RepeatFrequency::Daily))]
        }
        Schedule::Monthly { anchor, days } => {
            per_day(reminder, &days, |day| next_month_day(anchor, day, tz))?
        }
    };

    Ok(Plan::Triggers(triggers))
}

fn per_day(
    reminder: &Reminder,
    days: &BTreeSet<u8>,
    fire_at: impl Fn(u8) -> Option<i64>,
) -> Result<Vec<TriggerSpec>, ReminderValidationError> {
    days.iter()
        .map(|&day| {
            let at = fire_at(day).ok_or_else(|| {
                ReminderValidationError::InvalidDate(reminder.date.unwrap_or_default())
            })?;
            Ok(TriggerSpec {
                id: trigger_id(&reminder.id, Some(day)),
                reminder_id: reminder.id.clone(),
                fire_at_ms: at,
                repeat: Some(RepeatFrequency::Weekly),
                date_modified: reminder.date_modified,
                allow_while_idle: true,
            })
        })
        .collect()
}

/// Next `weekday` (0 = Sunday) on or after `anchor_ms`, at its local time.
fn next_weekday<Tz: TimeZone>(anchor_ms: i64, weekday: u8, tz: &Tz) -> Option<i64> {
    let local = tz.timestamp_millis_opt(anchor_ms).single()?.naive_local();
    let current = local.date().weekday().num_days_from_sunday();
    let delta = (u32::from(weekday) + 7 - current) % 7;
    let date = local.date().checked_add_days(Days::new(u64::from(delta)))?;
    resolve_local(tz, date.and_time(local.time()))
}

/// Next month containing `day`, on or after `anchor_ms`, at its local time.
fn next_month_day<Tz: TimeZone>(anchor_ms: i64, day: u8, tz: &Tz) -> Option<i64> {
    let local = tz.timestamp_millis_opt(anchor_ms).single()?.naive_local();
    let (mut year, mut month) = (local.year(), local.month());

    for _ in 0..MONTH_SEARCH_LIMIT {
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, u32::from(day)) {
            let candidate = resolve_local(tz, date.and_time(local.time()))?;
            if candidate >= anchor_ms {
                return Some(candidate);
            }
        }
        (year, month) = if month == 12 {
            (year + 1, 1)
        } else {
            (year, month + 1)
        };
    }
    None
}

/// Maps a local wall-clock time to epoch ms; times inside a DST gap move
/// forward by one hour.
fn resolve_local<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> Option<i64> {
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(naive + Duration::hours(1))).earliest())
        .map(|at| at.timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::{next_month_day, next_weekday};
    use chrono::{TimeZone, Utc};

    fn utc_ms(y: i32, m: u32, d: u32, h: u32, min: u32) -> i64 {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0)
            .unwrap()
            .timestamp_millis()
    }

    #[test]
    fn next_weekday_keeps_same_day_when_matching() {
        // 2024-01-03 is a Wednesday.
        let anchor = utc_ms(2024, 1, 3, 9, 30);
        assert_eq!(next_weekday(anchor, 3, &Utc), Some(anchor));
    }

    #[test]
    fn next_weekday_rolls_forward_past_week_end() {
        let anchor = utc_ms(2024, 1, 3, 9, 30);
        assert_eq!(next_weekday(anchor, 1, &Utc), Some(utc_ms(2024, 1, 8, 9, 30)));
        assert_eq!(next_weekday(anchor, 0, &Utc), Some(utc_ms(2024, 1, 7, 9, 30)));
    }

    #[test]
    fn next_month_day_skips_months_without_that_day() {
        let anchor = utc_ms(2024, 2, 10, 8, 0);
        assert_eq!(
            next_month_day(anchor, 30, &Utc),
            Some(utc_ms(2024, 3, 30, 8, 0))
        );
        assert_eq!(
            next_month_day(anchor, 5, &Utc),
            Some(utc_ms(2024, 3, 5, 8, 0))
        );
        assert_eq!(next_month_day(anchor, 10, &Utc), Some(anchor));
    }
}
