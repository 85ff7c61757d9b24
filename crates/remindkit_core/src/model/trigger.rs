//! Trigger specifications and trigger-id grammar.
//!
//! # Responsibility
//! - Define the transient trigger value produced by the planner.
//! - Own the `<reminderId>` / `<reminderId>_<day>` id grammar and the
//!   anchored ownership check built on it.
//!
//! # Invariants
//! - A trigger id is owned by exactly the reminder whose id it equals, or
//!   whose id it extends with `_` followed by decimal digits only.
//! - Reminder ids never end in `_<digits>` themselves, so no trigger id is
//!   claimed by two reminders.
//! - Raw string-prefix comparison is never used for ownership: `r10` and
//!   `r1_x` are not owned by `r1`.

use serde::{Deserialize, Serialize};

/// Separator between reminder id and day discriminator.
pub const TRIGGER_DAY_SEPARATOR: char = '_';

/// Repeat cadence understood by the notification scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepeatFrequency {
    Daily,
    Weekly,
}

/// One concrete, schedulable trigger derived from a reminder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerSpec {
    /// `<reminderId>` or `<reminderId>_<day>`.
    pub id: String,
    pub reminder_id: String,
    /// Unix epoch milliseconds of the first fire.
    pub fire_at_ms: i64,
    /// `None` for one-shot triggers.
    pub repeat: Option<RepeatFrequency>,
    /// Owning reminder's `date_modified` at planning time.
    pub date_modified: i64,
    /// Fire even while the device is idle.
    pub allow_while_idle: bool,
}

/// Builds the trigger id for a reminder and optional day discriminator.
pub fn trigger_id(reminder_id: &str, day: Option<u8>) -> String {
    match day {
        Some(day) => format!("{reminder_id}{TRIGGER_DAY_SEPARATOR}{day}"),
        None => reminder_id.to_string(),
    }
}

/// Returns whether `trigger_id` belongs to `reminder_id`.
pub fn is_owned_by(trigger_id: &str, reminder_id: &str) -> bool {
    if reminder_id.is_empty() {
        return false;
    }
    match trigger_id.strip_prefix(reminder_id) {
        Some("") => true,
        Some(rest) => rest
            .strip_prefix(TRIGGER_DAY_SEPARATOR)
            .is_some_and(is_day_digits),
        None => false,
    }
}

/// Whether `id` ends in the reserved `_<digits>` per-day suffix.
pub fn has_day_suffix(id: &str) -> bool {
    id.rsplit_once(TRIGGER_DAY_SEPARATOR)
        .is_some_and(|(_, day)| is_day_digits(day))
}

fn is_day_digits(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}

/// Extracts the day discriminator of a trigger owned by `reminder_id`.
pub fn day_of(trigger_id: &str, reminder_id: &str) -> Option<u8> {
    if !is_owned_by(trigger_id, reminder_id) {
        return None;
    }
    trigger_id
        .strip_prefix(reminder_id)?
        .strip_prefix(TRIGGER_DAY_SEPARATOR)?
        .parse()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::{day_of, has_day_suffix, is_owned_by, trigger_id};

    #[test]
    fn builds_plain_and_day_ids() {
        assert_eq!(trigger_id("r1", None), "r1");
        assert_eq!(trigger_id("r1", Some(3)), "r1_3");
    }

    #[test]
    fn ownership_is_anchored() {
        assert!(is_owned_by("r1", "r1"));
        assert!(is_owned_by("r1_5", "r1"));
        assert!(is_owned_by("r1_31", "r1"));
        assert!(!is_owned_by("r10", "r1"));
        assert!(!is_owned_by("r10_2", "r1"));
        assert!(!is_owned_by("r1_", "r1"));
        assert!(!is_owned_by("r1_x", "r1"));
        assert!(!is_owned_by("r1", ""));
    }

    #[test]
    fn day_of_reads_suffix() {
        assert_eq!(day_of("r1_4", "r1"), Some(4));
        assert_eq!(day_of("r1", "r1"), None);
        assert_eq!(day_of("r10_4", "r1"), None);
    }

    #[test]
    fn day_suffix_detection() {
        assert!(has_day_suffix("a_1"));
        assert!(has_day_suffix("a_b_12"));
        assert!(!has_day_suffix("a_"));
        assert!(!has_day_suffix("a_1b"));
        assert!(!has_day_suffix("a1"));
    }
}
