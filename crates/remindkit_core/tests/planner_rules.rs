use chrono::{FixedOffset, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Utc};
use remindkit_core::{
    plan_in, Plan, Priority, RecurringMode, Reminder, ReminderMode, ReminderValidationError,
    RepeatFrequency, TriggerSpec,
};

fn utc_ms(y: i32, m: u32, d: u32, h: u32, min: u32) -> i64 {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0)
        .unwrap()
        .timestamp_millis()
}

/// Wednesday 2024-01-03 09:30 UTC.
fn anchor() -> i64 {
    utc_ms(2024, 1, 3, 9, 30)
}

fn reminder(id: &str, mode: ReminderMode) -> Reminder {
    Reminder {
        id: id.to_string(),
        title: "Standup".to_string(),
        description: None,
        priority: Priority::Vibrate,
        mode,
        recurring_mode: None,
        selected_days: Vec::new(),
        date: Some(anchor()),
        date_created: 1,
        date_modified: 42,
    }
}

fn repeat(id: &str, recurring_mode: RecurringMode, days: &[u8]) -> Reminder {
    let mut reminder = reminder(id, ReminderMode::Repeat);
    reminder.recurring_mode = Some(recurring_mode);
    reminder.selected_days = days.to_vec();
    reminder
}

fn triggers(reminder: &Reminder) -> Vec<TriggerSpec> {
    match plan_in(reminder, &Utc).unwrap() {
        Plan::Triggers(triggers) => triggers,
        Plan::Ongoing => panic!("expected triggers for `{}`", reminder.id),
    }
}

#[test]
fn once_yields_single_trigger_at_date_without_repeat() {
    let planned = triggers(&reminder("r1", ReminderMode::Once));

    assert_eq!(planned.len(), 1);
    assert_eq!(planned[0].id, "r1");
    assert_eq!(planned[0].reminder_id, "r1");
    assert_eq!(planned[0].fire_at_ms, anchor());
    assert_eq!(planned[0].repeat, None);
    assert_eq!(planned[0].date_modified, 42);
    assert!(planned[0].allow_while_idle);
}

#[test]
fn daily_repeat_yields_single_daily_trigger() {
    let planned = triggers(&repeat("r1", RecurringMode::Day, &[]));

    assert_eq!(planned.len(), 1);
    assert_eq!(planned[0].id, "r1");
    assert_eq!(planned[0].fire_at_ms, anchor());
    assert_eq!(planned[0].repeat, Some(RepeatFrequency::Daily));
}

#[test]
fn full_week_collapses_to_one_daily_trigger() {
    let planned = triggers(&repeat("r1", RecurringMode::Week, &[0, 1, 2, 3, 4, 5, 6]));

    assert_eq!(planned.len(), 1);
    assert_eq!(planned[0].id, "r1");
    assert_eq!(planned[0].fire_at_ms, anchor());
    assert_eq!(planned[0].repeat, Some(RepeatFrequency::Daily));
}

#[test]
fn selected_weekdays_yield_one_weekly_trigger_per_day() {
    let planned = triggers(&repeat("r1", RecurringMode::Week, &[3, 1]));

    let ids = planned.iter().map(|t| t.id.as_str()).collect::<Vec<_>>();
    assert_eq!(ids, vec!["r1_1", "r1_3"]);
    assert!(planned
        .iter()
        .all(|t| t.repeat == Some(RepeatFrequency::Weekly) && t.date_modified == 42));
    // Monday after the Wednesday anchor, and the anchor day itself.
    assert_eq!(planned[0].fire_at_ms, utc_ms(2024, 1, 8, 9, 30));
    assert_eq!(planned[1].fire_at_ms, anchor());
}

#[test]
fn duplicate_and_partial_week_is_not_collapsed() {
    let planned = triggers(&repeat("r1", RecurringMode::Week, &[1, 1, 2, 3, 4, 5, 6]));
    assert_eq!(planned.len(), 6);
    assert!(planned.iter().all(|t| t.id != "r1"));
}

#[test]
fn full_month_collapses_to_one_daily_trigger() {
    let all_days = (1..=31).collect::<Vec<u8>>();
    let planned = triggers(&repeat("r1", RecurringMode::Month, &all_days));

    assert_eq!(planned.len(), 1);
    assert_eq!(planned[0].id, "r1");
    assert_eq!(planned[0].repeat, Some(RepeatFrequency::Daily));
}

#[test]
fn month_days_anchor_to_next_occurrence_and_repeat_weekly() {
    let mut reminder = repeat("m", RecurringMode::Month, &[31, 5]);
    reminder.date = Some(utc_ms(2024, 2, 10, 8, 0));
    let planned = triggers(&reminder);

    let ids = planned.iter().map(|t| t.id.as_str()).collect::<Vec<_>>();
    assert_eq!(ids, vec!["m_5", "m_31"]);
    assert_eq!(planned[0].fire_at_ms, utc_ms(2024, 3, 5, 8, 0));
    assert_eq!(planned[1].fire_at_ms, utc_ms(2024, 3, 31, 8, 0));
    assert!(planned
        .iter()
        .all(|t| t.repeat == Some(RepeatFrequency::Weekly)));
}

#[test]
fn permanent_yields_ongoing_plan() {
    let mut reminder = reminder("r2", ReminderMode::Permanent);
    reminder.date = None;
    assert_eq!(plan_in(&reminder, &Utc).unwrap(), Plan::Ongoing);
}

#[test]
fn weekday_is_resolved_in_the_given_timezone() {
    // Tuesday 20:00 UTC is Wednesday 05:00 at UTC+9.
    let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();
    let mut reminder = repeat("tz", RecurringMode::Week, &[3]);
    reminder.date = Some(utc_ms(2024, 1, 2, 20, 0));

    let local = match plan_in(&reminder, &tokyo).unwrap() {
        Plan::Triggers(triggers) => triggers,
        Plan::Ongoing => panic!("expected triggers"),
    };
    assert_eq!(local[0].fire_at_ms, utc_ms(2024, 1, 2, 20, 0));

    let in_utc = triggers(&reminder);
    assert_eq!(in_utc[0].fire_at_ms, utc_ms(2024, 1, 3, 20, 0));
}

#[test]
fn malformed_reminders_fail_closed() {
    let err = plan_in(&repeat("w", RecurringMode::Week, &[]), &Utc).unwrap_err();
    assert_eq!(
        err,
        ReminderValidationError::EmptySelectedDays(RecurringMode::Week)
    );

    let err = plan_in(&repeat("w", RecurringMode::Week, &[7]), &Utc).unwrap_err();
    assert_eq!(
        err,
        ReminderValidationError::DayOutOfRange {
            recurring_mode: RecurringMode::Week,
            day: 7,
        }
    );

    let mut no_date = reminder("o", ReminderMode::Once);
    no_date.date = None;
    assert_eq!(
        plan_in(&no_date, &Utc).unwrap_err(),
        ReminderValidationError::MissingDate(ReminderMode::Once)
    );

    let mut no_recurrence = reminder("x", ReminderMode::Repeat);
    no_recurrence.recurring_mode = None;
    assert_eq!(
        plan_in(&no_recurrence, &Utc).unwrap_err(),
        ReminderValidationError::MissingRecurringMode
    );
}

/// UTC+1 that jumps to UTC+2 at 2024-03-31 01:00 UTC, skipping local
/// 02:00..03:00.
#[derive(Debug, Clone, Copy)]
struct SpringForward;

impl SpringForward {
    fn winter() -> FixedOffset {
        FixedOffset::east_opt(3600).unwrap()
    }

    fn summer() -> FixedOffset {
        FixedOffset::east_opt(2 * 3600).unwrap()
    }

    fn local(h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 31)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }
}

impl TimeZone for SpringForward {
    type Offset = FixedOffset;

    fn from_offset(_offset: &FixedOffset) -> Self {
        SpringForward
    }

    fn offset_from_local_date(&self, local: &NaiveDate) -> LocalResult<FixedOffset> {
        self.offset_from_local_datetime(&local.and_hms_opt(0, 0, 0).unwrap())
    }

    fn offset_from_local_datetime(&self, local: &NaiveDateTime) -> LocalResult<FixedOffset> {
        if *local < Self::local(2) {
            LocalResult::Single(Self::winter())
        } else if *local < Self::local(3) {
            LocalResult::None
        } else {
            LocalResult::Single(Self::summer())
        }
    }

    fn offset_from_utc_date(&self, utc: &NaiveDate) -> FixedOffset {
        self.offset_from_utc_datetime(&utc.and_hms_opt(0, 0, 0).unwrap())
    }

    fn offset_from_utc_datetime(&self, utc: &NaiveDateTime) -> FixedOffset {
        if *utc < Self::local(1) {
            Self::winter()
        } else {
            Self::summer()
        }
    }
}

#[test]
fn wall_time_inside_dst_gap_moves_forward_one_hour() {
    // Saturday 2024-03-30 02:30 local (UTC+1).
    let mut reminder = repeat("dst", RecurringMode::Week, &[0, 6]);
    reminder.date = Some(utc_ms(2024, 3, 30, 1, 30));

    let planned = match plan_in(&reminder, &SpringForward).unwrap() {
        Plan::Triggers(triggers) => triggers,
        Plan::Ongoing => panic!("expected triggers"),
    };

    // Sunday 02:30 does not exist; it fires at 03:30 local (UTC+2).
    assert_eq!(planned[0].id, "dst_0");
    assert_eq!(planned[0].fire_at_ms, utc_ms(2024, 3, 31, 1, 30));
    assert_eq!(planned[1].id, "dst_6");
    assert_eq!(planned[1].fire_at_ms, utc_ms(2024, 3, 30, 1, 30));
}
