//! FREQ=WEEKLY driver (spec §4.E "Weekly").

use chrono::{DateTime, Datelike, Duration, Timelike};
use chrono_tz::Tz;

use crate::datetime::{self, past_horizon, Unit};
use crate::options::RRuleOptions;

pub(crate) fn advance(
    opts: &RRuleOptions,
    start: DateTime<Tz>,
    cursor: DateTime<Tz>,
    n: u32,
) -> Option<DateTime<Tz>> {
    let step = i64::from(opts.interval) * i64::from(n);

    if opts.by_hour.is_empty() && opts.by_day.is_empty() {
        let (next, _) = datetime::add_wall(cursor, Unit::Weeks, step, start.time());
        return if past_horizon(next) { None } else { Some(next) };
    }

    step_filtered(opts, start, cursor, step)
}

fn step_filtered(
    opts: &RRuleOptions,
    start: DateTime<Tz>,
    mut cursor: DateTime<Tz>,
    step: i64,
) -> Option<DateTime<Tz>> {
    let weekdays: Vec<chrono::Weekday> = opts.by_day.iter().map(|n| n.weekday).collect();
    let stepping_hours = !opts.by_hour.is_empty();
    let extra_weeks = step - 1;
    let mut applied_extra = false;

    loop {
        if stepping_hours {
            cursor += Duration::hours(1);
        } else {
            cursor += Duration::days(1);
        }

        if past_horizon(cursor) {
            return None;
        }

        let crossed_week_start = cursor.weekday() == opts.week_start
            && (!stepping_hours || cursor.time() == chrono::NaiveTime::from_hms_opt(0, 0, 0).unwrap());

        if crossed_week_start && !applied_extra && extra_weeks > 0 {
            cursor += Duration::days(extra_weeks * 7);
            applied_extra = true;
        }

        // WEEKLY's implicit BYDAY is DTSTART's own weekday, not "any day" —
        // unlike DAILY, whose base cadence really is every day.
        let weekday_ok = if weekdays.is_empty() {
            cursor.weekday() == start.weekday()
        } else {
            weekdays.contains(&cursor.weekday())
        };
        let hour_ok = opts.by_hour.is_empty() || opts.by_hour.contains(&(cursor.hour() as u8));

        if weekday_ok && hour_ok {
            return Some(cursor);
        }
    }
}
