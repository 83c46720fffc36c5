//! FREQ=DAILY driver (spec §4.E "Daily").

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
        let (next, _) = datetime::add_wall(cursor, Unit::Days, step, start.time());
        return if past_horizon(next) { None } else { Some(next) };
    }

    step_filtered(opts, cursor, step)
}

/// Step one hour (if BYHOUR is present) or one day at a time until the
/// weekday/hour/month all match simultaneously, applying `(interval-1)`
/// whole days atomically on each day roll-over (spec §4.E).
fn step_filtered(opts: &RRuleOptions, mut cursor: DateTime<Tz>, step: i64) -> Option<DateTime<Tz>> {
    let weekdays: Vec<chrono::Weekday> = opts.by_day.iter().map(|n| n.weekday).collect();
    let stepping_hours = !opts.by_hour.is_empty();
    let extra_days = step - 1;
    let mut applied_extra = false;

    loop {
        if stepping_hours {
            cursor += Duration::hours(1);
            if cursor.hour() == 0 && !applied_extra && extra_days > 0 {
                cursor += Duration::days(extra_days);
                applied_extra = true;
            }
        } else {
            cursor += Duration::days(1);
            if !applied_extra && extra_days > 0 {
                cursor += Duration::days(extra_days);
                applied_extra = true;
            }
        }

        if past_horizon(cursor) {
            return None;
        }

        let weekday_ok = weekdays.is_empty() || weekdays.contains(&cursor.weekday());
        let hour_ok = opts.by_hour.is_empty() || opts.by_hour.contains(&(cursor.hour() as u8));
        let month_ok = opts.by_month.is_empty() || opts.by_month.contains(&(cursor.month() as u8));

        if weekday_ok && hour_ok && month_ok {
            return Some(cursor);
        }
    }
}
