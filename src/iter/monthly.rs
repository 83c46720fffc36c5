//! FREQ=MONTHLY driver (spec §4.E "Monthly").

use chrono::{DateTime, Datelike, Duration, Timelike};
use chrono_tz::Tz;

use crate::datetime::{self, past_horizon};
use crate::monthinfo::month_candidates;
use crate::options::RRuleOptions;

pub(crate) fn advance(
    opts: &RRuleOptions,
    start: DateTime<Tz>,
    cursor: DateTime<Tz>,
    n: u32,
) -> Option<DateTime<Tz>> {
    let step = i64::from(opts.interval) * i64::from(n);

    if opts.by_month_day.is_empty() && opts.by_day.is_empty() {
        return plain_monthly(start, cursor, step);
    }

    let mut year = cursor.year();
    let mut month = cursor.month();
    let mut floor = (cursor.day(), cursor.hour(), cursor.minute(), cursor.second());
    let mut first_pass = true;

    loop {
        let candidates = month_candidates(opts, start, year, month, start.day());
        let next = if first_pass {
            candidates.into_iter().find(|&c| c > floor)
        } else {
            candidates.into_iter().next()
        };
        first_pass = false;

        if let Some((d, h, mi, s)) = next {
            let date = chrono::NaiveDate::from_ymd_opt(year, month, d)?;
            let time = chrono::NaiveTime::from_hms_opt(h, mi, s)?;
            let (dt, _) = datetime::localize_forward(cursor.timezone(), chrono::NaiveDateTime::new(date, time));
            return if past_horizon(dt) { None } else { Some(dt) };
        }

        // No candidate left in this month; roll to the first of month, step
        // `interval` months ahead, and reset the comparison floor.
        let first_of_month = chrono::NaiveDate::from_ymd_opt(year, month, 1)?;
        let advanced = datetime::add_months(first_of_month, step);
        year = advanced.year();
        month = advanced.month();
        floor = (0, 0, 0, 0);

        if year > 9999 {
            return None;
        }
    }
}

fn plain_monthly(start: DateTime<Tz>, cursor: DateTime<Tz>, step: i64) -> Option<DateTime<Tz>> {
    let start_day = start.day();
    let tz = cursor.timezone();
    let mut probe_month = cursor.month0() as i64 + i64::from(cursor.year()) * 12;

    loop {
        probe_month += step;
        let year = (probe_month.div_euclid(12)) as i32;
        if year > 9999 {
            return None;
        }
        let month = probe_month.rem_euclid(12) as u32 + 1;
        if start_day < 29 || datetime::month_has_day(year, month, start_day) {
            let date = chrono::NaiveDate::from_ymd_opt(year, month, start_day)?;
            let naive = chrono::NaiveDateTime::new(date, start.time());
            let (dt, _) = datetime::localize_forward(tz, naive);
            return if past_horizon(dt) { None } else { Some(dt) };
        }
        // start day-of-month doesn't exist this month (e.g. day 31); probe
        // the next one (spec §4.E "probe successively").
    }
}
