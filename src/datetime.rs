//! Broken-down calendar arithmetic: month lengths, leap years, weekday-of,
//! ISO week numbering, and wall-clock-preserving date addition across DST.
//!
//! Everything here is a pure function over `chrono` primitives. Frequency
//! drivers (`crate::iter::*`) lean on these instead of doing their own date
//! math so that the one tricky bit — re-applying the anchor's wall-clock
//! time-of-day after adding "whole" units, and forwarding past a DST gap when
//! that wall time doesn't exist — only has to be gotten right once.

use chrono::{DateTime, Datelike, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use chrono_tz::Tz;

/// The instant beyond which the engine produces no occurrences.
///
/// `9999-12-31T23:59:59Z`, expressed as a Unix timestamp, per §6 of the spec.
pub const HORIZON_TIMESTAMP: i64 = 253_402_300_799;

/// Granularity for [`add_wall`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Years,
    Months,
    Weeks,
    Days,
}

/// `true` iff `year` is a Gregorian leap year.
pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of days in `(year, month)`. `month` is 1-indexed.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => panic!("month out of range: {month}"),
    }
}

/// Number of days in `year` (365 or 366).
pub fn days_in_year(year: i32) -> u32 {
    if is_leap_year(year) {
        366
    } else {
        365
    }
}

/// Weekday of `date`, using the domain convention Sunday=0 .. Saturday=6.
pub fn weekday_of(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}

/// ISO-8601 weekday of `date`, Monday=1 .. Sunday=7.
pub fn iso_week_day_of(date: NaiveDate) -> u8 {
    date.weekday().number_from_monday() as u8
}

/// Construct a date from an ISO 8601 (year, week, weekday) triple.
///
/// `weekday_1_7` follows [`iso_week_day_of`]'s convention (Monday=1). Week 1
/// is the week containing the first Thursday of `year`.
pub fn set_iso_week(year: i32, week: u32, weekday_1_7: u8) -> Option<NaiveDate> {
    // The ISO week-1 Monday is the Monday on or before Jan 4th.
    let jan4 = NaiveDate::from_ymd_opt(year, 1, 4)?;
    let week1_monday = jan4 - Duration::days(i64::from(iso_week_day_of(jan4)) - 1);
    let offset = i64::from(week - 1) * 7 + i64::from(weekday_1_7) - 1;
    Some(week1_monday + Duration::days(offset))
}

/// Number of ISO weeks in `year` (52 or 53).
pub fn iso_weeks_in_year(year: i32) -> u32 {
    let dec31 = NaiveDate::from_ymd_opt(year, 12, 31).expect("valid date");
    let week_of_dec31 = dec31.iso_week().week();
    // If Dec 31 belongs to week 1 (of the *next* year), the last week of
    // `year` is the one before it.
    if week_of_dec31 == 1 {
        let dec24 = dec31 - Duration::days(7);
        dec24.iso_week().week()
    } else {
        week_of_dec31
    }
}

/// The first legal instant on/after `date` at `time` in `tz` — forwarding a
/// nonexistent (DST gap) local time to the next instant that does exist.
/// For an ambiguous local time (DST fall-back), the earlier of the two
/// possible instants is returned. Returns the localized instant and the
/// number of whole hours that were forwarded past a gap (0 if none).
pub fn localize_forward(tz: Tz, naive: NaiveDateTime) -> (DateTime<Tz>, i64) {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => (dt, 0),
        LocalResult::Ambiguous(earliest, _latest) => (earliest, 0),
        LocalResult::None => {
            // Standard DST gaps are an hour; walk forward hour by hour and
            // bail out well past any transition this calendar could produce.
            for hours in 1..=48i64 {
                let probe = naive + Duration::hours(hours);
                match tz.from_local_datetime(&probe) {
                    LocalResult::Single(dt) => return (dt, hours),
                    LocalResult::Ambiguous(dt, _) => return (dt, hours),
                    LocalResult::None => continue,
                }
            }
            // Unreachable for real tzdata; fall back to a UTC interpretation
            // rather than panic.
            let utc = chrono::Utc.from_utc_datetime(&naive);
            (utc.with_timezone(&tz), 48)
        }
    }
}

/// Advance `dt` by `n` units of `unit`, then re-apply `wall_time` as the
/// time-of-day (the anchor's time-of-day, unless overridden by
/// BYHOUR/BYMINUTE/BYSECOND upstream). Returns the new instant and the
/// number of hours forwarded past a DST gap, if any.
///
/// Only `Years`, `Months`, `Weeks` and `Days` are handled here: `Hours` (and
/// finer) addition is a direct instant-shift the hourly driver does itself,
/// since letting a DST gap silently skip an hour is the *intended* behaviour
/// for sub-day cadences (spec §4.E "Hourly").
pub fn add_wall(dt: DateTime<Tz>, unit: Unit, n: i64, wall_time: NaiveTime) -> (DateTime<Tz>, i64) {
    let tz = dt.timezone();
    let base_date = dt.date_naive();
    let new_date = match unit {
        Unit::Years => add_months(base_date, n * 12),
        Unit::Months => add_months(base_date, n),
        Unit::Weeks => base_date + Duration::days(n * 7),
        Unit::Days => base_date + Duration::days(n),
    };
    let naive = NaiveDateTime::new(new_date, wall_time);
    localize_forward(tz, naive)
}

/// Add `months` calendar months to `date`, clamping the day-of-month to the
/// target month's length (RFC 5545 has no "roll over to next month"
/// semantics; callers that need "skip months where day N doesn't exist"
/// probing do that themselves — see `crate::iter::monthly`).
pub fn add_months(date: NaiveDate, months: i64) -> NaiveDate {
    let total = i64::from(date.year()) * 12 + i64::from(date.month0()) + months;
    let year = (total.div_euclid(12)) as i32;
    let month0 = total.rem_euclid(12) as u32;
    let month = month0 + 1;
    let day = date.day().min(days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day).expect("clamped day is always valid")
}

/// `true` iff `year`'s `month` has a day numbered `day` (1-indexed).
pub fn month_has_day(year: i32, month: u32, day: u32) -> bool {
    day >= 1 && day <= days_in_month(year, month)
}

/// The most recent date with the given weekday, on or before `date`.
pub fn previous_weekday_on_or_before(date: NaiveDate, weekday: chrono::Weekday) -> NaiveDate {
    let diff = (i64::from(date.weekday().num_days_from_sunday())
        - i64::from(weekday.num_days_from_sunday()))
    .rem_euclid(7);
    date - Duration::days(diff)
}

/// The next date with the given weekday, on or after `date`.
pub fn next_weekday_on_or_after(date: NaiveDate, weekday: chrono::Weekday) -> NaiveDate {
    let diff = (i64::from(weekday.num_days_from_sunday())
        - i64::from(date.weekday().num_days_from_sunday()))
    .rem_euclid(7);
    date + Duration::days(diff)
}

/// Every date in `(year, month)` whose weekday is `weekday`, in ascending
/// order (1-31 entries expressed as day-of-month).
pub fn weekdays_in_month(year: i32, month: u32, weekday: chrono::Weekday) -> Vec<u32> {
    let len = days_in_month(year, month);
    let first = NaiveDate::from_ymd_opt(year, month, 1).expect("valid date");
    let first_day = next_weekday_on_or_after(first, weekday).day();
    (first_day..=len).step_by(7).collect()
}

/// Convert a (possibly negative, 1-indexed from the end) BYYEARDAY value
/// into an absolute day-of-year in `1..=days_in_year(year)`, or `None` if out
/// of range.
pub fn resolve_year_day(year: i32, value: i16) -> Option<u32> {
    let len = days_in_year(year) as i32;
    let abs = if value > 0 {
        i32::from(value)
    } else {
        len + 1 + i32::from(value)
    };
    if abs >= 1 && abs <= len {
        Some(abs as u32)
    } else {
        None
    }
}

/// Convert a (possibly negative) BYMONTHDAY value into an absolute
/// day-of-month in `1..=days_in_month`, or `None` if out of range.
pub fn resolve_month_day(year: i32, month: u32, value: i8) -> Option<u32> {
    let len = days_in_month(year, month) as i32;
    let abs = if value > 0 {
        i32::from(value)
    } else {
        len + 1 + i32::from(value)
    };
    if abs >= 1 && abs <= len {
        Some(abs as u32)
    } else {
        None
    }
}

/// `timestamp` (seconds since epoch) is beyond the engine's horizon.
pub fn past_horizon(dt: DateTime<Tz>) -> bool {
    dt.timestamp() > HORIZON_TIMESTAMP
}
