//! FREQ=YEARLY driver (spec §4.E "Yearly"). Has the widest case split of the
//! five drivers: plain annual cadence, BYWEEKNO, BYYEARDAY, and BYMONTH (with
//! or without BYDAY/BYMONTHDAY) all expand differently.

use chrono::{DateTime, Datelike, Timelike};
use chrono_tz::Tz;

use crate::datetime::{self, past_horizon};
use crate::error::RRuleError;
use crate::monthinfo::{month_candidates, week_no_candidates};
use crate::options::RRuleOptions;

pub(crate) fn advance(
    opts: &RRuleOptions,
    start: DateTime<Tz>,
    cursor: DateTime<Tz>,
    n: u32,
    yearly_skip_upper_limit: bool,
) -> Result<Option<DateTime<Tz>>, RRuleError> {
    let step = i64::from(opts.interval) * i64::from(n);

    if !opts.by_week_no.is_empty() {
        return by_week_no(opts, cursor, step, yearly_skip_upper_limit);
    }
    if !opts.by_year_day.is_empty() {
        return by_year_day(opts, cursor, step, yearly_skip_upper_limit);
    }
    if !opts.by_month.is_empty() {
        return by_month(opts, start, cursor, step, yearly_skip_upper_limit);
    }
    Ok(plain_yearly(start, cursor, step))
}

fn plain_yearly(start: DateTime<Tz>, cursor: DateTime<Tz>, step: i64) -> Option<DateTime<Tz>> {
    let tz = cursor.timezone();
    let is_leap_day = start.month() == 2 && start.day() == 29;
    let mut year = cursor.year();

    loop {
        year += step as i32;
        if year > 9999 {
            return None;
        }
        if is_leap_day && !datetime::is_leap_year(year) {
            continue;
        }
        let date = chrono::NaiveDate::from_ymd_opt(year, start.month(), start.day())?;
        let naive = chrono::NaiveDateTime::new(date, start.time());
        let (dt, _) = datetime::localize_forward(tz, naive);
        return if past_horizon(dt) { None } else { Some(dt) };
    }
}

fn horizon_check(year: i32, yearly_skip_upper_limit: bool) -> Result<Option<()>, RRuleError> {
    if year > 9999 {
        if yearly_skip_upper_limit {
            Ok(None)
        } else {
            Err(RRuleError::HorizonExceeded)
        }
    } else {
        Ok(Some(()))
    }
}

fn by_week_no(
    opts: &RRuleOptions,
    cursor: DateTime<Tz>,
    step: i64,
    yearly_skip_upper_limit: bool,
) -> Result<Option<DateTime<Tz>>, RRuleError> {
    let tz = cursor.timezone();
    let mut year = cursor.year();
    loop {
        let dates = week_no_candidates(opts, year);
        let time = cursor.time();
        let hit = dates
            .into_iter()
            .filter_map(|d| {
                let naive = chrono::NaiveDateTime::new(d, time);
                let (dt, _) = datetime::localize_forward(tz, naive);
                Some(dt)
            })
            .find(|dt| *dt > cursor);

        if let Some(dt) = hit {
            return Ok(if past_horizon(dt) { None } else { Some(dt) });
        }

        year += step as i32;
        if horizon_check(year, yearly_skip_upper_limit)?.is_none() {
            return Ok(None);
        }
    }
}

fn by_year_day(
    opts: &RRuleOptions,
    cursor: DateTime<Tz>,
    step: i64,
    yearly_skip_upper_limit: bool,
) -> Result<Option<DateTime<Tz>>, RRuleError> {
    let tz = cursor.timezone();
    let weekdays: Vec<chrono::Weekday> = opts.by_day.iter().map(|n| n.weekday).collect();
    let mut year = cursor.year();

    loop {
        let jan1 = chrono::NaiveDate::from_ymd_opt(year, 1, 1).expect("valid date");
        let time = cursor.time();
        let mut candidates: Vec<chrono::NaiveDate> = opts
            .by_year_day
            .iter()
            .filter_map(|&v| datetime::resolve_year_day(year, v))
            .filter_map(|yday| jan1.checked_add_signed(chrono::Duration::days(i64::from(yday) - 1)))
            .filter(|d| weekdays.is_empty() || weekdays.contains(&d.weekday()))
            .collect();
        candidates.sort_unstable();
        candidates.dedup();

        let hit = candidates
            .into_iter()
            .filter_map(|d| {
                let naive = chrono::NaiveDateTime::new(d, time);
                let (dt, _) = datetime::localize_forward(tz, naive);
                Some(dt)
            })
            .find(|dt| *dt > cursor);

        if let Some(dt) = hit {
            return Ok(if past_horizon(dt) { None } else { Some(dt) });
        }

        year += step as i32;
        if horizon_check(year, yearly_skip_upper_limit)?.is_none() {
            return Ok(None);
        }
    }
}

fn by_month(
    opts: &RRuleOptions,
    start: DateTime<Tz>,
    cursor: DateTime<Tz>,
    step: i64,
    yearly_skip_upper_limit: bool,
) -> Result<Option<DateTime<Tz>>, RRuleError> {
    let tz = cursor.timezone();
    let mut months: Vec<u32> = opts.by_month.iter().map(|&m| u32::from(m)).collect();
    months.sort_unstable();
    months.dedup();

    let mut year = cursor.year();
    let mut first_pass = true;

    loop {
        for &month in &months {
            if first_pass && month < cursor.month() {
                continue;
            }
            // Preserve start's day-of-month unclamped (spec §4.E "BYMONTH
            // only": a month too short to contain it simply yields no
            // candidate that month, mirroring `monthly::plain_monthly`'s
            // skip-don't-clamp behaviour) rather than silently inventing an
            // occurrence on a day that was never DTSTART's.
            let candidates = month_candidates(opts, start, year, month, start.day());
            let floor = if first_pass && month == cursor.month() {
                (cursor.day(), cursor.hour(), cursor.minute(), cursor.second())
            } else {
                (0, 0, 0, 0)
            };
            if let Some(&(d, h, mi, s)) = candidates.iter().find(|&&c| c > floor) {
                let date = match chrono::NaiveDate::from_ymd_opt(year, month, d) {
                    Some(d) => d,
                    None => continue,
                };
                let time = match chrono::NaiveTime::from_hms_opt(h, mi, s) {
                    Some(t) => t,
                    None => continue,
                };
                let (dt, _) = datetime::localize_forward(tz, chrono::NaiveDateTime::new(date, time));
                return Ok(if past_horizon(dt) { None } else { Some(dt) });
            }
        }
        first_pass = false;
        year += step as i32;
        if horizon_check(year, yearly_skip_upper_limit)?.is_none() {
            return Ok(None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{NWeekday, RRuleOptions};
    use chrono::TimeZone;

    fn base(interval: u32) -> RRuleOptions {
        RRuleOptions {
            freq: crate::options::Frequency::Yearly,
            interval,
            count: None,
            until: None,
            by_second: vec![],
            by_minute: vec![],
            by_hour: vec![],
            by_day: vec![],
            by_month_day: vec![],
            by_year_day: vec![],
            by_week_no: vec![],
            by_month: vec![],
            by_set_pos: vec![],
            week_start: chrono::Weekday::Mon,
        }
    }

    #[test]
    fn plain_yearly_same_day_next_year() {
        let start = chrono_tz::UTC.with_ymd_and_hms(2020, 3, 1, 9, 0, 0).unwrap();
        let next = advance(&base(1), start, start, 1, true).unwrap().unwrap();
        assert_eq!((next.year(), next.month(), next.day()), (2021, 3, 1));
    }

    #[test]
    fn plain_yearly_skips_non_leap_years_on_feb_29() {
        let start = chrono_tz::UTC.with_ymd_and_hms(2020, 2, 29, 0, 0, 0).unwrap();
        let next = advance(&base(1), start, start, 1, true).unwrap().unwrap();
        // 2021-2023 aren't leap years; the next Feb 29 is 2024.
        assert_eq!((next.year(), next.month(), next.day()), (2024, 2, 29));
    }

    #[test]
    fn by_week_no_first_week_monday() {
        // Every ISO week 1, Monday. DTSTART is itself 2018's week-1 Monday,
        // so the next two occurrences are 2019's and 2020's week-1 Mondays
        // (2018-12-31 and 2019-12-30, per ISO 8601 week numbering).
        let mut opts = base(1);
        opts.by_week_no = vec![1];
        opts.by_day = vec![NWeekday::every(chrono::Weekday::Mon)];
        let start = chrono_tz::UTC.with_ymd_and_hms(2018, 1, 1, 9, 0, 0).unwrap();

        let first = advance(&opts, start, start, 1, true).unwrap().unwrap();
        assert_eq!((first.year(), first.month(), first.day()), (2018, 12, 31));

        let second = advance(&opts, start, first, 1, true).unwrap().unwrap();
        assert_eq!((second.year(), second.month(), second.day()), (2019, 12, 30));
    }

    #[test]
    fn by_month_picks_first_candidate_in_target_month() {
        let mut opts = base(1);
        opts.by_month = vec![6];
        let start = chrono_tz::UTC.with_ymd_and_hms(2020, 1, 15, 9, 0, 0).unwrap();
        let next = advance(&opts, start, start, 1, true).unwrap().unwrap();
        assert_eq!((next.year(), next.month(), next.day()), (2020, 6, 15));
        let next2 = advance(&opts, start, next, 1, true).unwrap().unwrap();
        assert_eq!((next2.year(), next2.month(), next2.day()), (2021, 6, 15));
    }
}
