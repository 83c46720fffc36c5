//! Component D: monthly expansion. Given a (year, month) context and the
//! rule, produces the sorted, de-duplicated list of candidate
//! `(day, hour, minute, second)` tuples that BYDAY/BYMONTHDAY/BYHOUR/
//! BYMINUTE/BYSECOND generate, filtered by BYSETPOS.
//!
//! This is the one piece of the engine every monthly and yearly-with-BYMONTH
//! driver call delegates to (spec §4.D).

use chrono::Timelike;
use chrono_tz::Tz;

use crate::datetime::{self, next_weekday_on_or_after, weekdays_in_month};
use crate::options::RRuleOptions;

/// One candidate occurrence within a month, as a lexicographically
/// comparable tuple.
pub type MonthCandidate = (u32, u32, u32, u32);

/// Candidate days-of-month selected by BYDAY alone (ignoring BYMONTHDAY),
/// honouring each entry's numeric offset where present.
fn by_day_candidates(opts: &RRuleOptions, year: i32, month: u32) -> Vec<u32> {
    let len = datetime::days_in_month(year, month);
    let mut days = Vec::new();
    for entry in &opts.by_day {
        let all = weekdays_in_month(year, month, entry.weekday);
        match entry.n {
            None => days.extend(all.iter().copied()),
            Some(n) if n > 0 => {
                if let Some(&d) = all.get(n as usize - 1) {
                    days.push(d);
                }
            }
            Some(n) => {
                let idx = all.len() as i64 + i64::from(n);
                if idx >= 0 {
                    if let Some(&d) = all.get(idx as usize) {
                        days.push(d);
                    }
                }
            }
        }
    }
    days.retain(|&d| d >= 1 && d <= len);
    days
}

/// Candidate days-of-month selected by BYMONTHDAY alone.
fn by_month_day_candidates(opts: &RRuleOptions, year: i32, month: u32) -> Vec<u32> {
    opts.by_month_day
        .iter()
        .filter_map(|&v| datetime::resolve_month_day(year, month, v))
        .collect()
}

/// The day-of-month candidate set for `(year, month)`, combining BYDAY and
/// BYMONTHDAY per spec §4.D step 3 (intersection when both are present).
fn day_set(opts: &RRuleOptions, year: i32, month: u32, fallback_day: u32) -> Vec<u32> {
    let has_day = !opts.by_day.is_empty();
    let has_month_day = !opts.by_month_day.is_empty();

    let mut days = match (has_day, has_month_day) {
        (true, true) => {
            let bd: std::collections::HashSet<u32> =
                by_day_candidates(opts, year, month).into_iter().collect();
            by_month_day_candidates(opts, year, month)
                .into_iter()
                .filter(|d| bd.contains(d))
                .collect::<Vec<_>>()
        }
        (true, false) => by_day_candidates(opts, year, month),
        (false, true) => by_month_day_candidates(opts, year, month),
        (false, false) => vec![fallback_day],
    };
    days.sort_unstable();
    days.dedup();
    days
}

/// Produce the sorted, BYSETPOS-filtered candidate list for `(year, month)`.
///
/// `fallback_day` is used only when neither BYDAY nor BYMONTHDAY is present
/// (e.g. a yearly rule with just BYMONTH) — it is the start's day-of-month.
pub fn month_candidates(
    opts: &RRuleOptions,
    start: chrono::DateTime<Tz>,
    year: i32,
    month: u32,
    fallback_day: u32,
) -> Vec<MonthCandidate> {
    let days = day_set(opts, year, month, fallback_day);

    let hours: Vec<u32> = if opts.by_hour.is_empty() {
        vec![start.hour()]
    } else {
        opts.by_hour.iter().map(|&h| u32::from(h)).collect()
    };
    let minutes: Vec<u32> = if opts.by_minute.is_empty() {
        vec![start.minute()]
    } else {
        opts.by_minute.iter().map(|&m| u32::from(m)).collect()
    };
    let seconds: Vec<u32> = if opts.by_second.is_empty() {
        vec![start.second()]
    } else {
        opts.by_second.iter().map(|&s| u32::from(s)).collect()
    };

    let mut candidates: Vec<MonthCandidate> = Vec::with_capacity(days.len() * hours.len());
    for &d in &days {
        for &h in &hours {
            for &mi in &minutes {
                for &s in &seconds {
                    candidates.push((d, h, mi, s));
                }
            }
        }
    }
    candidates.sort_unstable();
    candidates.dedup();

    apply_by_set_pos(opts, candidates)
}

/// BYSETPOS filter (spec §4.D step 6): selects the p-th element (1-indexed,
/// signed) of the ascending candidate list. Emission order stays ascending,
/// not BYSETPOS order.
fn apply_by_set_pos(opts: &RRuleOptions, candidates: Vec<MonthCandidate>) -> Vec<MonthCandidate> {
    if opts.by_set_pos.is_empty() {
        return candidates;
    }
    let len = candidates.len() as i64;
    let mut selected: Vec<MonthCandidate> = opts
        .by_set_pos
        .iter()
        .filter_map(|&p| {
            let idx = if p > 0 { i64::from(p) - 1 } else { len + i64::from(p) };
            if idx >= 0 && idx < len {
                candidates.get(idx as usize).copied()
            } else {
                None
            }
        })
        .collect();
    selected.sort_unstable();
    selected.dedup();
    selected
}

/// Dates in `year` matching `by_week_no` x (BYDAY weekdays, or Monday if
/// BYDAY is absent), as day-of-year ISO week dates. Used by the yearly
/// BYWEEKNO driver.
pub fn week_no_candidates(opts: &RRuleOptions, year: i32) -> Vec<chrono::NaiveDate> {
    let weekdays: Vec<chrono::Weekday> = if opts.by_day.is_empty() {
        vec![chrono::Weekday::Mon]
    } else {
        opts.by_day.iter().map(|n| n.weekday).collect()
    };

    let mut dates = Vec::new();
    for &wk in &opts.by_week_no {
        let total = i64::from(datetime::iso_weeks_in_year(year));
        let week = if wk > 0 { i64::from(wk) } else { total + i64::from(wk) + 1 };
        // A negative BYWEEKNO can resolve to a week number beyond this
        // particular year's week count (e.g. BYWEEKNO=-53 in a 52-week
        // year); such a year simply contributes no candidate for that entry,
        // same as an out-of-range BYMONTHDAY is silently dropped elsewhere.
        if week < 1 || week > total {
            continue;
        }
        let week = week as u32;
        for &wd in &weekdays {
            let iso_day = datetime::iso_week_day_of(next_weekday_on_or_after(
                chrono::NaiveDate::from_ymd_opt(year, 1, 1).unwrap(),
                wd,
            ));
            if let Some(date) = datetime::set_iso_week(year, week, iso_day) {
                dates.push(date);
            }
        }
    }
    dates.sort_unstable();
    dates.dedup();
    dates
}
