//! Sub-day drivers: SECONDLY, MINUTELY and HOURLY all advance by a fixed
//! duration with no monthly/yearly BY-part expansion, so they share one
//! implementation parameterised by the unit duration (spec §4.E "Hourly";
//! secondly/minutely are the same cadence at a finer grain, per the
//! component table in spec §2 which only names five drivers).

use chrono::{DateTime, Duration, Timelike};
use chrono_tz::Tz;

use crate::datetime::past_horizon;
use crate::options::{Frequency, RRuleOptions};

fn unit_seconds(freq: Frequency) -> i64 {
    match freq {
        Frequency::Secondly => 1,
        Frequency::Minutely => 60,
        Frequency::Hourly => 3_600,
        _ => unreachable!("hourly::advance is only dispatched for sub-day frequencies"),
    }
}

pub(crate) fn advance(
    opts: &RRuleOptions,
    cursor: DateTime<Tz>,
    hour_jump: &mut i64,
    n: u32,
) -> Option<DateTime<Tz>> {
    let step = i64::from(opts.interval) * i64::from(n);
    let unit = unit_seconds(opts.freq);

    // Only HOURLY performs the DST-gap compensation dance; SECONDLY/MINUTELY
    // cadences are fine-grained enough that a gap just looks like any other
    // step (spec §4.E: "If interval = 1, DST gaps are allowed to shift the
    // occurrence").
    if opts.freq != Frequency::Hourly {
        let next = cursor + Duration::seconds(step * unit);
        return if past_horizon(next) { None } else { Some(next) };
    }

    let cursor = if *hour_jump != 0 {
        let adjusted = cursor - Duration::hours(*hour_jump);
        *hour_jump = 0;
        adjusted
    } else {
        cursor
    };

    let next = cursor + Duration::hours(step);
    if past_horizon(next) {
        return None;
    }

    if opts.interval > 1 {
        let expected_hour = (i64::from(cursor.hour()) + step).rem_euclid(24);
        let diff = (i64::from(next.hour()) - expected_hour).rem_euclid(24);
        if diff != 0 {
            *hour_jump = diff;
        }
    }

    Some(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::RRuleOptions;
    use chrono::{TimeZone, Weekday};

    fn opts(freq: Frequency, interval: u32) -> RRuleOptions {
        RRuleOptions {
            freq,
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
            week_start: Weekday::Mon,
        }
    }

    #[test]
    fn hourly_dst_spring_forward_amsterdam() {
        let tz: Tz = "Europe/Amsterdam".parse().unwrap();
        let start = tz.with_ymd_and_hms(2020, 3, 29, 0, 30, 0).unwrap();
        let o = opts(Frequency::Hourly, 3);
        let mut hj = 0i64;

        let first = advance(&o, start, &mut hj, 1).unwrap();
        // 00:30 + 3h of wall clock would be 03:30, but 02:00-03:00 doesn't
        // exist in Europe/Amsterdam that day, so the instant lands on the
        // equivalent of 04:30 local.
        assert_eq!(first.hour(), 4);
        assert_eq!(first.minute(), 30);

        let second = advance(&o, first, &mut hj, 1).unwrap();
        assert_eq!(second.hour(), 6);
        assert_eq!(second.minute(), 30);
    }

    #[test]
    fn secondly_steps_by_seconds() {
        let tz = chrono_tz::UTC;
        let start = tz.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let o = opts(Frequency::Secondly, 30);
        let mut hj = 0i64;
        let next = advance(&o, start, &mut hj, 1).unwrap();
        assert_eq!(next.second(), 30);
    }
}
