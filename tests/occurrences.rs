use chrono::TimeZone;
use rrule::{Frequency, RRule};

fn utc(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> chrono::DateTime<chrono_tz::Tz> {
    chrono_tz::UTC.with_ymd_and_hms(y, m, d, h, mi, s).unwrap()
}

fn collect_all(rule: &mut RRule) -> Vec<chrono::DateTime<chrono_tz::Tz>> {
    let mut out = vec![rule.current().unwrap()];
    while let Some(dt) = rule.advance().unwrap() {
        out.push(dt);
    }
    out
}

#[test]
fn daily_count_five() {
    let start = utc(2020, 1, 1, 0, 0, 0);
    let mut rule = RRule::new("FREQ=DAILY;COUNT=5", start).unwrap();
    let all = collect_all(&mut rule);
    let expected: Vec<_> = (1..=5).map(|d| utc(2020, 1, d, 0, 0, 0)).collect();
    assert_eq!(all, expected);
}

#[test]
fn monthly_last_weekday_bysetpos() {
    let start = utc(2020, 1, 1, 0, 0, 0);
    let mut rule = RRule::new("FREQ=MONTHLY;BYDAY=MO,TU,WE,TH,FR;BYSETPOS=-1;COUNT=4", start).unwrap();
    let all = collect_all(&mut rule);
    let expected = vec![
        utc(2020, 1, 31, 0, 0, 0),
        utc(2020, 2, 28, 0, 0, 0),
        utc(2020, 3, 31, 0, 0, 0),
        utc(2020, 4, 30, 0, 0, 0),
    ];
    assert_eq!(all, expected);
}

#[test]
fn yearly_leap_day_stability() {
    use chrono::Datelike;

    let start = utc(2020, 2, 29, 0, 0, 0);
    let mut rule = RRule::new("FREQ=YEARLY;BYMONTH=2;BYMONTHDAY=29;COUNT=3", start).unwrap();
    let all = collect_all(&mut rule);
    let expected = vec![
        utc(2020, 2, 29, 0, 0, 0),
        utc(2024, 2, 29, 0, 0, 0),
        utc(2028, 2, 29, 0, 0, 0),
    ];
    assert_eq!(all, expected);
    for dt in &all {
        assert_eq!((dt.month(), dt.day()), (2, 29));
    }
}

#[test]
fn biweekly_monday_wednesday_friday() {
    let start = utc(2020, 1, 6, 9, 0, 0);
    let mut rule = RRule::new("FREQ=WEEKLY;BYDAY=MO,WE,FR;INTERVAL=2;COUNT=6", start).unwrap();
    let all = collect_all(&mut rule);
    let expected = vec![
        utc(2020, 1, 6, 9, 0, 0),
        utc(2020, 1, 8, 9, 0, 0),
        utc(2020, 1, 10, 9, 0, 0),
        utc(2020, 1, 20, 9, 0, 0),
        utc(2020, 1, 22, 9, 0, 0),
        utc(2020, 1, 24, 9, 0, 0),
    ];
    assert_eq!(all, expected);
}

#[test]
fn yearly_by_week_no_iso_semantics() {
    // DTSTART is itself 2018's ISO week-1 Monday. The sequence then visits
    // each subsequent year's week-1 Monday, which is not always in January:
    // 2019's is 2018-12-31, and 2020's is 2019-12-30.
    let start = utc(2018, 1, 1, 9, 0, 0);
    let mut rule = RRule::new("FREQ=YEARLY;BYWEEKNO=1;BYDAY=MO", start).unwrap();
    let first = rule.current().unwrap();
    let second = rule.advance().unwrap().unwrap();
    let third = rule.advance().unwrap().unwrap();
    assert_eq!(first, utc(2018, 1, 1, 9, 0, 0));
    assert_eq!(second, utc(2018, 12, 31, 9, 0, 0));
    assert_eq!(third, utc(2019, 12, 30, 9, 0, 0));
}

#[test]
fn hourly_dst_spring_forward_amsterdam() {
    use chrono::Timelike;
    let tz: chrono_tz::Tz = "Europe/Amsterdam".parse().unwrap();
    let start = tz.with_ymd_and_hms(2020, 3, 29, 0, 30, 0).unwrap();
    let mut rule = RRule::new("FREQ=HOURLY;INTERVAL=3", start).unwrap();

    let first = rule.current().unwrap();
    let second = rule.advance().unwrap().unwrap();
    let third = rule.advance().unwrap().unwrap();
    let fourth = rule.advance().unwrap().unwrap();

    assert_eq!((first.hour(), first.minute()), (0, 30));
    assert_eq!((second.hour(), second.minute()), (4, 30));
    assert_eq!((third.hour(), third.minute()), (6, 30));
    assert_eq!((fourth.hour(), fourth.minute()), (9, 30));
}

#[test]
fn monotonic_sequence() {
    let start = utc(2020, 1, 1, 0, 0, 0);
    let mut rule = RRule::new("FREQ=DAILY;BYHOUR=6,18;COUNT=10", start).unwrap();
    let all = collect_all(&mut rule);
    for pair in all.windows(2) {
        assert!(pair[1] > pair[0]);
    }
}

#[test]
fn count_bound_is_exact() {
    let start = utc(2020, 1, 1, 0, 0, 0);
    let mut rule = RRule::new("FREQ=DAILY;COUNT=3", start).unwrap();
    let all = collect_all(&mut rule);
    assert_eq!(all.len(), 3);
}

#[test]
fn until_bound_excludes_past_until() {
    let start = utc(2020, 1, 1, 0, 0, 0);
    let until = utc(2020, 1, 5, 0, 0, 0);
    let mut rule = RRule::new(format!("FREQ=DAILY;UNTIL={}", until.format("%Y%m%dT%H%M%SZ")).as_str(), start).unwrap();
    let all = collect_all(&mut rule);
    assert_eq!(*all.last().unwrap(), until);
    assert!(all.iter().all(|dt| *dt <= until));
}

#[test]
fn fast_forward_lands_on_first_occurrence_at_or_after_target() {
    let start = utc(2020, 1, 1, 0, 0, 0);
    let mut rule = RRule::new("FREQ=DAILY;COUNT=100", start).unwrap();
    let target = utc(2020, 2, 15, 0, 0, 0);
    rule.fast_forward(target).unwrap();
    assert_eq!(rule.current().unwrap(), target);
}

#[test]
fn fast_forward_before_lands_strictly_before_target() {
    let start = utc(2020, 1, 1, 0, 0, 0);
    let mut rule = RRule::new("FREQ=DAILY;COUNT=100", start).unwrap();
    let target = utc(2020, 2, 15, 12, 0, 0);
    rule.fast_forward_before(target).unwrap();
    let current = rule.current().unwrap();
    assert!(current < target);
    assert_eq!(current, utc(2020, 2, 15, 0, 0, 0));
}

#[test]
fn fast_forward_before_with_no_prior_occurrence_returns_start() {
    let start = utc(2020, 6, 1, 0, 0, 0);
    let mut rule = RRule::new("FREQ=DAILY;COUNT=10", start).unwrap();
    rule.fast_forward_before(utc(2020, 1, 1, 0, 0, 0)).unwrap();
    assert_eq!(rule.current().unwrap(), start);
}

#[test]
fn fast_forward_to_end_reaches_final_occurrence() {
    let start = utc(2020, 1, 1, 0, 0, 0);
    let mut rule = RRule::new("FREQ=DAILY;COUNT=5", start).unwrap();
    rule.fast_forward_to_end().unwrap();
    assert_eq!(rule.current().unwrap(), utc(2020, 1, 5, 0, 0, 0));
    assert_eq!(rule.advance().unwrap(), None);
}

#[test]
fn fast_forward_to_end_rejects_infinite_rule() {
    let start = utc(2020, 1, 1, 0, 0, 0);
    let mut rule = RRule::new("FREQ=DAILY", start).unwrap();
    assert!(rule.fast_forward_to_end().is_err());
}

#[test]
fn reset_returns_to_anchor() {
    let start = utc(2020, 1, 1, 0, 0, 0);
    let mut rule = RRule::new("FREQ=DAILY;COUNT=5", start).unwrap();
    rule.advance().unwrap();
    rule.advance().unwrap();
    rule.reset();
    assert_eq!(rule.current().unwrap(), start);
    assert_eq!(rule.key().as_known(), Some(0));
}

#[test]
fn occurrences_adaptor_matches_manual_walk() {
    let start = utc(2020, 1, 1, 0, 0, 0);
    let rule = RRule::new("FREQ=DAILY;COUNT=5", start).unwrap();
    let via_adaptor: Vec<_> = rule.occurrences().collect();
    let mut manual = rule.clone();
    let via_manual = collect_all(&mut manual);
    assert_eq!(via_adaptor, via_manual);
}

#[test]
fn rejects_count_and_until_together() {
    let start = utc(2020, 1, 1, 0, 0, 0);
    let err = RRule::new("FREQ=DAILY;COUNT=5;UNTIL=20200101T000000Z", start).unwrap_err();
    assert!(matches!(err, rrule::RRuleError::InvalidRule(_)));
}

#[test]
fn exposes_validated_frequency_in_options() {
    let start = utc(2020, 1, 1, 0, 0, 0);
    let rule = RRule::new("FREQ=WEEKLY;COUNT=1", start).unwrap();
    assert_eq!(rule.options().freq, Frequency::Weekly);
}

#[test]
fn yearly_bymonth_only_does_not_clamp_short_months() {
    // DTSTART's day-of-month (30) never exists in February, so the yearly
    // BYMONTH=2 scan must never produce an occurrence there — not silently
    // clamp down to Feb 28 every year.
    let start = utc(2020, 1, 30, 0, 0, 0);
    let mut rule = RRule::new("FREQ=YEARLY;BYMONTH=2", start).unwrap();
    assert_eq!(rule.current().unwrap(), start);
    assert_eq!(rule.advance().unwrap(), None);
}

#[test]
fn weekly_byhour_only_preserves_dtstart_weekday() {
    // FREQ=WEEKLY;BYHOUR=9 with no BYDAY must stay on DTSTART's weekday
    // (Monday here), not fire every day of the week.
    let start = utc(2020, 1, 6, 9, 0, 0);
    let mut rule = RRule::new("FREQ=WEEKLY;BYHOUR=9;COUNT=5", start).unwrap();
    let all = collect_all(&mut rule);
    use chrono::Datelike;
    for dt in &all {
        assert_eq!(dt.weekday(), chrono::Weekday::Mon);
    }
    let expected = vec![
        utc(2020, 1, 6, 9, 0, 0),
        utc(2020, 1, 13, 9, 0, 0),
        utc(2020, 1, 20, 9, 0, 0),
        utc(2020, 1, 27, 9, 0, 0),
        utc(2020, 2, 3, 9, 0, 0),
    ];
    assert_eq!(all, expected);
}

#[test]
fn yearly_by_week_no_negative_out_of_range_does_not_panic() {
    // 2021 has only 52 ISO weeks; BYWEEKNO=-53 must be silently dropped for
    // that year rather than panic or wrap.
    let start = utc(2021, 1, 4, 9, 0, 0);
    let mut rule = RRule::new("FREQ=YEARLY;BYWEEKNO=-53;BYDAY=MO;COUNT=2", start).unwrap();
    let all = collect_all(&mut rule);
    assert!(all.len() <= 2);
}
