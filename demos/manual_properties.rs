//! Build an `RRule` from `RRuleProperties` instead of a rule string.

use chrono::{Datelike, TimeZone, Timelike};
use rrule::{Frequency, RRule, RRuleProperties};

fn main() {
    // Starts first day of 2020 at 9:00AM and occurs daily 5 times.
    let properties = RRuleProperties::default().count(5).freq(Frequency::Daily);
    let dtstart = chrono_tz::UTC.with_ymd_and_hms(2020, 1, 1, 9, 0, 0).unwrap();

    let rule = RRule::from_properties(properties, dtstart).expect("valid rule");
    let recurrences: Vec<_> = rule.occurrences().collect();

    for (i, rec) in recurrences.iter().enumerate() {
        assert_eq!(rec.year(), 2020);
        assert_eq!(rec.month(), 1);
        assert_eq!(rec.day(), 1 + i as u32);
        assert_eq!(rec.hour(), 9);
    }
    assert_eq!(recurrences.len(), 5);
    println!("Done, everything worked.");
}
