//! Component C: accepts a tokenised rule (string or mapping), normalises
//! case, enforces cross-field legality, and emits a fully-populated
//! [`RRuleOptions`]. Performs no date math beyond the UNTIL-before-DTSTART
//! clamp (spec §7: "not an error — models the legacy leniency").

mod regex;

use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, TimeZone, Weekday};
use chrono_tz::Tz;

use crate::error::RRuleError;
use crate::options::{Frequency, NWeekday, RRuleOptions, RRuleProperties};

/// The shape accepted at the public `RRule` construction boundary: either a
/// raw `KEY=VAL;KEY=VAL` string, or an already-tokenised mapping of rule-part
/// name to one-or-many values (e.g. as an iCalendar parser upstream of this
/// crate would hand over).
pub enum RuleInput<'a> {
    Text(&'a str),
    Map(HashMap<String, Vec<String>>),
}

impl<'a> From<&'a str> for RuleInput<'a> {
    fn from(value: &'a str) -> Self {
        RuleInput::Text(value)
    }
}

impl From<HashMap<String, Vec<String>>> for RuleInput<'static> {
    fn from(value: HashMap<String, Vec<String>>) -> Self {
        RuleInput::Map(value)
    }
}

const RECOGNISED_KEYS: &[&str] = &[
    "FREQ",
    "INTERVAL",
    "COUNT",
    "UNTIL",
    "BYSECOND",
    "BYMINUTE",
    "BYHOUR",
    "BYDAY",
    "BYMONTHDAY",
    "BYYEARDAY",
    "BYWEEKNO",
    "BYMONTH",
    "BYSETPOS",
    "WKST",
];

/// Parse and validate a rule in one step. `dtstart` supplies the anchor used
/// for the UNTIL-before-start clamp and as the wall-clock default when a
/// BY-part is absent.
pub fn parse(input: RuleInput<'_>, dtstart: DateTime<Tz>) -> Result<RRuleOptions, RRuleError> {
    let tokens = match input {
        RuleInput::Text(s) => tokenize(s)?,
        RuleInput::Map(map) => map
            .into_iter()
            .map(|(k, v)| (k.to_ascii_uppercase(), v.join(",")))
            .collect(),
    };

    let mut props = RRuleProperties::default();

    for (key, value) in &tokens {
        if !RECOGNISED_KEYS.contains(&key.as_str()) {
            return Err(RRuleError::UnknownPart(key.clone()));
        }
        apply_token(&mut props, key, value)?;
    }

    let options = validate(props, dtstart)?;
    tracing::debug!(
        freq = %options.freq,
        interval = options.interval,
        count = ?options.count,
        "parsed RRULE"
    );
    Ok(options)
}

/// Split a `KEY=VAL;KEY=VAL` string into uppercase-keyed raw tokens.
fn tokenize(raw: &str) -> Result<Vec<(String, String)>, RRuleError> {
    raw.split(';')
        .filter(|part| !part.trim().is_empty())
        .map(|part| {
            let (key, value) = part.split_once('=').ok_or_else(|| {
                RRuleError::ParseError {
                    key: part.to_string(),
                    reason: "expected KEY=VALUE".to_string(),
                }
            })?;
            Ok((key.trim().to_ascii_uppercase(), value.trim().to_string()))
        })
        .collect()
}

fn apply_token(props: &mut RRuleProperties, key: &str, value: &str) -> Result<(), RRuleError> {
    match key {
        "FREQ" => props.freq = Some(Frequency::from_str(value)?),
        "INTERVAL" => props.interval = Some(parse_positive_u32(key, value)?),
        "COUNT" => props.count = Some(parse_positive_u32(key, value)?),
        "UNTIL" => props.until = Some(parse_until(value)?),
        "BYSECOND" => props.by_second = parse_int_list(key, value, 0, 60)?,
        "BYMINUTE" => props.by_minute = parse_int_list(key, value, 0, 59)?,
        "BYHOUR" => props.by_hour = parse_int_list(key, value, 0, 23)?,
        "BYMONTH" => props.by_month = parse_int_list(key, value, 1, 12)?,
        "BYMONTHDAY" => props.by_month_day = parse_signed_list(key, value, 1, 31)?,
        "BYYEARDAY" => props.by_year_day = parse_signed_list(key, value, 1, 366)?,
        "BYWEEKNO" => props.by_week_no = parse_signed_list(key, value, 1, 53)?,
        "BYSETPOS" => props.by_set_pos = parse_signed_list(key, value, 1, 366)?,
        "BYDAY" => props.by_day = parse_by_day_list(value)?,
        "WKST" => {
            props.week_start = Some(regex::weekday_from_abbrev(value).ok_or_else(|| {
                RRuleError::ParseError {
                    key: "WKST".to_string(),
                    reason: format!("`{value}` is not a weekday abbreviation"),
                }
            })?)
        }
        _ => unreachable!("unrecognised keys are rejected before apply_token is called"),
    }
    Ok(())
}

fn parse_positive_u32(key: &str, value: &str) -> Result<u32, RRuleError> {
    let n: i64 = value.parse().map_err(|_| RRuleError::ParseError {
        key: key.to_string(),
        reason: format!("`{value}` is not an integer"),
    })?;
    if n <= 0 {
        return Err(RRuleError::InvalidRule(format!(
            "{key} must be a positive integer, got {n}"
        )));
    }
    Ok(n as u32)
}

fn parse_until(value: &str) -> Result<DateTime<Tz>, RRuleError> {
    // Accept both DATE-TIME (`19970714T123000Z`) and DATE (`19970714`) forms.
    if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(value.trim_end_matches('Z'), "%Y%m%dT%H%M%S")
    {
        let utc = chrono::Utc.from_utc_datetime(&naive);
        return Ok(utc.with_timezone(&chrono_tz::UTC));
    }
    if let Ok(date) = chrono::NaiveDate::parse_from_str(value, "%Y%m%d") {
        let naive = date.and_hms_opt(23, 59, 59).expect("valid time");
        let utc = chrono::Utc.from_utc_datetime(&naive);
        return Ok(utc.with_timezone(&chrono_tz::UTC));
    }
    Err(RRuleError::ParseError {
        key: "UNTIL".to_string(),
        reason: format!("`{value}` is not a recognised DATE or DATE-TIME value"),
    })
}

fn parse_int_list(key: &str, value: &str, min: i64, max: i64) -> Result<Vec<u8>, RRuleError> {
    value
        .split(',')
        .map(|raw| {
            let n: i64 = raw.trim().parse().map_err(|_| RRuleError::ParseError {
                key: key.to_string(),
                reason: format!("`{raw}` is not an integer"),
            })?;
            if n < min || n > max {
                return Err(RRuleError::InvalidRule(format!(
                    "{key} value {n} out of range [{min},{max}]"
                )));
            }
            Ok(n as u8)
        })
        .collect()
}

/// Parses a comma-separated list of signed, zero-forbidding BY-part values
/// (BYMONTHDAY, BYYEARDAY, BYWEEKNO, BYSETPOS), range-checking the magnitude
/// against `[min,max]`. Generic over the target width so each BY-part lands
/// in the field size `RRuleOptions` documents for its value range (`i8` for
/// BYMONTHDAY/BYWEEKNO, `i16` for BYYEARDAY/BYSETPOS) instead of forcing
/// every signed BY-part to the widest representation.
fn parse_signed_list<T>(key: &str, value: &str, min: i64, max: i64) -> Result<Vec<T>, RRuleError>
where
    T: TryFrom<i64>,
{
    value
        .split(',')
        .map(|raw| {
            let n: i64 = raw.trim().parse().map_err(|_| RRuleError::ParseError {
                key: key.to_string(),
                reason: format!("`{raw}` is not an integer"),
            })?;
            if n == 0 {
                return Err(RRuleError::InvalidRule(format!(
                    "{key} does not allow the value 0"
                )));
            }
            if n.unsigned_abs() < min as u64 || n.unsigned_abs() > max as u64 {
                return Err(RRuleError::InvalidRule(format!(
                    "{key} value {n} out of range [-{max},-{min}] \u{222a} [{min},{max}]"
                )));
            }
            T::try_from(n).map_err(|_| RRuleError::InvalidRule(format!(
                "{key} value {n} does not fit in its target range"
            )))
        })
        .collect()
}

fn parse_by_day_list(value: &str) -> Result<Vec<NWeekday>, RRuleError> {
    value
        .split(',')
        .map(|token| {
            regex::parse_by_day_token(token)
                .map(|tok| NWeekday::new(tok.n, tok.weekday))
                .ok_or_else(|| RRuleError::InvalidRule(format!("`{token}` is not a valid BYDAY entry")))
        })
        .collect()
}

/// Enforce the cross-field invariants from spec §3 and fill in defaults,
/// turning an (unvalidated) builder into a validated [`RRuleOptions`].
pub fn validate(props: RRuleProperties, dtstart: DateTime<Tz>) -> Result<RRuleOptions, RRuleError> {
    let freq = props
        .freq
        .ok_or_else(|| RRuleError::InvalidRule("FREQ is required".to_string()))?;

    if props.count.is_some() && props.until.is_some() {
        return Err(RRuleError::InvalidRule(
            "COUNT and UNTIL are mutually exclusive".to_string(),
        ));
    }

    if !props.by_week_no.is_empty() && freq != Frequency::Yearly {
        return Err(RRuleError::InvalidRule(
            "BYWEEKNO requires FREQ=YEARLY".to_string(),
        ));
    }

    if !props.by_year_day.is_empty()
        && matches!(freq, Frequency::Daily | Frequency::Weekly | Frequency::Monthly)
    {
        return Err(RRuleError::InvalidRule(
            "BYYEARDAY is not allowed with FREQ=DAILY, WEEKLY or MONTHLY".to_string(),
        ));
    }

    if !props.by_month_day.is_empty() && freq == Frequency::Weekly {
        return Err(RRuleError::InvalidRule(
            "BYMONTHDAY is not allowed with FREQ=WEEKLY".to_string(),
        ));
    }

    for n in &props.by_day {
        if n.n.is_some() && !matches!(freq, Frequency::Monthly | Frequency::Yearly) {
            return Err(RRuleError::InvalidRule(
                "a numeric BYDAY offset is only meaningful with FREQ=MONTHLY or FREQ=YEARLY"
                    .to_string(),
            ));
        }
    }

    if !props.by_set_pos.is_empty()
        && props.by_day.is_empty()
        && props.by_month_day.is_empty()
        && props.by_year_day.is_empty()
        && props.by_week_no.is_empty()
        && props.by_month.is_empty()
        && props.by_hour.is_empty()
        && props.by_minute.is_empty()
        && props.by_second.is_empty()
    {
        // Open Question in spec §9: the source degrades to an empty result;
        // this crate makes it an explicit InvalidRule instead.
        return Err(RRuleError::InvalidRule(
            "BYSETPOS requires at least one other BY-part to select from".to_string(),
        ));
    }

    let until = props.until.map(|u| if u < dtstart { dtstart } else { u });

    Ok(RRuleOptions {
        freq,
        interval: props.interval.unwrap_or(1),
        count: props.count,
        until,
        by_second: props.by_second,
        by_minute: props.by_minute,
        by_hour: props.by_hour,
        by_day: props.by_day,
        by_month_day: props.by_month_day,
        by_year_day: props.by_year_day,
        by_week_no: props.by_week_no,
        by_month: props.by_month,
        by_set_pos: props.by_set_pos,
        week_start: props.week_start.unwrap_or(Weekday::Mon),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn dtstart(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Tz> {
        chrono_tz::UTC.with_ymd_and_hms(y, m, d, h, mi, s).unwrap()
    }

    #[test]
    fn parses_simple_daily() {
        let opts = parse(
            RuleInput::Text("FREQ=DAILY;COUNT=5"),
            dtstart(2020, 1, 1, 0, 0, 0),
        )
        .unwrap();
        assert_eq!(opts.freq, Frequency::Daily);
        assert_eq!(opts.count, Some(5));
        assert_eq!(opts.interval, 1);
    }

    #[test]
    fn rejects_count_and_until() {
        let err = parse(
            RuleInput::Text("FREQ=DAILY;COUNT=5;UNTIL=20200101T000000Z"),
            dtstart(2020, 1, 1, 0, 0, 0),
        )
        .unwrap_err();
        assert!(matches!(err, RRuleError::InvalidRule(_)));
    }

    #[test]
    fn rejects_unknown_key() {
        let err = parse(RuleInput::Text("FREQ=DAILY;BOGUS=1"), dtstart(2020, 1, 1, 0, 0, 0))
            .unwrap_err();
        assert!(matches!(err, RRuleError::UnknownPart(_)));
    }

    #[test]
    fn rejects_byyearday_with_monthly() {
        let err = parse(
            RuleInput::Text("FREQ=MONTHLY;BYYEARDAY=1"),
            dtstart(2020, 1, 1, 0, 0, 0),
        )
        .unwrap_err();
        assert!(matches!(err, RRuleError::InvalidRule(_)));
    }

    #[test]
    fn clamps_until_before_start() {
        let start = dtstart(2020, 6, 1, 0, 0, 0);
        let opts = parse(RuleInput::Text("FREQ=DAILY;UNTIL=20190101T000000Z"), start).unwrap();
        assert_eq!(opts.until, Some(start));
    }

    #[test]
    fn parses_by_day_with_offsets() {
        let opts = parse(
            RuleInput::Text("FREQ=MONTHLY;BYDAY=MO,TU,WE,TH,FR;BYSETPOS=-1"),
            dtstart(2020, 1, 1, 0, 0, 0),
        )
        .unwrap();
        assert_eq!(opts.by_day.len(), 5);
        assert_eq!(opts.by_set_pos, vec![-1]);
    }

    #[test]
    fn bysetpos_without_context_is_invalid() {
        let err = parse(
            RuleInput::Text("FREQ=DAILY;BYSETPOS=1"),
            dtstart(2020, 1, 1, 0, 0, 0),
        )
        .unwrap_err();
        assert!(matches!(err, RRuleError::InvalidRule(_)));
    }
}
