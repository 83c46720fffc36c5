//! The parsed, validated representation of a recurrence rule (component B of
//! the spec). [`RRuleOptions`] is produced exclusively by [`crate::parser`]
//! or [`RRuleProperties::build`]; every frequency driver treats it as
//! read-only.

use chrono::{DateTime, Weekday};
use chrono_tz::Tz;

use crate::error::RRuleError;

/// The fundamental cadence of a rule: secondly through yearly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Frequency {
    Secondly,
    Minutely,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl std::str::FromStr for Frequency {
    type Err = RRuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "SECONDLY" => Ok(Frequency::Secondly),
            "MINUTELY" => Ok(Frequency::Minutely),
            "HOURLY" => Ok(Frequency::Hourly),
            "DAILY" => Ok(Frequency::Daily),
            "WEEKLY" => Ok(Frequency::Weekly),
            "MONTHLY" => Ok(Frequency::Monthly),
            "YEARLY" => Ok(Frequency::Yearly),
            other => Err(RRuleError::InvalidRule(format!(
                "unknown FREQ value `{other}`"
            ))),
        }
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Frequency::Secondly => "SECONDLY",
            Frequency::Minutely => "MINUTELY",
            Frequency::Hourly => "HOURLY",
            Frequency::Daily => "DAILY",
            Frequency::Weekly => "WEEKLY",
            Frequency::Monthly => "MONTHLY",
            Frequency::Yearly => "YEARLY",
        };
        f.write_str(s)
    }
}

/// One `BYDAY` entry: an optional 1-indexed (from start, or from the end if
/// negative) ordinal together with a weekday. The ordinal is only meaningful
/// for monthly/yearly expansion (spec invariant 6); weekly expansion ignores
/// it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NWeekday {
    pub n: Option<i8>,
    pub weekday: Weekday,
}

impl NWeekday {
    pub fn new(n: Option<i8>, weekday: Weekday) -> Self {
        Self { n, weekday }
    }

    pub fn every(weekday: Weekday) -> Self {
        Self { n: None, weekday }
    }
}

/// The validated, fully-populated recurrence rule (spec §3 "Rule model").
///
/// Every field has already passed the invariants enforced by
/// [`crate::parser`]; frequency drivers may assume BY-part integers are in
/// range and that illegal FREQ/BY-part combinations cannot occur.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RRuleOptions {
    pub freq: Frequency,
    pub interval: u32,
    pub count: Option<u32>,
    #[cfg_attr(feature = "serde", serde(with = "crate::options::until_serde"))]
    pub until: Option<DateTime<Tz>>,
    pub by_second: Vec<u8>,
    pub by_minute: Vec<u8>,
    pub by_hour: Vec<u8>,
    pub by_day: Vec<NWeekday>,
    pub by_month_day: Vec<i8>,
    pub by_year_day: Vec<i16>,
    pub by_week_no: Vec<i8>,
    pub by_month: Vec<u8>,
    pub by_set_pos: Vec<i16>,
    pub week_start: Weekday,
}

#[cfg(feature = "serde")]
mod until_serde {
    use chrono::DateTime;
    use chrono_tz::Tz;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Tz>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        value.map(|dt| dt.to_rfc3339()).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Tz>>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        raw.map(|s| {
            DateTime::parse_from_rfc3339(&s)
                .map(|dt| dt.with_timezone(&chrono_tz::UTC))
                .map_err(serde::de::Error::custom)
        })
        .transpose()
    }
}

impl RRuleOptions {
    /// `true` iff neither `count` nor `until` bounds the sequence.
    pub fn is_infinite(&self) -> bool {
        self.count.is_none() && self.until.is_none()
    }
}

/// Renders a parsed rule back to its RFC 5545 `KEY=VALUE;...` text, in the
/// same key order `crate::parser::RECOGNISED_KEYS` documents them, so a
/// caller that parsed a rule, mutated it, and wants to re-serialise it (e.g.
/// to write back into an iCalendar `VEVENT`) gets a round-trippable string.
/// `WKST` is only emitted when it differs from the RFC default of Monday.
impl std::fmt::Display for RRuleOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FREQ={}", self.freq)?;
        if self.interval != 1 {
            write!(f, ";INTERVAL={}", self.interval)?;
        }
        if let Some(count) = self.count {
            write!(f, ";COUNT={count}")?;
        }
        if let Some(until) = self.until {
            write!(f, ";UNTIL={}", until.format("%Y%m%dT%H%M%SZ"))?;
        }
        write_int_list(f, "BYSECOND", &self.by_second)?;
        write_int_list(f, "BYMINUTE", &self.by_minute)?;
        write_int_list(f, "BYHOUR", &self.by_hour)?;
        if !self.by_day.is_empty() {
            write!(f, ";BYDAY=")?;
            write_joined(f, self.by_day.iter().map(format_by_day))?;
        }
        write_int_list(f, "BYMONTHDAY", &self.by_month_day)?;
        write_int_list(f, "BYYEARDAY", &self.by_year_day)?;
        write_int_list(f, "BYWEEKNO", &self.by_week_no)?;
        write_int_list(f, "BYMONTH", &self.by_month)?;
        write_int_list(f, "BYSETPOS", &self.by_set_pos)?;
        if self.week_start != Weekday::Mon {
            write!(f, ";WKST={}", weekday_abbrev(self.week_start))?;
        }
        Ok(())
    }
}

fn write_int_list<T: std::fmt::Display>(
    f: &mut std::fmt::Formatter<'_>,
    key: &str,
    values: &[T],
) -> std::fmt::Result {
    if values.is_empty() {
        return Ok(());
    }
    write!(f, ";{key}=")?;
    write_joined(f, values.iter())
}

fn write_joined<T: std::fmt::Display>(
    f: &mut std::fmt::Formatter<'_>,
    values: impl Iterator<Item = T>,
) -> std::fmt::Result {
    for (i, v) in values.enumerate() {
        if i > 0 {
            write!(f, ",")?;
        }
        write!(f, "{v}")?;
    }
    Ok(())
}

fn format_by_day(entry: &NWeekday) -> String {
    match entry.n {
        Some(n) => format!("{n}{}", weekday_abbrev(entry.weekday)),
        None => weekday_abbrev(entry.weekday).to_string(),
    }
}

fn weekday_abbrev(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Sun => "SU",
        Weekday::Mon => "MO",
        Weekday::Tue => "TU",
        Weekday::Wed => "WE",
        Weekday::Thu => "TH",
        Weekday::Fri => "FR",
        Weekday::Sat => "SA",
    }
}

/// Ergonomic, consuming builder for a rule, as an alternative to the
/// semicolon-delimited string form. Mirrors the quickstart pattern of
/// `RRuleProperties::default().count(5).freq(Frequency::Daily)` and is
/// validated only once `.build(dtstart)` is called.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RRuleProperties {
    pub(crate) freq: Option<Frequency>,
    pub(crate) interval: Option<u32>,
    pub(crate) count: Option<u32>,
    pub(crate) until: Option<DateTime<Tz>>,
    pub(crate) by_second: Vec<u8>,
    pub(crate) by_minute: Vec<u8>,
    pub(crate) by_hour: Vec<u8>,
    pub(crate) by_day: Vec<NWeekday>,
    pub(crate) by_month_day: Vec<i8>,
    pub(crate) by_year_day: Vec<i16>,
    pub(crate) by_week_no: Vec<i8>,
    pub(crate) by_month: Vec<u8>,
    pub(crate) by_set_pos: Vec<i16>,
    pub(crate) week_start: Option<Weekday>,
}

impl RRuleProperties {
    pub fn freq(mut self, freq: Frequency) -> Self {
        self.freq = Some(freq);
        self
    }

    pub fn interval(mut self, interval: u32) -> Self {
        self.interval = Some(interval);
        self
    }

    pub fn count(mut self, count: u32) -> Self {
        self.count = Some(count);
        self
    }

    pub fn until(mut self, until: DateTime<Tz>) -> Self {
        self.until = Some(until);
        self
    }

    pub fn by_second(mut self, values: Vec<u8>) -> Self {
        self.by_second = values;
        self
    }

    pub fn by_minute(mut self, values: Vec<u8>) -> Self {
        self.by_minute = values;
        self
    }

    pub fn by_hour(mut self, values: Vec<u8>) -> Self {
        self.by_hour = values;
        self
    }

    pub fn by_day(mut self, values: Vec<NWeekday>) -> Self {
        self.by_day = values;
        self
    }

    pub fn by_month_day(mut self, values: Vec<i8>) -> Self {
        self.by_month_day = values;
        self
    }

    pub fn by_year_day(mut self, values: Vec<i16>) -> Self {
        self.by_year_day = values;
        self
    }

    pub fn by_week_no(mut self, values: Vec<i8>) -> Self {
        self.by_week_no = values;
        self
    }

    pub fn by_month(mut self, values: Vec<u8>) -> Self {
        self.by_month = values;
        self
    }

    pub fn by_set_pos(mut self, values: Vec<i16>) -> Self {
        self.by_set_pos = values;
        self
    }

    pub fn week_start(mut self, weekday: Weekday) -> Self {
        self.week_start = Some(weekday);
        self
    }

    /// Validate this builder against `dtstart` and produce an
    /// [`RRuleOptions`]. Delegates the actual invariant checks to
    /// [`crate::parser::validate`] so the string-based and builder-based
    /// entry points share one validator.
    pub fn build(self, dtstart: DateTime<Tz>) -> Result<RRuleOptions, RRuleError> {
        crate::parser::validate(self, dtstart)
    }
}
