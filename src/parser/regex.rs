//! Lexical validation for individual rule-part tokens.
//!
//! The rest of the parser normalises case and splits on `;`/`,`; this module
//! is only responsible for recognising the shape of a single `BYDAY` token
//! and a single `WKST`/weekday abbreviation, the two places the rule grammar
//! has syntax beyond "a list of integers".

use once_cell::sync::Lazy;
use regex::Regex;

/// Matches one `BYDAY` entry: an optional sign, an optional ordinal 1-5, and
/// a two-letter weekday abbreviation. E.g. `MO`, `+1MO`, `-1FR`, `2TU`.
pub(crate) static BYDAY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^([+-]?)([1-5])?(SU|MO|TU|WE|TH|FR|SA)$").expect("valid regex"));

pub(crate) struct ByDayToken {
    pub n: Option<i8>,
    pub weekday: chrono::Weekday,
}

pub(crate) fn parse_by_day_token(token: &str) -> Option<ByDayToken> {
    let caps = BYDAY_RE.captures(token.trim())?;
    let sign = if caps.get(1).map(|m| m.as_str()) == Some("-") {
        -1i8
    } else {
        1i8
    };
    let n = caps
        .get(2)
        .map(|m| m.as_str().parse::<i8>().expect("regex guarantees digit") * sign);
    let weekday = weekday_from_abbrev(&caps[3])?;
    Some(ByDayToken { n, weekday })
}

pub(crate) fn weekday_from_abbrev(abbrev: &str) -> Option<chrono::Weekday> {
    use chrono::Weekday::*;
    Some(match abbrev.to_ascii_uppercase().as_str() {
        "SU" => Sun,
        "MO" => Mon,
        "TU" => Tue,
        "WE" => Wed,
        "TH" => Thu,
        "FR" => Fri,
        "SA" => Sat,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_weekday() {
        let tok = parse_by_day_token("mo").unwrap();
        assert_eq!(tok.n, None);
        assert_eq!(tok.weekday, chrono::Weekday::Mon);
    }

    #[test]
    fn parses_signed_ordinal() {
        let tok = parse_by_day_token("-1FR").unwrap();
        assert_eq!(tok.n, Some(-1));
        assert_eq!(tok.weekday, chrono::Weekday::Fri);
    }

    #[test]
    fn parses_unsigned_ordinal() {
        let tok = parse_by_day_token("2TU").unwrap();
        assert_eq!(tok.n, Some(2));
        assert_eq!(tok.weekday, chrono::Weekday::Tue);
    }

    #[test]
    fn rejects_zero_and_out_of_range_ordinals() {
        assert!(parse_by_day_token("0MO").is_none());
        assert!(parse_by_day_token("6MO").is_none());
        assert!(parse_by_day_token("MONDAY").is_none());
    }
}
