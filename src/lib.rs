//! A recurrence rule (RRULE) expansion engine, per RFC 5545 §3.3.10.
//!
//! # Examples
//!
//! Quickstart: parse a rule string and take the first few occurrences.
//!
//! ```
//! use chrono::TimeZone;
//! use rrule::RRule;
//!
//! let dtstart = chrono_tz::UTC.with_ymd_and_hms(2020, 1, 1, 9, 0, 0).unwrap();
//! let mut rule = RRule::new("FREQ=DAILY;COUNT=5", dtstart).unwrap();
//!
//! let mut occurrences = vec![rule.current().unwrap()];
//! while let Some(dt) = rule.advance().unwrap() {
//!     occurrences.push(dt);
//! }
//! assert_eq!(occurrences.len(), 5);
//! ```
//!
//! Building a rule from [`RRuleProperties`] instead of a string:
//!
//! ```
//! use chrono::TimeZone;
//! use rrule::{Frequency, RRule, RRuleProperties};
//!
//! let dtstart = chrono_tz::UTC.with_ymd_and_hms(2020, 1, 1, 9, 0, 0).unwrap();
//! let properties = RRuleProperties::default()
//!     .freq(Frequency::Weekly)
//!     .interval(2)
//!     .count(6);
//!
//! let rule = RRule::from_properties(properties, dtstart).unwrap();
//! assert_eq!(rule.options().freq, Frequency::Weekly);
//! ```
//!
//! Iterating ergonomically with [`RRule::occurrences`]:
//!
//! ```
//! use chrono::TimeZone;
//! use rrule::RRule;
//!
//! let dtstart = chrono_tz::UTC.with_ymd_and_hms(2020, 1, 1, 9, 0, 0).unwrap();
//! let rule = RRule::new("FREQ=MONTHLY;COUNT=3", dtstart).unwrap();
//! let all: Vec<_> = rule.occurrences().collect();
//! assert_eq!(all.len(), 3);
//! ```

mod datetime;
mod error;
mod iter;
mod jump;
mod monthinfo;
mod options;
mod parser;
mod rrule;
mod rrule_iter;

pub use crate::error::RRuleError;
pub use crate::options::{Frequency, NWeekday, RRuleOptions, RRuleProperties};
pub use crate::parser::RuleInput;
pub use crate::rrule::{OccurrenceIter, RRule};
pub use crate::rrule_iter::{Counter, Cursor};

pub use chrono::Weekday;
pub use chrono_tz::Tz;
