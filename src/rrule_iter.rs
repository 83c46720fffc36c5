//! The cursor types behind the public iterator surface (component F).
//!
//! Modelled as tagged unions rather than sentinel values, per spec §9's
//! design notes: a "null cursor" is [`Cursor::Exhausted`], and a counter that
//! has become meaningless after a coarse jump is [`Counter::Opaque`] rather
//! than some NaN-like in-band value.

use chrono::DateTime;
use chrono_tz::Tz;

/// The cursor's current position, or the fact that the sequence is done.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cursor {
    Active(DateTime<Tz>),
    Exhausted,
}

impl Cursor {
    pub fn as_date_time(&self) -> Option<DateTime<Tz>> {
        match self {
            Cursor::Active(dt) => Some(*dt),
            Cursor::Exhausted => None,
        }
    }
}

/// The cursor's ordinal within the sequence, or "unknown" after a coarse
/// jump (spec §3: "may become unknown after a coarse jump").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
    Known(u64),
    Opaque,
}

impl Counter {
    pub fn as_known(&self) -> Option<u64> {
        match self {
            Counter::Known(n) => Some(*n),
            Counter::Opaque => None,
        }
    }
}

/// `(current_date, counter, hour_jump)` — the full mutable state owned by an
/// [`crate::rrule::RRule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct IterState {
    pub current: Cursor,
    pub counter: Counter,
    pub hour_jump: i64,
}

impl IterState {
    pub fn new(start: DateTime<Tz>) -> Self {
        IterState {
            current: Cursor::Active(start),
            counter: Counter::Known(0),
            hour_jump: 0,
        }
    }
}
