//! Component F: the public iterator surface. [`RRule`] owns the cursor and
//! the validated rule model exclusively (spec §3 "Ownership") and exposes
//! the operations from spec §4.F as plain methods rather than through an
//! inherited iterator interface (spec §9 design notes).

use std::str::FromStr;

use chrono::{DateTime, TimeZone};
use chrono_tz::Tz;

use crate::error::RRuleError;
use crate::iter;
use crate::jump;
use crate::options::{RRuleOptions, RRuleProperties};
use crate::parser::{self, RuleInput};
use crate::rrule_iter::{Counter, Cursor, IterState};

/// A recurrence rule bound to a start instant, with cursor state.
///
/// Two `RRule`s never share mutable state (spec §5): cloning one gives an
/// entirely independent iterator, cursor included.
#[derive(Debug, Clone)]
pub struct RRule {
    options: RRuleOptions,
    start: DateTime<Tz>,
    yearly_skip_upper_limit: bool,
    state: IterState,
}

/// A defensive snapshot of cursor state, used internally by the jump
/// accelerator (and by `fast_forward_before`) to rewind after an overshoot.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Snapshot(IterState);

impl RRule {
    /// Parse `rule` (a `KEY=VALUE;...` string or an equivalent mapping) and
    /// bind it to `start`. Equivalent to `RRule::new_with_options(rule,
    /// start, true)`.
    pub fn new<'a>(rule: impl Into<RuleInput<'a>>, start: DateTime<Tz>) -> Result<Self, RRuleError> {
        Self::new_with_options(rule, start, true)
    }

    /// Like [`RRule::new`], but with explicit control over
    /// `yearly_skip_upper_limit` (spec §6 construction inputs).
    pub fn new_with_options<'a>(
        rule: impl Into<RuleInput<'a>>,
        start: DateTime<Tz>,
        yearly_skip_upper_limit: bool,
    ) -> Result<Self, RRuleError> {
        let options = parser::parse(rule.into(), start)?;
        Ok(Self::from_options(options, start, yearly_skip_upper_limit))
    }

    /// Build from an already-validated [`RRuleOptions`] (e.g. produced by
    /// [`RRuleProperties::build`]).
    pub fn from_options(options: RRuleOptions, start: DateTime<Tz>, yearly_skip_upper_limit: bool) -> Self {
        RRule {
            options,
            start,
            yearly_skip_upper_limit,
            state: IterState::new(start),
        }
    }

    /// Build from an unvalidated [`RRuleProperties`] builder.
    pub fn from_properties(
        properties: RRuleProperties,
        start: DateTime<Tz>,
    ) -> Result<Self, RRuleError> {
        let options = properties.build(start)?;
        Ok(Self::from_options(options, start, true))
    }

    /// The validated rule model backing this iterator.
    pub fn options(&self) -> &RRuleOptions {
        &self.options
    }

    /// The anchor instant (first produced occurrence).
    pub fn start(&self) -> DateTime<Tz> {
        self.start
    }

    /// A defensive clone of the cursor, or `None` if exhausted. Pure.
    pub fn current(&self) -> Option<DateTime<Tz>> {
        self.state.current.as_date_time()
    }

    /// The cursor's 0-based ordinal, or `None` if it became opaque after a
    /// coarse jump.
    pub fn key(&self) -> Counter {
        self.state.counter
    }

    /// `true` iff neither COUNT nor UNTIL bounds the sequence.
    pub fn is_infinite(&self) -> bool {
        self.options.is_infinite()
    }

    /// Reset the cursor to `start`, counter to 0, and clear any pending
    /// DST-gap compensation.
    pub fn reset(&mut self) {
        self.state = IterState::new(self.start);
    }

    /// Move the cursor forward one occurrence.
    pub fn advance(&mut self) -> Result<Option<DateTime<Tz>>, RRuleError> {
        self.advance_raw(1)
    }

    /// Move the cursor forward, combining `n` intervals of the rule's
    /// cadence into a single arithmetic step (spec §4.F: "essential for
    /// jumpForward efficiency"). The counter still only advances by one,
    /// since a batched step does not correspond to `n` enumerated
    /// occurrences for BY-part-filtered frequencies — callers that rely on
    /// `n > 1` (only the jump accelerator does) must immediately call
    /// [`RRule::mark_counter_opaque`].
    pub(crate) fn advance_raw(&mut self, n: u32) -> Result<Option<DateTime<Tz>>, RRuleError> {
        let Cursor::Active(cursor) = self.state.current else {
            return Ok(None);
        };

        let next = iter::dispatch(
            &self.options,
            self.start,
            cursor,
            &mut self.state.hour_jump,
            n,
            self.yearly_skip_upper_limit,
        )?;

        match next {
            Some(dt) if self.within_bounds(dt) => {
                self.state.current = Cursor::Active(dt);
                self.state.counter = match self.state.counter {
                    Counter::Known(c) => Counter::Known(c + 1),
                    Counter::Opaque => Counter::Opaque,
                };
                Ok(Some(dt))
            }
            _ => {
                self.state.current = Cursor::Exhausted;
                Ok(None)
            }
        }
    }

    fn within_bounds(&self, dt: DateTime<Tz>) -> bool {
        if let Some(until) = self.options.until {
            if dt > until {
                return false;
            }
        }
        if let (Some(count), Counter::Known(c)) = (self.options.count, self.state.counter) {
            if c + 1 >= u64::from(count) {
                return false;
            }
        }
        true
    }

    /// Advance until `current() >= t`. When the rule is not COUNT-bounded,
    /// tries the jump accelerator (component G) first.
    pub fn fast_forward(&mut self, t: DateTime<Tz>) -> Result<(), RRuleError> {
        if self.options.count.is_none() {
            jump::jump_forward(self, t)?;
        }
        loop {
            match self.current() {
                Some(dt) if dt >= t => return Ok(()),
                Some(_) => {
                    if self.advance()?.is_none() {
                        return Ok(());
                    }
                }
                None => return Ok(()),
            }
        }
    }

    /// Advance until `current() >= t`, then back up to the last occurrence
    /// strictly before `t` (or `start`, if none precede it).
    pub fn fast_forward_before(&mut self, t: DateTime<Tz>) -> Result<(), RRuleError> {
        if self.options.count.is_none() {
            jump::jump_forward(self, t)?;
        }

        let mut last_before = self.snapshot();
        loop {
            match self.current() {
                Some(dt) if dt >= t => break,
                Some(_) => {
                    last_before = self.snapshot();
                    if self.advance()?.is_none() {
                        break;
                    }
                }
                None => break,
            }
        }
        self.restore(last_before);
        Ok(())
    }

    /// Advance to the final valid occurrence. Fails on an infinite rule.
    pub fn fast_forward_to_end(&mut self) -> Result<(), RRuleError> {
        if self.is_infinite() {
            return Err(RRuleError::LogicError(
                "fast_forward_to_end called on a rule with no COUNT or UNTIL".to_string(),
            ));
        }
        loop {
            let before = self.snapshot();
            if self.advance()?.is_none() {
                self.restore(before);
                return Ok(());
            }
        }
    }

    /// An ergonomic [`Iterator`] adaptor over remaining occurrences. Does
    /// not mutate `self` — it walks a clone.
    pub fn occurrences(&self) -> OccurrenceIter {
        OccurrenceIter { rrule: self.clone() }
    }

    pub(crate) fn snapshot(&self) -> Snapshot {
        Snapshot(self.state)
    }

    pub(crate) fn restore(&mut self, snapshot: Snapshot) {
        self.state = snapshot.0;
    }

    pub(crate) fn mark_counter_opaque(&mut self) {
        self.state.counter = Counter::Opaque;
    }
}

impl FromStr for RRule {
    type Err = RRuleError;

    /// Parsing a bare rule string with no DTSTART is not possible (the
    /// engine always needs an anchor) — use [`RRule::new`] instead. This
    /// impl exists only to validate rule *syntax* independent of a start
    /// instant, anchored at the Unix epoch in UTC.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let epoch = chrono_tz::UTC
            .timestamp_opt(0, 0)
            .single()
            .expect("epoch is unambiguous");
        RRule::new(s, epoch)
    }
}

/// Ergonomic, non-mutating iterator over an [`RRule`]'s remaining
/// occurrences, returned by [`RRule::occurrences`].
pub struct OccurrenceIter {
    rrule: RRule,
}

impl Iterator for OccurrenceIter {
    type Item = DateTime<Tz>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.rrule.current()?;
        let _ = self.rrule.advance().ok()?;
        Some(current)
    }
}
