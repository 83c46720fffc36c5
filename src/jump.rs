//! Component G: a heuristic coarse forward-seek used by `fast_forward` to
//! skip many intervals at once instead of walking one occurrence at a time.
//! Pure optimisation — callers never observe a difference between the
//! result of a jump-accelerated `fast_forward` and fine-grained stepping,
//! other than the counter becoming [`crate::rrule_iter::Counter::Opaque`]
//! (spec §9, Open Questions: "tests should treat the accelerator as an
//! optimisation and assert only on equality with fine-step results").

use chrono::DateTime;
use chrono_tz::Tz;

use crate::error::RRuleError;
use crate::options::{Frequency, RRuleOptions};
use crate::rrule::RRule;

/// Days per unit of `freq`, used only to turn a calendar distance into a
/// rough interval count. Deliberately approximate (30-day months, 365-day
/// years) — the legacy tuning constant the spec calls out.
fn freq_coeff(freq: Frequency) -> f64 {
    match freq {
        Frequency::Secondly => 1.0 / 86_400.0,
        Frequency::Minutely => 1.0 / 1_440.0,
        Frequency::Hourly => 1.0 / 24.0,
        Frequency::Daily => 1.0,
        Frequency::Weekly => 7.0,
        Frequency::Monthly => 30.0,
        Frequency::Yearly => 365.0,
    }
}

/// Coarse-jump `rrule` towards `target`, leaving the cursor at the last
/// known occurrence strictly before `target` (one fine `advance` away from
/// reaching or passing it). Only called when the rule is not COUNT-bounded;
/// the counter is left [`crate::rrule_iter::Counter::Opaque`] once any jump
/// is taken.
pub(crate) fn jump_forward(rrule: &mut RRule, target: DateTime<Tz>) -> Result<(), RRuleError> {
    debug_assert!(rrule.options().count.is_none());

    loop {
        let current = match rrule.current() {
            Some(dt) => dt,
            None => return Ok(()),
        };
        if current >= target {
            return Ok(());
        }

        let days_remaining = (target - current).num_seconds() as f64 / 86_400.0;
        let coeff = freq_coeff(rrule.options().freq);
        let remaining = days_remaining / coeff / f64::from(rrule.options().interval);
        let jump_size = (remaining / 4.0).floor().max(1.0) as u32;

        if jump_size <= 4 {
            return Ok(());
        }

        tracing::trace!(jump_size, ?current, ?target, "coarse jump");

        let before = rrule.snapshot();
        rrule.advance_raw(jump_size)?;
        rrule.mark_counter_opaque();

        match rrule.current() {
            Some(dt) if dt >= target => {
                // Overshot: restore the last known cursor strictly before
                // target and fall back to fine stepping from there.
                rrule.restore(before);
                rrule.advance_raw(1)?;
                return Ok(());
            }
            Some(_) => continue,
            None => {
                // Ran past the horizon; restore and let the caller's fine
                // loop discover exhaustion on its own terms.
                rrule.restore(before);
                return Ok(());
            }
        }
    }
}
