//! Component E: the five frequency drivers that advance the cursor to the
//! next occurrence. Each driver consults [`crate::monthinfo`] when it needs
//! monthly/yearly BY-part expansion and [`crate::datetime`] for wall-clock
//! preserving date math. [`dispatch`] is the single entry point the public
//! iterator (`crate::rrule`) calls.

mod daily;
mod hourly;
mod monthly;
mod weekly;
mod yearly;

use chrono::DateTime;
use chrono_tz::Tz;

use crate::error::RRuleError;
use crate::options::{Frequency, RRuleOptions};

/// Advance `cursor` by `n` intervals of `opts.freq`. Returns `Ok(None)` when
/// the horizon is crossed (the caller marks the cursor exhausted), or
/// `Err(HorizonExceeded)` for the one case the spec calls out explicitly:
/// a yearly scan overrunning the horizon while `yearly_skip_upper_limit` is
/// disabled.
pub(crate) fn dispatch(
    opts: &RRuleOptions,
    start: DateTime<Tz>,
    cursor: DateTime<Tz>,
    hour_jump: &mut i64,
    n: u32,
    yearly_skip_upper_limit: bool,
) -> Result<Option<DateTime<Tz>>, RRuleError> {
    match opts.freq {
        Frequency::Secondly | Frequency::Minutely | Frequency::Hourly => {
            Ok(hourly::advance(opts, cursor, hour_jump, n))
        }
        Frequency::Daily => Ok(daily::advance(opts, start, cursor, n)),
        Frequency::Weekly => Ok(weekly::advance(opts, start, cursor, n)),
        Frequency::Monthly => Ok(monthly::advance(opts, start, cursor, n)),
        Frequency::Yearly => yearly::advance(opts, start, cursor, n, yearly_skip_upper_limit),
    }
}
