//! Wake-up lateness determination.
//!
//! A report is late when it lands strictly after the target time plus the
//! grace window: the interval is half-open, so a report at exactly
//! target+grace is still on time.

use chrono::{Duration, NaiveDateTime, NaiveTime};

/// `true` iff `now` is strictly past today's target time plus `grace`.
pub fn is_late(now: NaiveDateTime, target: NaiveTime, grace: Duration) -> bool {
    let deadline = now.date().and_time(target) + grace;
    now > deadline
}
