//! Time helpers on Unix-millisecond timestamps
//!
//! Everything in the engine takes `now` explicitly; only callers at the edge
//! read the wall clock (`shared::util::now_millis`).

pub const MILLIS_PER_HOUR: i64 = 3_600_000;
pub const MILLIS_PER_DAY: i64 = 24 * MILLIS_PER_HOUR;

/// Whole days until `target`, rounded up. Zero or negative once reached.
pub fn days_until(target: i64, now: i64) -> i64 {
    let diff = target - now;
    let days = diff.div_euclid(MILLIS_PER_DAY);
    if diff.rem_euclid(MILLIS_PER_DAY) > 0 {
        days + 1
    } else {
        days
    }
}

/// Strictly after the deadline
#[inline]
pub fn is_past(deadline: i64, now: i64) -> bool {
    now > deadline
}

#[inline]
pub fn add_hours(ts: i64, hours: i64) -> i64 {
    ts + hours * MILLIS_PER_HOUR
}

#[inline]
pub fn add_days(ts: i64, days: i64) -> i64 {
    ts + days * MILLIS_PER_DAY
}
