//! Ordering of record streams
//!
//! Records are sequenced by time and, for equal times, by their position.
//! The sort is stable, so records with equal time and position keep their
//! insertion order and re-sorting a sorted stream leaves it unchanged.

use std::cmp::Ordering;

use crate::data::Timed;

/// Position of additional doses that are placed before everything else at their time
pub const EARLY_POSITION: i32 = -600;
/// Position of derived infusion-off records
pub const LATE_POSITION: i32 = -300;
/// Position of phantom observations inserted from forced sample times
pub const PHANTOM_POSITION: i32 = -100;

/// Compare two records by time only
pub fn by_time<A: Timed, B: Timed>(a: &A, b: &B) -> Ordering {
    // NaN times compare equal and keep their place
    a.time().partial_cmp(&b.time()).unwrap_or(Ordering::Equal)
}

/// Compare two records by position only
pub fn by_position<A: Timed, B: Timed>(a: &A, b: &B) -> Ordering {
    a.pos().cmp(&b.pos())
}

/// Compare by time, then by position
pub fn by_time_then_position<A: Timed, B: Timed>(a: &A, b: &B) -> Ordering {
    by_time(a, b).then_with(|| by_position(a, b))
}

/// Stable sort of `records` by time, then position
pub fn sort_records<R: Timed>(records: &mut [R]) {
    records.sort_by(by_time_then_position);
}

/// Whether `records` is already in time/position order
pub fn is_sorted<R: Timed>(records: &[R]) -> bool {
    records
        .windows(2)
        .all(|w| by_time_then_position(&w[0], &w[1]) != Ordering::Greater)
}
