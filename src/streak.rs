use crate::dates::add_days;
use crate::models::{Completions, is_completed};
use chrono::NaiveDate;

/// Consecutive completed days ending today, or ending yesterday when today
/// has not been completed yet.
pub fn current_streak(completions: &Completions, today: NaiveDate) -> u32 {
    let mut cursor = if is_completed(completions, today) {
        today
    } else {
        add_days(today, -1)
    };

    let mut streak = 0;
    while is_completed(completions, cursor) {
        streak += 1;
        cursor = add_days(cursor, -1);
    }
    streak
}

/// Longest run of calendar-consecutive completed days anywhere in the ledger.
pub fn longest_streak(completions: &Completions) -> u32 {
    let mut longest = 0;
    let mut run = 0;
    let mut previous: Option<NaiveDate> = None;

    // BTreeMap iterates in ascending date order.
    for (&day, _) in completions.iter().filter(|(_, done)| **done) {
        run = match previous {
            Some(prev) if add_days(prev, 1) == day => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        previous = Some(day);
    }
    longest
}
