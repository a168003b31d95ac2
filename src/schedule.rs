use crate::dates::{Day, day_of_week};
use chrono::NaiveDate;
use std::collections::BTreeSet;

/// Whether a habit with the given weekday filter is due on `day`. No filter,
/// or an empty one, means every day.
pub fn is_due(days: Option<&BTreeSet<Day>>, day: NaiveDate) -> bool {
    match days {
        Some(days) if !days.is_empty() => days.contains(&day_of_week(day)),
        _ => true,
    }
}
