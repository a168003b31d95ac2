use crate::dates::{add_days, short_label, today};
use crate::models::{DailyPoint, Habit, StatsResponse, StreakEntry, TodayResponse};
use crate::schedule::is_due;
use crate::streak::longest_streak;
use chrono::NaiveDate;

const WEEK_DAYS: i64 = 7;
const TOP_STREAKS: usize = 3;

pub fn build_stats(habits: &[Habit]) -> StatsResponse {
    build_stats_at(today(), habits)
}

pub fn build_stats_at(today: NaiveDate, habits: &[Habit]) -> StatsResponse {
    StatsResponse {
        weekly: weekly_completion(habits, today),
        top_streaks: top_streaks(habits, TOP_STREAKS),
    }
}

/// Completion rate for today and the six days before it, oldest first. Only
/// habits due on a given day count toward that day's total.
pub fn weekly_completion(habits: &[Habit], today: NaiveDate) -> Vec<DailyPoint> {
    (0..WEEK_DAYS)
        .rev()
        .map(|offset| {
            let date = add_days(today, -offset);
            let (completed, total) = completion_counts(habits, date);
            DailyPoint {
                date,
                label: short_label(date).to_string(),
                completed,
                total,
                percentage: percentage(completed, total),
            }
        })
        .collect()
}

pub fn today_progress(habits: &[Habit], today: NaiveDate) -> TodayResponse {
    let (completed, total) = completion_counts(habits, today);
    TodayResponse {
        date: today,
        completed,
        total,
        percentage: percentage(completed, total),
        all_done: total > 0 && completed == total,
    }
}

/// Habits ranked by longest-ever streak, habits without any streak left out.
pub fn top_streaks(habits: &[Habit], limit: usize) -> Vec<StreakEntry> {
    let mut entries: Vec<StreakEntry> = habits
        .iter()
        .map(|habit| StreakEntry {
            id: habit.id.clone(),
            name: habit.name.clone(),
            streak: longest_streak(&habit.completions),
        })
        .filter(|entry| entry.streak > 0)
        .collect();
    // Stable sort keeps collection order among equal streaks.
    entries.sort_by(|a, b| b.streak.cmp(&a.streak));
    entries.truncate(limit);
    entries
}

fn completion_counts(habits: &[Habit], date: NaiveDate) -> (u32, u32) {
    let due = habits.iter().filter(|habit| is_due(habit.days.as_ref(), date));
    due.fold((0, 0), |(completed, total), habit| {
        (completed + u32::from(habit.is_completed_on(date)), total + 1)
    })
}

fn percentage(completed: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    (f64::from(completed) / f64::from(total) * 100.0).round() as u32
}
