use crate::models::{Habit, hhmm};
use crate::schedule::is_due;
use crate::store::HabitStore;
use chrono::{Local, NaiveDate, NaiveDateTime};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

pub const SCAN_PERIOD: Duration = Duration::from_secs(60);

/// Longest stretch of wall-clock time a single scan looks back over, so a
/// resume after a long suspend does not replay a backlog of stale reminders.
const MAX_CATCH_UP_MINUTES: i64 = 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reminder {
    pub habit_id: String,
    pub day: NaiveDate,
    pub title: String,
    pub body: String,
}

/// Delivery target for reminders. Platform notification adapters implement this.
pub trait ReminderSink: Send + Sync {
    fn deliver(&self, reminder: &Reminder);
}

/// Emits each reminder as a log event.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl ReminderSink for LogSink {
    fn deliver(&self, reminder: &Reminder) {
        info!(habit_id = %reminder.habit_id, title = %reminder.title, "{}", reminder.body);
    }
}

/// Habits whose time of day falls in `(since, now]`, counting only days on
/// which the habit is due and still open. A wall clock that steps forward
/// between scans widens the window instead of skipping a minute; one that
/// steps backward yields an empty window.
pub fn due_reminders(habits: &[Habit], since: NaiveDateTime, now: NaiveDateTime) -> Vec<Reminder> {
    let since = since.max(now - chrono::Duration::minutes(MAX_CATCH_UP_MINUTES));
    if since >= now {
        return Vec::new();
    }

    let mut days = vec![since.date()];
    if now.date() != since.date() {
        days.push(now.date());
    }

    let mut reminders = Vec::new();
    for habit in habits {
        let Some(time) = habit.time else {
            continue;
        };
        for &day in &days {
            let at = day.and_time(time);
            if at <= since || at > now {
                continue;
            }
            if !is_due(habit.days.as_ref(), day) || habit.is_completed_on(day) {
                continue;
            }
            reminders.push(Reminder {
                habit_id: habit.id.clone(),
                day,
                title: "Habit reminder".to_string(),
                body: format!("Time for \"{}\" ({})", habit.name, hhmm::format(time)),
            });
        }
    }
    reminders
}

/// Remembers what has already been delivered so a habit fires at most once a day.
#[derive(Debug, Default)]
pub struct ReminderLog {
    sent: HashSet<(String, NaiveDate)>,
}

impl ReminderLog {
    /// Filters out reminders already sent for their day, recording the rest.
    /// Entries older than yesterday are forgotten.
    pub fn fresh(&mut self, today: NaiveDate, reminders: Vec<Reminder>) -> Vec<Reminder> {
        let horizon = today.pred_opt().unwrap_or(today);
        self.sent.retain(|(_, sent_on)| *sent_on >= horizon);
        reminders
            .into_iter()
            .filter(|reminder| self.sent.insert((reminder.habit_id.clone(), reminder.day)))
            .collect()
    }
}

/// Starts the periodic scan. Abort the returned handle to stop it.
pub fn spawn(
    store: Arc<Mutex<HabitStore>>,
    sink: Arc<dyn ReminderSink>,
    period: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut log = ReminderLog::default();
        let lookback = chrono::Duration::from_std(period).unwrap_or_else(|_| chrono::Duration::minutes(1));
        let mut last_scan = Local::now().naive_local() - lookback;

        loop {
            ticker.tick().await;
            let now = Local::now().naive_local();
            let pending = {
                let store = store.lock().await;
                due_reminders(store.habits(), last_scan, now)
            };
            last_scan = now;
            let fresh = log.fresh(now.date(), pending);
            debug!(count = fresh.len(), "reminder scan");
            for reminder in &fresh {
                sink.deliver(reminder);
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::Day;
    use chrono::{NaiveTime, TimeZone, Utc};
    use std::collections::BTreeSet;

    fn at(hour: u32, minute: u32, second: u32) -> NaiveDateTime {
        // 2026-01-05 is a Monday.
        NaiveDate::from_ymd_opt(2026, 1, 5)
            .unwrap()
            .and_hms_opt(hour, minute, second)
            .unwrap()
    }

    fn habit(id: &str, time: Option<(u32, u32)>, days: Option<BTreeSet<Day>>) -> Habit {
        Habit {
            id: id.to_string(),
            name: format!("habit {id}"),
            completions: Default::default(),
            created_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
            time: time.and_then(|(h, m)| NaiveTime::from_hms_opt(h, m, 0)),
            days,
        }
    }

    #[test]
    fn fires_when_time_falls_inside_the_scan_window() {
        let habits = [habit("a", Some((7, 30)), None), habit("b", None, None)];
        let reminders = due_reminders(&habits, at(7, 29, 30), at(7, 30, 30));
        assert_eq!(reminders.len(), 1);
        assert_eq!(reminders[0].habit_id, "a");
        assert_eq!(reminders[0].day, at(7, 30, 0).date());
        assert!(reminders[0].body.contains("07:30"));

        assert!(due_reminders(&habits, at(7, 30, 30), at(7, 31, 30)).is_empty());
    }

    #[test]
    fn clock_jump_forward_still_fires_skipped_minutes() {
        let habits = [habit("a", Some((7, 30)), None), habit("b", Some((7, 40)), None)];
        // Wall clock stepped from 07:28 to 07:35 between two ticks.
        let reminders = due_reminders(&habits, at(7, 28, 10), at(7, 35, 10));
        let ids: Vec<&str> = reminders.iter().map(|r| r.habit_id.as_str()).collect();
        assert_eq!(ids, ["a"]);
    }

    #[test]
    fn clock_jump_backward_fires_nothing() {
        let habits = [habit("a", Some((7, 30)), None)];
        assert!(due_reminders(&habits, at(7, 31, 0), at(7, 29, 0)).is_empty());
    }

    #[test]
    fn long_gaps_only_look_back_one_hour() {
        let habits = [habit("early", Some((6, 0)), None), habit("late", Some((9, 30)), None)];
        let reminders = due_reminders(&habits, at(1, 0, 0), at(10, 0, 0));
        let ids: Vec<&str> = reminders.iter().map(|r| r.habit_id.as_str()).collect();
        assert_eq!(ids, ["late"]);
    }

    #[test]
    fn window_spanning_midnight_uses_each_day() {
        let habits = [habit("midnight", Some((0, 0)), None)];
        let since = at(23, 59, 30);
        let now = NaiveDate::from_ymd_opt(2026, 1, 6)
            .unwrap()
            .and_hms_opt(0, 0, 30)
            .unwrap();
        let reminders = due_reminders(&habits, since, now);
        assert_eq!(reminders.len(), 1);
        assert_eq!(reminders[0].day, now.date());
    }

    #[test]
    fn skips_completed_and_unscheduled_habits() {
        let mut done = habit("done", Some((9, 0)), None);
        done.completions.insert(at(9, 0, 0).date(), true);
        let weekend = habit("weekend", Some((9, 0)), Some(BTreeSet::from([Day::Sat, Day::Sun])));
        let monday = habit("monday", Some((9, 0)), Some(BTreeSet::from([Day::Mon])));

        let reminders = due_reminders(&[done, weekend, monday], at(8, 59, 30), at(9, 0, 30));
        let ids: Vec<&str> = reminders.iter().map(|r| r.habit_id.as_str()).collect();
        assert_eq!(ids, ["monday"]);
    }

    #[test]
    fn log_delivers_once_per_day() {
        let habits = [habit("a", Some((7, 30)), None)];
        let mut log = ReminderLog::default();
        let day = at(7, 30, 0).date();

        let scan = || due_reminders(&habits, at(7, 29, 30), at(7, 30, 30));
        assert_eq!(log.fresh(day, scan()).len(), 1);
        assert!(log.fresh(day, scan()).is_empty());

        let next_day = day.succ_opt().unwrap();
        let next = due_reminders(
            &habits,
            next_day.and_hms_opt(7, 29, 30).unwrap(),
            next_day.and_hms_opt(7, 30, 30).unwrap(),
        );
        assert_eq!(log.fresh(next_day, next).len(), 1);
    }
}
