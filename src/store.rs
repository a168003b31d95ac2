use crate::dates::Day;
use crate::models::{Habit, HabitSettings, HabitUpdate};
use crate::storage::{load_habits, persist_habits};
use chrono::{NaiveDate, Utc};
use std::collections::BTreeSet;
use std::path::PathBuf;
use tracing::{error, info};
use uuid::Uuid;

/// Sole owner of the habit collection. Every successful mutation swaps in a
/// new collection and writes it to disk; write failures are logged and the
/// in-memory state is kept.
#[derive(Debug)]
pub struct HabitStore {
    data_path: PathBuf,
    habits: Vec<Habit>,
    loaded: bool,
}

impl HabitStore {
    pub async fn open(data_path: PathBuf) -> Self {
        let habits = load_habits(&data_path).await;
        info!(path = %data_path.display(), count = habits.len(), "habits loaded");
        Self {
            data_path,
            habits,
            loaded: true,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn habits(&self) -> &[Habit] {
        &self.habits
    }

    pub fn get(&self, id: &str) -> Option<&Habit> {
        self.habits.iter().find(|habit| habit.id == id)
    }

    /// Timed habits first by time of day, then untimed; creation order breaks ties.
    pub fn sorted(&self) -> Vec<&Habit> {
        let mut habits: Vec<&Habit> = self.habits.iter().collect();
        habits.sort_by(|a, b| {
            let by_time = match (a.time, b.time) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            };
            by_time.then(a.created_at.cmp(&b.created_at))
        });
        habits
    }

    pub async fn create(&mut self, name: &str, settings: HabitSettings) -> Option<Habit> {
        let habit = new_habit(name, settings)?;
        let mut habits = self.habits.clone();
        habits.push(habit.clone());
        self.commit(habits).await;
        Some(habit)
    }

    /// Adds one habit per non-blank name; returns how many were added.
    pub async fn create_batch<I, S>(&mut self, names: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let added: Vec<Habit> = names
            .into_iter()
            .filter_map(|name| new_habit(name.as_ref(), HabitSettings::default()))
            .collect();
        if added.is_empty() {
            return 0;
        }

        let count = added.len();
        let mut habits = self.habits.clone();
        habits.extend(added);
        self.commit(habits).await;
        count
    }

    /// Replaces name, time and days. A name that trims to nothing is refused.
    pub async fn edit(&mut self, id: &str, update: HabitUpdate) -> bool {
        let name = update.name.trim();
        if name.is_empty() || self.get(id).is_none() {
            return false;
        }

        let days = collapse_days(update.days);
        let habits = self
            .habits
            .iter()
            .map(|habit| {
                if habit.id != id {
                    return habit.clone();
                }
                Habit {
                    name: name.to_string(),
                    time: update.time,
                    days: days.clone(),
                    ..habit.clone()
                }
            })
            .collect();
        self.commit(habits).await;
        true
    }

    pub async fn delete(&mut self, id: &str) -> bool {
        if self.get(id).is_none() {
            return false;
        }
        let habits = self
            .habits
            .iter()
            .filter(|habit| habit.id != id)
            .cloned()
            .collect();
        self.commit(habits).await;
        true
    }

    /// Flips the completion flag for `day`; returns the new flag, or `None`
    /// when no habit has that id.
    pub async fn toggle_completion(&mut self, id: &str, day: NaiveDate) -> Option<bool> {
        let current = self.get(id)?.is_completed_on(day);
        let habits = self
            .habits
            .iter()
            .map(|habit| {
                if habit.id != id {
                    return habit.clone();
                }
                let mut completions = habit.completions.clone();
                completions.insert(day, !current);
                Habit {
                    completions,
                    ..habit.clone()
                }
            })
            .collect();
        self.commit(habits).await;
        Some(!current)
    }

    async fn commit(&mut self, habits: Vec<Habit>) {
        self.habits = habits;
        if let Err(err) = persist_habits(&self.data_path, &self.habits).await {
            error!(path = %self.data_path.display(), "failed to persist habits: {err}");
        }
    }
}

fn new_habit(name: &str, settings: HabitSettings) -> Option<Habit> {
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Some(Habit {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        completions: Default::default(),
        created_at: Utc::now(),
        time: settings.time,
        days: collapse_days(settings.days),
    })
}

fn collapse_days(days: BTreeSet<Day>) -> Option<BTreeSet<Day>> {
    if days.is_empty() { None } else { Some(days) }
}
