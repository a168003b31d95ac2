//! Habit suggestions and coaching messages from a generative-AI service.
//!
//! Callers never see an assistant failure as an error: suggestions degrade to
//! [`SUGGESTION_FAILURE`] and coaching degrades to one of two static messages.

use crate::errors::AssistantError;
use crate::models::Habit;
use crate::schedule::is_due;
use crate::streak::current_streak;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;
use std::time::Duration;
use tracing::warn;

pub const SUGGESTION_FAILURE: &str = "Failed to get suggestions. Please try again.";
pub const FALLBACK_RATE_LIMITED: &str =
    "Your coach is taking a short breather. Keep going, every check-in counts!";
pub const FALLBACK_GENERIC: &str = "Keep up the great work! Every small step builds a better you.";

#[async_trait]
pub trait HabitAssistant: Send + Sync {
    /// Short habit names tailored to free-text interests.
    async fn suggest(&self, interests: &str) -> Result<Vec<String>, AssistantError>;

    /// One short motivational message for today's progress.
    async fn coach(&self, context: &CoachContext) -> Result<String, AssistantError>;
}

/// Stand-in used when no service is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineAssistant;

#[async_trait]
impl HabitAssistant for OfflineAssistant {
    async fn suggest(&self, _interests: &str) -> Result<Vec<String>, AssistantError> {
        Err(AssistantError::Unavailable)
    }

    async fn coach(&self, _context: &CoachContext) -> Result<String, AssistantError> {
        Err(AssistantError::Unavailable)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HabitStatus {
    pub name: String,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoachContext {
    pub habits: Vec<HabitStatus>,
    pub completed_today: u32,
    pub total_today: u32,
    pub longest_streak: u32,
    pub longest_streak_habit: Option<String>,
}

impl CoachContext {
    /// Summarises the habits due on `today`. The streak summary is the best
    /// current streak across every habit; earliest habit wins ties.
    pub fn from_habits(habits: &[Habit], today: NaiveDate) -> Self {
        let statuses: Vec<HabitStatus> = habits
            .iter()
            .filter(|habit| is_due(habit.days.as_ref(), today))
            .map(|habit| HabitStatus {
                name: habit.name.clone(),
                completed: habit.is_completed_on(today),
            })
            .collect();

        let mut longest_streak = 0;
        let mut longest_streak_habit = None;
        for habit in habits {
            let streak = current_streak(&habit.completions, today);
            if streak > longest_streak {
                longest_streak = streak;
                longest_streak_habit = Some(habit.name.clone());
            }
        }

        Self {
            completed_today: statuses.iter().filter(|status| status.completed).count() as u32,
            total_today: statuses.len() as u32,
            habits: statuses,
            longest_streak,
            longest_streak_habit,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoachMessage {
    pub message: String,
    pub fallback: bool,
}

pub fn fallback_message(err: &AssistantError) -> &'static str {
    if err.is_rate_limited() {
        FALLBACK_RATE_LIMITED
    } else {
        FALLBACK_GENERIC
    }
}

/// Asks for a coaching message, substituting a static one on failure or timeout.
pub async fn coach_or_fallback(
    assistant: &dyn HabitAssistant,
    context: &CoachContext,
    timeout: Duration,
) -> CoachMessage {
    let result = match tokio::time::timeout(timeout, assistant.coach(context)).await {
        Ok(result) => result,
        Err(_) => Err(AssistantError::Timeout),
    };

    match result {
        Ok(message) if !message.trim().is_empty() => CoachMessage {
            message: message.trim().to_string(),
            fallback: false,
        },
        Ok(_) => CoachMessage {
            message: FALLBACK_GENERIC.to_string(),
            fallback: true,
        },
        Err(err) => {
            warn!("coaching message unavailable: {err}");
            CoachMessage {
                message: fallback_message(&err).to_string(),
                fallback: true,
            }
        }
    }
}

pub async fn suggest_with_timeout(
    assistant: &dyn HabitAssistant,
    interests: &str,
    timeout: Duration,
) -> Result<Vec<String>, AssistantError> {
    match tokio::time::timeout(timeout, assistant.suggest(interests)).await {
        Ok(result) => result,
        Err(_) => Err(AssistantError::Timeout),
    }
}

pub fn suggestion_prompt(interests: &str) -> String {
    format!(
        "You are a helpful assistant that suggests new habits based on a person's interests and goals.\n\
         Suggest simple habits that are easy to fit into a daily routine.\n\
         Reply with one habit per line and nothing else.\n\n\
         Interests: {}",
        interests.trim()
    )
}

pub fn coach_prompt(context: &CoachContext) -> String {
    let mut prompt = String::from(
        "You are an upbeat, encouraging habit coach. Reply with one or two short sentences.\n\n\
         The user's status today:\n",
    );
    prompt.push_str(&format!(
        "- Habits completed today: {}\n- Total habits for today: {}\n",
        context.completed_today, context.total_today
    ));
    for status in &context.habits {
        let mark = if status.completed { "done" } else { "pending" };
        prompt.push_str(&format!("  - {} ({mark})\n", status.name));
    }
    if let Some(name) = &context.longest_streak_habit {
        prompt.push_str(&format!(
            "- Longest current streak: {} days for \"{name}\"\n",
            context.longest_streak
        ));
    }
    prompt.push_str(
        "\nRules:\n\
         - If every habit for today is done (and there is at least one), celebrate.\n\
         - If no habits are scheduled today, encourage adding one.\n\
         - If the longest streak is more than 5 days, praise it by name.\n\
         - If some are done, acknowledge progress and encourage finishing.\n\
         - If none are done yet, give an energising start-of-day message.\n",
    );
    prompt
}

/// Turns a free-form list reply into habit names, dropping numbering,
/// bullets, surrounding quotes and blank lines.
pub fn parse_suggestions(reply: &str) -> Vec<String> {
    reply
        .lines()
        .map(strip_list_marker)
        .map(|line| line.trim_matches(|c| c == '"' || c == '*').trim())
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

fn strip_list_marker(line: &str) -> &str {
    let line = line.trim();
    if let Some(rest) = line.strip_prefix(['-', '*', '•']) {
        return rest.trim_start();
    }
    let digits = line.chars().take_while(char::is_ascii_digit).count();
    if digits > 0 {
        if let Some(rest) = line[digits..].strip_prefix(['.', ')']) {
            return rest.trim_start();
        }
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::{Day, add_days};
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeSet;

    struct Scripted {
        coach: fn() -> Result<String, AssistantError>,
        delay: Duration,
    }

    #[async_trait]
    impl HabitAssistant for Scripted {
        async fn suggest(&self, interests: &str) -> Result<Vec<String>, AssistantError> {
            tokio::time::sleep(self.delay).await;
            Ok(vec![format!("Practice {interests}")])
        }

        async fn coach(&self, _context: &CoachContext) -> Result<String, AssistantError> {
            tokio::time::sleep(self.delay).await;
            (self.coach)()
        }
    }

    fn context() -> CoachContext {
        CoachContext::from_habits(&[], NaiveDate::from_ymd_opt(2026, 1, 5).unwrap())
    }

    #[test]
    fn parses_numbered_and_bulleted_replies() {
        let reply = "1. Drink a glass of water\n2) Stretch for 5 minutes\n\n- Read 10 pages\n* \"Walk after lunch\"\nJournal";
        assert_eq!(
            parse_suggestions(reply),
            [
                "Drink a glass of water",
                "Stretch for 5 minutes",
                "Read 10 pages",
                "Walk after lunch",
                "Journal",
            ]
        );
    }

    #[test]
    fn keeps_leading_numbers_that_are_not_markers() {
        assert_eq!(parse_suggestions("10 push-ups"), ["10 push-ups"]);
    }

    #[test]
    fn context_counts_due_habits_and_best_streak() {
        let today = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(); // Monday
        let make = |name: &str, done: &[i64], days: Option<BTreeSet<Day>>| Habit {
            id: name.to_string(),
            name: name.to_string(),
            completions: done.iter().map(|&d| (add_days(today, d), true)).collect(),
            created_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
            time: None,
            days,
        };
        let habits = [
            make("Read", &[0, -1], None),
            make("Run", &[-1, -2, -3], None),
            make("Swim", &[], Some(BTreeSet::from([Day::Sat]))),
        ];

        let context = CoachContext::from_habits(&habits, today);
        assert_eq!(context.total_today, 2);
        assert_eq!(context.completed_today, 1);
        assert_eq!(context.habits[0], HabitStatus { name: "Read".into(), completed: true });
        assert_eq!(context.longest_streak, 3);
        assert_eq!(context.longest_streak_habit.as_deref(), Some("Run"));

        let prompt = coach_prompt(&context);
        assert!(prompt.contains("Habits completed today: 1"));
        assert!(prompt.contains("3 days for \"Run\""));
    }

    #[tokio::test]
    async fn coach_passes_through_success() {
        let assistant = Scripted {
            coach: || Ok("  You did it!  ".to_string()),
            delay: Duration::ZERO,
        };
        let message = coach_or_fallback(&assistant, &context(), Duration::from_secs(1)).await;
        assert_eq!(message, CoachMessage { message: "You did it!".into(), fallback: false });
    }

    #[tokio::test]
    async fn coach_falls_back_by_error_kind() {
        let limited = Scripted {
            coach: || Err(AssistantError::RateLimited),
            delay: Duration::ZERO,
        };
        let message = coach_or_fallback(&limited, &context(), Duration::from_secs(1)).await;
        assert!(message.fallback);
        assert_eq!(message.message, FALLBACK_RATE_LIMITED);

        let message = coach_or_fallback(&OfflineAssistant, &context(), Duration::from_secs(1)).await;
        assert_eq!(message.message, FALLBACK_GENERIC);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_assistant_times_out() {
        let slow = Scripted {
            coach: || Ok("late".to_string()),
            delay: Duration::from_secs(60),
        };
        let message = coach_or_fallback(&slow, &context(), Duration::from_secs(5)).await;
        assert_eq!(message.message, FALLBACK_GENERIC);

        let err = suggest_with_timeout(&slow, "chess", Duration::from_secs(5)).await.unwrap_err();
        assert!(matches!(err, AssistantError::Timeout));
    }
}
