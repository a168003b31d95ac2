use crate::assistant::{CoachContext, SUGGESTION_FAILURE, coach_or_fallback, suggest_with_timeout};
use crate::dates::today;
use crate::errors::AppError;
use crate::models::{
    BatchRequest, CoachResponse, Habit, HabitListResponse, HabitRequest, HabitSettings, HabitUpdate,
    HabitView, SettingsResponse, StatsResponse, SuggestRequest, SuggestResponse, TodayResponse,
    ToggleRequest, hhmm,
};
use crate::schedule::is_due;
use crate::state::AppState;
use crate::stats::{build_stats, today_progress};
use crate::store::HabitStore;
use crate::streak::{current_streak, longest_streak};
use crate::ui::render_index;
use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    response::Html,
};
use chrono::{NaiveDate, NaiveTime};
use tracing::warn;

pub async fn index(State(state): State<AppState>) -> Html<String> {
    Html(render_index(today(), state.reminders_enabled))
}

pub async fn list_habits(State(state): State<AppState>) -> Json<HabitListResponse> {
    let store = state.store.lock().await;
    Json(habit_list(&store))
}

pub async fn create_habit(
    State(state): State<AppState>,
    Json(payload): Json<HabitRequest>,
) -> Result<Json<HabitListResponse>, AppError> {
    let settings = HabitSettings {
        time: parse_time(payload.time.as_deref())?,
        days: payload.days.into_iter().collect(),
    };
    let mut store = state.store.lock().await;
    store.create(&payload.name, settings).await;
    Ok(Json(habit_list(&store)))
}

pub async fn create_batch(
    State(state): State<AppState>,
    Json(payload): Json<BatchRequest>,
) -> Json<HabitListResponse> {
    let mut store = state.store.lock().await;
    store.create_batch(&payload.names).await;
    Json(habit_list(&store))
}

pub async fn edit_habit(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<HabitRequest>,
) -> Result<Json<HabitListResponse>, AppError> {
    let update = HabitUpdate {
        name: payload.name,
        time: parse_time(payload.time.as_deref())?,
        days: payload.days.into_iter().collect(),
    };
    let mut store = state.store.lock().await;
    store.edit(&id, update).await;
    Ok(Json(habit_list(&store)))
}

pub async fn delete_habit(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<HabitListResponse> {
    let mut store = state.store.lock().await;
    store.delete(&id).await;
    Json(habit_list(&store))
}

pub async fn toggle_habit(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<HabitListResponse>, AppError> {
    let day = toggle_day(&body)?;
    let mut store = state.store.lock().await;
    store.toggle_completion(&id, day).await;
    Ok(Json(habit_list(&store)))
}

pub async fn get_today(State(state): State<AppState>) -> Json<TodayResponse> {
    let store = state.store.lock().await;
    Json(today_progress(store.habits(), today()))
}

pub async fn get_stats(State(state): State<AppState>) -> Json<StatsResponse> {
    let store = state.store.lock().await;
    Json(build_stats(store.habits()))
}

pub async fn suggest(
    State(state): State<AppState>,
    Json(payload): Json<SuggestRequest>,
) -> Result<Json<SuggestResponse>, AppError> {
    let interests = payload.interests.trim();
    if interests.is_empty() {
        return Err(AppError::bad_request("interests must not be empty"));
    }

    match suggest_with_timeout(state.assistant.as_ref(), interests, state.assistant_timeout).await {
        Ok(habits) => Ok(Json(SuggestResponse { habits })),
        Err(err) => {
            warn!("habit suggestions failed: {err}");
            Err(AppError::bad_gateway(SUGGESTION_FAILURE))
        }
    }
}

pub async fn coach(State(state): State<AppState>) -> Json<CoachResponse> {
    // Snapshot under the lock; the assistant call must not hold it.
    let context = {
        let store = state.store.lock().await;
        CoachContext::from_habits(store.habits(), today())
    };
    let message = coach_or_fallback(state.assistant.as_ref(), &context, state.assistant_timeout).await;
    Json(CoachResponse {
        message: message.message,
        fallback: message.fallback,
    })
}

pub async fn get_settings(State(state): State<AppState>) -> Json<SettingsResponse> {
    Json(SettingsResponse {
        reminders_enabled: state.reminders_enabled,
        assistant_configured: state.assistant_configured,
    })
}

fn habit_list(store: &HabitStore) -> HabitListResponse {
    let today = today();
    HabitListResponse {
        loaded: store.is_loaded(),
        today,
        habits: store
            .sorted()
            .into_iter()
            .map(|habit| to_view(habit, today))
            .collect(),
    }
}

fn to_view(habit: &Habit, today: NaiveDate) -> HabitView {
    HabitView {
        id: habit.id.clone(),
        name: habit.name.clone(),
        created_at: habit.created_at,
        time: habit.time.map(hhmm::format),
        days: habit.days.iter().flatten().copied().collect(),
        completed_today: habit.is_completed_on(today),
        due_today: is_due(habit.days.as_ref(), today),
        current_streak: current_streak(&habit.completions, today),
        longest_streak: longest_streak(&habit.completions),
    }
}

/// An empty body toggles today; a body that names an unreadable day is refused.
fn toggle_day(body: &[u8]) -> Result<NaiveDate, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(today());
    }
    let request: ToggleRequest = serde_json::from_slice(body)
        .map_err(|err| AppError::bad_request(format!("invalid toggle request: {err}")))?;
    Ok(request.date.unwrap_or_else(today))
}

fn parse_time(value: Option<&str>) -> Result<Option<NaiveTime>, AppError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => hhmm::parse(text)
            .map(Some)
            .ok_or_else(|| AppError::bad_request(format!("time must be HH:MM, got {text:?}"))),
    }
}
