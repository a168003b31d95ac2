use crate::handlers;
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post, put},
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/habits", get(handlers::list_habits).post(handlers::create_habit))
        .route("/api/habits/batch", post(handlers::create_batch))
        .route("/api/habits/:id", put(handlers::edit_habit).delete(handlers::delete_habit))
        .route("/api/habits/:id/toggle", post(handlers::toggle_habit))
        .route("/api/today", get(handlers::get_today))
        .route("/api/stats", get(handlers::get_stats))
        .route("/api/suggestions", post(handlers::suggest))
        .route("/api/coach", get(handlers::coach))
        .route("/api/settings", get(handlers::get_settings))
        .with_state(state)
}
