pub mod app;
pub mod assistant;
pub mod chat_client;
pub mod config;
pub mod dates;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod reminders;
pub mod schedule;
pub mod state;
pub mod stats;
pub mod storage;
pub mod store;
pub mod streak;
pub mod ui;

pub use app::router;
pub use config::Config;
pub use state::AppState;
pub use store::HabitStore;
