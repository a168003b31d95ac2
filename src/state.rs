use crate::assistant::HabitAssistant;
use crate::store::HabitStore;
use std::{sync::Arc, time::Duration};
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Mutex<HabitStore>>,
    pub assistant: Arc<dyn HabitAssistant>,
    pub assistant_timeout: Duration,
    pub assistant_configured: bool,
    pub reminders_enabled: bool,
}

impl AppState {
    pub fn new(store: HabitStore, assistant: Arc<dyn HabitAssistant>, assistant_timeout: Duration) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            assistant,
            assistant_timeout,
            assistant_configured: false,
            reminders_enabled: false,
        }
    }

    pub fn with_assistant_configured(mut self, configured: bool) -> Self {
        self.assistant_configured = configured;
        self
    }

    pub fn with_reminders(mut self, enabled: bool) -> Self {
        self.reminders_enabled = enabled;
        self
    }
}
