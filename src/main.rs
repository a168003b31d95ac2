use habit_tracker::{
    AppState, Config, HabitStore,
    assistant::{HabitAssistant, OfflineAssistant},
    chat_client::ChatClient,
    reminders::{self, LogSink},
    router,
};
use std::{net::SocketAddr, sync::Arc};
use tokio::fs;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env()?;
    if let Some(parent) = config.data_path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let assistant: Arc<dyn HabitAssistant> = match &config.assistant.api_key {
        Some(key) => Arc::new(ChatClient::new(&config.assistant, key.clone())?),
        None => {
            warn!("ASSISTANT_API_KEY not set; suggestions and coaching use fallbacks");
            Arc::new(OfflineAssistant)
        }
    };

    let store = HabitStore::open(config.data_path.clone()).await;
    let state = AppState::new(store, assistant, config.assistant.timeout)
        .with_assistant_configured(config.assistant.api_key.is_some())
        .with_reminders(config.reminders_enabled);

    let reminder_task = if config.reminders_enabled {
        Some(reminders::spawn(
            Arc::clone(&state.store),
            Arc::new(LogSink),
            reminders::SCAN_PERIOD,
        ))
    } else {
        info!("reminders disabled");
        None
    };

    let app = router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(task) = reminder_task {
        task.abort();
    }
    info!("shut down");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
}
