use crate::errors::StorageError;
use crate::models::Habit;
use std::collections::HashSet;
use std::path::Path;
use tokio::fs;
use tracing::{error, warn};

/// Reads the whole habit collection. A missing file is an empty collection;
/// an unreadable or corrupt one is logged and also treated as empty. Later
/// records reusing an earlier id are dropped.
pub async fn load_habits(path: &Path) -> Vec<Habit> {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(habits) => dedup_ids(habits),
            Err(err) => {
                warn!(path = %path.display(), "discarding corrupt habit file: {err}");
                Vec::new()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Vec::new(),
        Err(err) => {
            error!(path = %path.display(), "failed to read habit file: {err}");
            Vec::new()
        }
    }
}

fn dedup_ids(habits: Vec<Habit>) -> Vec<Habit> {
    let mut seen = HashSet::new();
    habits
        .into_iter()
        .filter(|habit| {
            let first = seen.insert(habit.id.clone());
            if !first {
                warn!(id = %habit.id, name = %habit.name, "dropping habit with duplicate id");
            }
            first
        })
        .collect()
}

pub async fn persist_habits(path: &Path, habits: &[Habit]) -> Result<(), StorageError> {
    let payload = serde_json::to_vec_pretty(habits)?;
    fs::write(path, payload).await?;
    Ok(())
}
