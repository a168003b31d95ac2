use crate::errors::ConfigError;
use std::{env, path::PathBuf, time::Duration};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATA_PATH: &str = "data/habits.json";
const DEFAULT_ASSISTANT_URL: &str = "https://api.openai.com/v1";
const DEFAULT_ASSISTANT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_ASSISTANT_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistantConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    pub data_path: PathBuf,
    pub reminders_enabled: bool,
    pub assistant: AssistantConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source. Blank
    /// values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let port = match get("PORT") {
            Some(value) => parse_number("PORT", &value)?,
            None => DEFAULT_PORT,
        };
        let data_path = get("APP_DATA_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH));
        let reminders_enabled = match get("REMINDERS_ENABLED") {
            Some(value) => parse_flag("REMINDERS_ENABLED", &value)?,
            None => true,
        };
        let timeout_secs = match get("ASSISTANT_TIMEOUT_SECS") {
            Some(value) => parse_number("ASSISTANT_TIMEOUT_SECS", &value)?,
            None => DEFAULT_ASSISTANT_TIMEOUT_SECS,
        };

        Ok(Self {
            port,
            data_path,
            reminders_enabled,
            assistant: AssistantConfig {
                base_url: get("ASSISTANT_API_URL")
                    .unwrap_or_else(|| DEFAULT_ASSISTANT_URL.to_string()),
                api_key: get("ASSISTANT_API_KEY"),
                model: get("ASSISTANT_MODEL").unwrap_or_else(|| DEFAULT_ASSISTANT_MODEL.to_string()),
                timeout: Duration::from_secs(timeout_secs),
            },
        })
    }
}

fn parse_number<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: value.to_string(),
    })
}

fn parse_flag(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: value.to_string(),
        }),
    }
}
