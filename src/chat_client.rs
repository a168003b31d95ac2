//! OpenAI-compatible chat-completions client backing [`HabitAssistant`].

use crate::assistant::{CoachContext, HabitAssistant, coach_prompt, parse_suggestions, suggestion_prompt};
use crate::config::AssistantConfig;
use crate::errors::AssistantError;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
pub struct ChatClient {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl ChatClient {
    pub fn new(config: &AssistantConfig, api_key: impl Into<String>) -> Result<Self, AssistantError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            api_key: api_key.into(),
            model: config.model.clone(),
        })
    }

    async fn complete(&self, prompt: String) -> Result<String, AssistantError> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(AssistantError::RateLimited);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AssistantError::Http {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|err| AssistantError::InvalidResponse(err.to_string()))?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| AssistantError::InvalidResponse("no message content".into()))
    }
}

#[async_trait]
impl HabitAssistant for ChatClient {
    async fn suggest(&self, interests: &str) -> Result<Vec<String>, AssistantError> {
        let reply = self.complete(suggestion_prompt(interests)).await?;
        let habits = parse_suggestions(&reply);
        if habits.is_empty() {
            return Err(AssistantError::InvalidResponse("no suggestions in reply".into()));
        }
        Ok(habits)
    }

    async fn coach(&self, context: &CoachContext) -> Result<String, AssistantError> {
        self.complete(coach_prompt(context)).await
    }
}

fn map_transport_error(err: reqwest::Error) -> AssistantError {
    if err.is_timeout() {
        AssistantError::Timeout
    } else {
        AssistantError::Transport(err)
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}
