//! Completion provider
//!
//! OpenAI-compatible chat-completion API (OpenRouter by default)

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};

use crate::config::constants::{
    COMPLETION_MAX_TOKENS, COMPLETION_TEMPERATURE, COMPLETION_TIMEOUT, DEFAULT_COMPLETION_URL,
    DEFAULT_MODEL,
};
use crate::config::AppConfig;

/// Prefix of every user-visible completion failure
pub const AI_ERROR_PREFIX: &str = "AI Error:";

#[derive(Debug)]
pub enum CompletionError {
    MissingApiKey,
    Http(reqwest::Error),
    Api { status: u16, message: String },
    Json(String),
    MissingContent,
}

impl fmt::Display for CompletionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ", AI_ERROR_PREFIX)?;
        match self {
            CompletionError::MissingApiKey => {
                write!(f, "API key missing; set OPENROUTER_API_KEY in config.txt")
            }
            CompletionError::Http(e) => write!(f, "HTTP request failed: {}", e),
            CompletionError::Api { status, message } => {
                write!(f, "API error: {} - {}", status, message)
            }
            CompletionError::Json(msg) => write!(f, "JSON parse error: {}", msg),
            CompletionError::MissingContent => write!(f, "Missing content in response"),
        }
    }
}

impl std::error::Error for CompletionError {}

impl From<reqwest::Error> for CompletionError {
    fn from(err: reqwest::Error) -> Self {
        CompletionError::Http(err)
    }
}

/// Anything that can turn a prompt into generated text
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError>;
}

#[derive(Debug, Clone)]
pub struct CompletionConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub api_url: String,
    pub timeout: Duration,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            api_url: DEFAULT_COMPLETION_URL.to_string(),
            timeout: COMPLETION_TIMEOUT,
        }
    }
}

impl From<&AppConfig> for CompletionConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            api_url: config.completion_url.clone(),
            timeout: COMPLETION_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Clone, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatResponse {
    choices: Option<Vec<ChatChoice>>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatChoice {
    message: Option<ChatMessageResponse>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}

pub struct CompletionClient {
    client: Client,
    config: CompletionConfig,
}

impl CompletionClient {
    pub fn new(config: CompletionConfig) -> Result<Self, CompletionError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl CompletionProvider for CompletionClient {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(CompletionError::MissingApiKey)?;

        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            temperature: COMPLETION_TEMPERATURE,
            max_tokens: COMPLETION_MAX_TOKENS,
        };

        let start = Instant::now();

        let response = self
            .client
            .post(&self.config.api_url)
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let latency_ms = start.elapsed().as_millis() as u64;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let data: ChatResponse = response
            .json()
            .await
            .map_err(|e| CompletionError::Json(e.to_string()))?;

        let content = data
            .choices
            .and_then(|choices| choices.into_iter().next())
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .ok_or(CompletionError::MissingContent)?;

        tracing::debug!(
            model = %self.config.model,
            latency_ms,
            prompt_len = prompt.len(),
            "completion received"
        );

        Ok(content.trim().to_string())
    }
}
