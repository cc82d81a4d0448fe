//! LLM provider implementations

use crate::{LLMConfig, LLMError, LLMProvider, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Chat message for LLM communication
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    role: String,
    content: String,
}

impl ChatMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new("system", content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

/// LLM response
#[derive(Debug, Clone)]
pub struct LLMResponse {
    content: String,
    tokens_used: Option<u32>,
}

impl LLMResponse {
    pub fn new(content: String, tokens_used: Option<u32>) -> Self {
        Self {
            content,
            tokens_used,
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn tokens_used(&self) -> Option<u32> {
        self.tokens_used
    }
}

/// Trait for LLM providers
#[async_trait]
pub trait LLM: Send + Sync {
    async fn chat(&self, messages: Vec<ChatMessage>) -> Result<LLMResponse>;
    async fn is_available(&self) -> bool;
    fn provider_type(&self) -> LLMProvider;
}

/// OpenAI-compatible chat completion request, spoken by both providers
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    total_tokens: u32,
}

fn build_client(config: &LLMConfig) -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_seconds()))
        .build()?)
}

/// Models listing next to a chat-completions endpoint
fn models_endpoint(chat_endpoint: &str) -> String {
    match chat_endpoint.strip_suffix("/chat/completions") {
        Some(base) => format!("{}/models", base),
        None => chat_endpoint.to_string(),
    }
}

async fn post_chat(
    client: &reqwest::Client,
    config: &LLMConfig,
    messages: Vec<ChatMessage>,
    bearer: Option<&str>,
) -> Result<LLMResponse> {
    let endpoint = config.resolved_endpoint();
    let request = ChatCompletionRequest {
        model: config.model(),
        messages,
        max_tokens: config.max_tokens(),
        temperature: config.temperature(),
    };

    debug!("Sending request to {:?} at {}", config.provider(), endpoint);

    let mut builder = client.post(endpoint).json(&request);
    if let Some(key) = bearer {
        builder = builder.bearer_auth(key);
    }
    let response = builder.send().await?;

    if !response.status().is_success() {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        return Err(LLMError::ResponseError(format!(
            "{:?} API error {}: {}",
            config.provider(),
            status,
            text
        )));
    }

    let completion: ChatCompletionResponse = response.json().await?;
    let content = completion
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content)
        .ok_or_else(|| {
            LLMError::ResponseError(format!("No response from {:?}", config.provider()))
        })?;

    Ok(LLMResponse::new(
        content,
        completion.usage.map(|u| u.total_tokens),
    ))
}

/// LMStudio provider implementation
pub struct LMStudioProvider {
    config: LLMConfig,
    client: reqwest::Client,
}

impl LMStudioProvider {
    pub fn new(config: LLMConfig) -> Result<Self> {
        let client = build_client(&config)?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl LLM for LMStudioProvider {
    async fn chat(&self, messages: Vec<ChatMessage>) -> Result<LLMResponse> {
        post_chat(&self.client, &self.config, messages, None).await
    }

    async fn is_available(&self) -> bool {
        let url = models_endpoint(self.config.resolved_endpoint());
        match self.client.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    fn provider_type(&self) -> LLMProvider {
        LLMProvider::LMStudio
    }
}

/// OpenAI provider implementation
pub struct OpenAIProvider {
    config: LLMConfig,
    client: reqwest::Client,
    api_key: String,
}

impl OpenAIProvider {
    pub fn new(config: LLMConfig) -> Result<Self> {
        let api_key = config
            .api_key()
            .map(str::to_string)
            .ok_or_else(|| LLMError::Configuration("OpenAI API key required".to_string()))?;
        let client = build_client(&config)?;

        Ok(Self {
            config,
            client,
            api_key,
        })
    }
}

#[async_trait]
impl LLM for OpenAIProvider {
    async fn chat(&self, messages: Vec<ChatMessage>) -> Result<LLMResponse> {
        post_chat(&self.client, &self.config, messages, Some(&self.api_key)).await
    }

    async fn is_available(&self) -> bool {
        let url = models_endpoint(self.config.resolved_endpoint());
        match self.client.get(&url).bearer_auth(&self.api_key).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    fn provider_type(&self) -> LLMProvider {
        LLMProvider::OpenAI
    }
}

/// Create LLM instance based on configuration
pub fn create_llm(config: &LLMConfig) -> Result<Box<dyn LLM>> {
    match config.provider() {
        LLMProvider::LMStudio => Ok(Box::new(LMStudioProvider::new(config.clone())?)),
        LLMProvider::OpenAI => Ok(Box::new(OpenAIProvider::new(config.clone())?)),
    }
}
