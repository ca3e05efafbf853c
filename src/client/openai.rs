//! Chat-completions inference client
//!
//! Speaks the OpenAI `/v1/chat/completions` wire format. The API key is read
//! from `OPENAI_KEY` on the first call unless one was supplied up front.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info};

use super::types::{ChatMessage, ChatRequest, ChatResponse, CompletionRequest};
use super::{ClientError, Inference};
use crate::config::{Credentials, InferenceConfig};

#[derive(Debug)]
pub struct OpenAiClient {
    client: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
}

impl OpenAiClient {
    pub fn new(config: &InferenceConfig) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            api_key: None,
        })
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    fn api_key(&self) -> Result<String, ClientError> {
        match &self.api_key {
            Some(key) => Ok(key.clone()),
            None => Ok(Credentials::openai_key()?),
        }
    }
}

#[async_trait]
impl Inference for OpenAiClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ClientError> {
        let api_key = self.api_key()?;

        let body = ChatRequest {
            model: &request.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user_prompt,
                },
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        debug!(model = %request.model, prompt_chars = request.user_prompt.len(), "Requesting completion");
        let start = std::time::Instant::now();

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<serde_json::Value>(&text)
                .ok()
                .and_then(|v| {
                    v.pointer("/error/message")
                        .and_then(|m| m.as_str())
                        .map(String::from)
                })
                .unwrap_or(text);
            return Err(ClientError::HttpError {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ChatResponse = serde_json::from_str(&text)?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| ClientError::EmptyResponse("completion had no content".to_string()))?;

        info!(
            model = %request.model,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Completion received"
        );
        Ok(content)
    }
}
