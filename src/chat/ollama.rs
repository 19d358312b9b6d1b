//! Client for an Ollama-compatible `/api/chat` endpoint

use std::time::Duration;

use serde::Serialize;

use super::accumulate_stream;
use crate::config::LlmConfig;
use crate::history::Turn;
use crate::{Error, Result};

/// Sampling options forwarded to the model
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChatOptions {
    /// Maximum number of tokens to generate
    pub num_predict: u32,
    pub temperature: f32,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Turn],
    stream: bool,
    options: ChatOptions,
}

/// Streams chat completions from a locally hosted model
pub struct OllamaClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    options: ChatOptions,
}

impl OllamaClient {
    /// Create a client from LLM configuration
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            options: ChatOptions {
                num_predict: config.num_predict,
                temperature: config.temperature,
            },
        })
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send the conversation and return the completed reply
    ///
    /// Single attempt, no retries. The reply is returned as streamed; it may be
    /// empty, which callers handle separately from transport failure.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails, the endpoint answers with a
    /// non-success status, or the stream breaks before the reply completes
    pub async fn chat(&self, messages: &[Turn]) -> Result<String> {
        let url = format!("{}/api/chat", self.base_url);
        let request = ChatRequest {
            model: &self.model,
            messages,
            stream: true,
            options: self.options,
        };

        tracing::debug!(
            url = %url,
            model = %self.model,
            messages = messages.len(),
            "sending chat request"
        );

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "chat request failed");
                e
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "chat endpoint error");
            return Err(Error::Chat(format!("chat endpoint error {status}: {body}")));
        }

        let reply = accumulate_stream(response.bytes_stream()).await?;
        tracing::info!(bytes = reply.len(), "chat reply complete");
        Ok(reply)
    }
}
