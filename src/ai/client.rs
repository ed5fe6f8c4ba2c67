use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::{json, Value};
use std::time::Duration;

use crate::config::OpenRouterConfig;
use crate::error::{AppError, Result};

/// One chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Sampling parameters for one completion
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionParams {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl From<&OpenRouterConfig> for CompletionParams {
    fn from(config: &OpenRouterConfig) -> Self {
        Self {
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }
}

/// Text-completion capability
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Submit the messages and return the first choice's text.
    /// Every failure is a `SuggestionRequestFailed`.
    async fn chat(&self, messages: &[ChatMessage], params: &CompletionParams) -> Result<String>;
}

/// OpenAI-compatible chat completions over OpenRouter
pub struct OpenRouterClient {
    api_key: String,
    base_url: String,
    referer: String,
    title: String,
    client: Client,
}

fn request_failed(e: impl std::fmt::Display) -> AppError {
    AppError::SuggestionRequestFailed(e.to_string())
}

impl OpenRouterClient {
    pub fn new(config: &OpenRouterConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            referer: config.referer.clone(),
            title: config.title.clone(),
            client,
        })
    }

    fn build_payload(messages: &[ChatMessage], params: &CompletionParams) -> Value {
        json!({
            "model": params.model,
            "messages": messages,
            "temperature": params.temperature,
            "max_tokens": params.max_tokens,
        })
    }

    /// Pull `choices[0].message.content` out of a response body
    fn extract_content(data: &Value) -> Result<String> {
        if let Some(error) = data.get("error") {
            let message = error
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("Unknown error");
            return Err(request_failed(format!("API error: {}", message)));
        }

        let choice = data
            .get("choices")
            .and_then(|c| c.as_array())
            .and_then(|c| c.first())
            .ok_or_else(|| request_failed("Response contained no choices"))?;

        choice
            .get("message")
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .map(|c| c.trim().to_string())
            .ok_or_else(|| request_failed("Response choice has no message content"))
    }
}

#[async_trait]
impl CompletionClient for OpenRouterClient {
    async fn chat(&self, messages: &[ChatMessage], params: &CompletionParams) -> Result<String> {
        if self.api_key.is_empty() {
            return Err(request_failed("OpenRouter API key is not configured"));
        }

        let url = format!("{}/chat/completions", self.base_url);
        tracing::info!("Requesting completion from {} (model {})", url, params.model);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .header("HTTP-Referer", &self.referer)
            .header("X-Title", &self.title)
            .json(&Self::build_payload(messages, params))
            .send()
            .await
            .map_err(request_failed)?;

        let status = response.status();
        let response_text = response.text().await.map_err(request_failed)?;
        tracing::debug!("Raw API response: {}", response_text);

        let data: Value = match serde_json::from_str(&response_text) {
            Ok(json) => json,
            Err(e) if status.is_success() => {
                return Err(request_failed(format!("API returned non-JSON response: {}", e)));
            }
            Err(_) => {
                return Err(request_failed(format!("HTTP {}: {}", status, response_text)));
            }
        };

        match Self::extract_content(&data) {
            Ok(content) => Ok(content),
            Err(e) if status.is_success() => Err(e),
            Err(AppError::SuggestionRequestFailed(msg)) => {
                Err(request_failed(format!("HTTP {}: {}", status, msg)))
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_shape() {
        let params = CompletionParams::from(&OpenRouterConfig::default());
        let payload = OpenRouterClient::build_payload(
            &[ChatMessage::system("sys"), ChatMessage::user("hi")],
            &params,
        );
        assert_eq!(payload["model"], "meta-llama/llama-3.1-8b-instruct:free");
        assert_eq!(payload["max_tokens"], 4096);
        assert_eq!(payload["messages"][0]["role"], "system");
        assert_eq!(payload["messages"][1]["content"], "hi");
        assert!(payload["temperature"].as_f64().unwrap() > 0.0);
    }

    #[test]
    fn test_extract_content() {
        let data = json!({"choices": [{"message": {"role": "assistant", "content": "  [[\"a\"]]\n"}}]});
        assert_eq!(OpenRouterClient::extract_content(&data).unwrap(), "[[\"a\"]]");
    }

    #[test]
    fn test_extract_content_errors() {
        let data = json!({"error": {"message": "Rate limit exceeded", "code": 429}});
        let err = OpenRouterClient::extract_content(&data).unwrap_err();
        assert!(matches!(err, AppError::SuggestionRequestFailed(ref m) if m.contains("Rate limit")));

        let data = json!({"choices": []});
        assert!(matches!(
            OpenRouterClient::extract_content(&data),
            Err(AppError::SuggestionRequestFailed(_))
        ));

        let data = json!({"choices": [{"message": {"content": null}}]});
        assert!(matches!(
            OpenRouterClient::extract_content(&data),
            Err(AppError::SuggestionRequestFailed(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_before_request() {
        let client = OpenRouterClient::new(&OpenRouterConfig::default()).unwrap();
        let params = CompletionParams::from(&OpenRouterConfig::default());
        let err = client.chat(&[ChatMessage::user("hi")], &params).await.unwrap_err();
        assert!(matches!(err, AppError::SuggestionRequestFailed(_)));
    }
}
