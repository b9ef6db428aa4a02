//! OpenRouter provider with bounded retry.
//!
//! Transient failures (timeouts, connection resets, 429, 5xx) are retried
//! with exponential backoff up to [`MAX_ATTEMPTS`] total attempts. Anything
//! left after that surfaces to the caller unchanged.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::error::LlmError;
use crate::llm::wire::{self, ApiRequest};
use crate::llm::{GenerationRequest, GenerationResponse, LlmProvider};

/// Default OpenRouter API endpoint.
const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Default model to use if none specified.
pub const DEFAULT_MODEL: &str = "anthropic/claude-3-sonnet";

/// Total attempts per request, including the first.
pub const MAX_ATTEMPTS: u32 = 3;

/// Base delay for exponential backoff in milliseconds.
const BASE_RETRY_DELAY_MS: u64 = 1000;

/// OpenRouter provider for LLM requests.
pub struct OpenRouterProvider {
    client: Client,
    api_key: String,
    base_url: String,
    default_model: String,
}

impl OpenRouterProvider {
    /// Create a new OpenRouter provider with the given API key and the
    /// default model.
    pub fn new(api_key: String) -> Self {
        Self::with_model(api_key, DEFAULT_MODEL.to_string())
    }

    /// Create a new OpenRouter provider with a specific default model.
    pub fn with_model(api_key: String, model: String) -> Self {
        Self::with_custom_url(api_key, OPENROUTER_BASE_URL.to_string(), model)
    }

    /// Create a new OpenRouter provider with custom base URL.
    ///
    /// Useful for testing or using OpenRouter-compatible proxies.
    pub fn with_custom_url(api_key: String, base_url: String, model: String) -> Self {
        Self {
            client: wire::build_http_client(),
            api_key,
            base_url,
            default_model: model,
        }
    }

    /// Get the API key (for debugging, returns masked value).
    pub fn api_key_masked(&self) -> String {
        let chars: Vec<char> = self.api_key.chars().collect();
        if chars.len() <= 8 {
            "*".repeat(chars.len())
        } else {
            let head: String = chars[..4].iter().collect();
            let tail: String = chars[chars.len() - 4..].iter().collect();
            format!("{}...{}", head, tail)
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    async fn execute_with_retry(
        &self,
        request: &ApiRequest,
    ) -> Result<GenerationResponse, LlmError> {
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        let mut attempt = 0;

        loop {
            attempt += 1;
            let err = match wire::send_chat_completion(
                &self.client,
                &url,
                Some(&self.api_key),
                request,
            )
            .await
            {
                Ok(response) => return Ok(response),
                Err(err) => err,
            };

            if attempt >= MAX_ATTEMPTS || !is_transient_error(&err) {
                return Err(err);
            }

            let delay_ms = backoff_delay_ms(attempt);
            tracing::warn!(
                attempt,
                max_attempts = MAX_ATTEMPTS,
                delay_ms,
                error = %err,
                "Transient LLM error, retrying"
            );
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        }
    }
}

/// Delay before the attempt following `attempt` (1-based): 1s, 2s, 4s, ...
fn backoff_delay_ms(attempt: u32) -> u64 {
    BASE_RETRY_DELAY_MS * (1 << (attempt.saturating_sub(1)))
}

/// Check if an error is transient and should be retried.
fn is_transient_error(error: &LlmError) -> bool {
    match error {
        LlmError::RequestFailed(msg) => {
            let msg = msg.to_lowercase();
            msg.contains("timeout")
                || msg.contains("timed out")
                || msg.contains("connection")
                || msg.contains("temporarily")
        }
        LlmError::RateLimited(_) => true,
        LlmError::ApiError { code, .. } => *code >= 500 || *code == 429,
        _ => false,
    }
}

#[async_trait]
impl LlmProvider for OpenRouterProvider {
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse, LlmError> {
        let api_request = ApiRequest::from_request(request, &self.default_model);
        self.execute_with_retry(&api_request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::Message;

    #[test]
    fn test_openrouter_provider_new() {
        let provider = OpenRouterProvider::new("test-api-key".to_string());

        assert_eq!(provider.base_url(), OPENROUTER_BASE_URL);
        assert_eq!(provider.default_model(), DEFAULT_MODEL);
        assert_eq!(provider.api_key_masked(), "test...-key");
    }

    #[test]
    fn test_openrouter_provider_with_custom_url() {
        let provider = OpenRouterProvider::with_custom_url(
            "test-key".to_string(),
            "https://custom.api.com/v1".to_string(),
            "custom-model".to_string(),
        );

        assert_eq!(provider.base_url(), "https://custom.api.com/v1");
        assert_eq!(provider.default_model(), "custom-model");
    }

    #[test]
    fn test_api_key_masked_short() {
        let provider = OpenRouterProvider::new("abc".to_string());
        assert_eq!(provider.api_key_masked(), "***");
    }

    #[test]
    fn test_api_key_masked_non_ascii() {
        let provider = OpenRouterProvider::new("ключ-секрет-1234".to_string());
        assert_eq!(provider.api_key_masked(), "ключ...1234");

        let provider = OpenRouterProvider::new("é".repeat(9));
        assert_eq!(provider.api_key_masked(), "éééé...éééé");

        let provider = OpenRouterProvider::new("ключик".to_string());
        assert_eq!(provider.api_key_masked(), "******");
    }

    #[test]
    fn test_backoff_doubles() {
        assert_eq!(backoff_delay_ms(1), 1000);
        assert_eq!(backoff_delay_ms(2), 2000);
        assert_eq!(backoff_delay_ms(3), 4000);
    }

    #[test]
    fn test_is_transient_error() {
        assert!(is_transient_error(&LlmError::RateLimited("slow".to_string())));
        assert!(is_transient_error(&LlmError::ApiError {
            code: 503,
            message: "unavailable".to_string(),
        }));
        assert!(is_transient_error(&LlmError::RequestFailed(
            "Connection refused".to_string()
        )));
        assert!(!is_transient_error(&LlmError::ApiError {
            code: 400,
            message: "Bad request".to_string(),
        }));
        assert!(!is_transient_error(&LlmError::ParseError(
            "Invalid JSON".to_string()
        )));
    }

    #[tokio::test]
    async fn test_generate_connection_error_surfaces_after_retries() {
        let provider = OpenRouterProvider::with_custom_url(
            "test-key".to_string(),
            "http://localhost:65535".to_string(),
            "test-model".to_string(),
        );

        let request = GenerationRequest::new("test-model", vec![Message::user("test")]);
        let err = provider.generate(request).await.unwrap_err();
        assert!(matches!(err, LlmError::RequestFailed(_)));
    }
}
