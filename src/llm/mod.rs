//! LLM integration for gt-forge.
//!
//! The pipeline only ever talks to an [`LlmProvider`]. Two HTTP
//! implementations ship with the crate:
//!
//! - [`LiteLlmClient`]: any OpenAI-compatible endpoint configured through
//!   `LITELLM_API_BASE` / `LITELLM_API_KEY`, single attempt per request.
//! - [`OpenRouterProvider`]: OpenRouter with bounded exponential-backoff
//!   retries for transient failures.
//!
//! ```ignore
//! use gt_forge::llm::{GenerationRequest, LlmProvider, Message, OpenRouterProvider};
//!
//! let provider = OpenRouterProvider::new(api_key);
//! let request = GenerationRequest::new("", vec![Message::user("Hello")])
//!     .with_temperature(0.0)
//!     .with_max_tokens(1024);
//! let response = provider.generate(request).await?;
//! ```

pub mod litellm;
pub mod providers;
pub(crate) mod wire;

pub use litellm::{
    Choice, GenerationRequest, GenerationResponse, LiteLlmClient, LlmProvider, Message, Usage,
};
pub use providers::OpenRouterProvider;
