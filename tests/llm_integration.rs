//! Integration tests against a live LLM.
//!
//! These tests make real API calls to OpenRouter.
//! Run with: OPENROUTER_API_KEY=your_key cargo test --test llm_integration -- --ignored

use std::sync::Arc;

use gt_forge::llm::{GenerationRequest, LlmProvider, Message, OpenRouterProvider};
use gt_forge::rewriter::{InstructionRewriter, BOILERPLATE};

fn create_test_client() -> OpenRouterProvider {
    let key = std::env::var("OPENROUTER_API_KEY")
        .expect("OPENROUTER_API_KEY environment variable must be set for integration tests");
    OpenRouterProvider::new(key)
}

#[tokio::test]
#[ignore] // Run with: cargo test --test llm_integration -- --ignored
async fn test_simple_generation() {
    let client = create_test_client();

    let request = GenerationRequest::new(
        "",
        vec![
            Message::system("You are a helpful assistant. Reply concisely."),
            Message::user("What is 2 + 2? Reply with just the number."),
        ],
    )
    .with_max_tokens(10)
    .with_temperature(0.0);

    let response = client.generate(request).await;
    assert!(response.is_ok(), "Generation failed: {:?}", response.err());

    let response = response.expect("Should have response");
    let content = response.first_content().expect("Should have content");
    assert!(
        content.contains('4'),
        "Response should contain '4', got: {}",
        content
    );
}

#[tokio::test]
#[ignore]
async fn test_rewrite_keeps_user_id() {
    let rewriter = InstructionRewriter::new(Arc::new(create_test_client()));

    let instruction = format!(
        "Your user id is jane_doe_123. You want to cancel order 5591 because you no longer need it. {}You are polite but impatient.",
        BOILERPLATE
    );
    let question = rewriter
        .rewrite(&instruction)
        .await
        .expect("Rewrite should succeed");

    assert!(
        question.contains("jane_doe_123"),
        "Question should keep the user id, got: {}",
        question
    );
    assert!(question.contains("5591"), "got: {}", question);
}
