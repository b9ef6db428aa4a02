//! LLM-based instruction rewriter.
//!
//! Turns a benchmark instruction (second-person scenario description) into
//! the first-person question a simulated customer would ask:
//! - first-person voice
//! - user ids kept verbatim
//! - name and zip code only when the instruction provides them
//! - no descriptions of the person's character
//! - answerable without follow-up questions

use std::sync::{Arc, OnceLock};

use regex::Regex;
use tracing::debug;

use crate::error::RewriteError;
use crate::llm::{GenerationRequest, LlmProvider, Message};

/// Sentence removed from instructions before they reach the model.
pub const BOILERPLATE: &str =
    "You are reactive to the agent and will not say anything that is not asked. ";

/// Tag the model is asked to wrap its answer in.
pub const ANSWER_TAG: &str = "question";

const REWRITE_PROMPT_TEMPLATE: &str = r#"You are an instruction rewriter.
Your task is to rewrite the instruction by following a set of rules.
Below is the instruction for you in <instruction></instruction> XML tags.
Below is the set of rules for you in <rules></rules> XML tags.
Output the newly generated instruction in the <question></question> XML tags.

<instruction>
{instruction}
</instruction>

<rules>
1. Change the instruction to the first-person voice.
2. Keep the used id (for example sofia_kim_7287) exactly as it is in the generated question.
3. Include your name and zip code if provided.
4. Remove the description of the person's characteristics.
5. The new instruction should be easy to understand and the customer representative should be able to help without asking follow up questions.
6. Do not hallucinate information about zip code that is not provided in the instruction.
7. If an identifier such as an order id is not mentioned in the instruction, do not make one up; say you do not remember or have it.
</rules>
"#;

/// Generation parameters for the rewrite call.
#[derive(Debug, Clone, PartialEq)]
pub struct RewriterConfig {
    /// Model identifier; empty selects the provider default.
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f64,
    pub top_k: u32,
    pub top_p: f64,
    pub stop_sequences: Vec<String>,
}

impl Default for RewriterConfig {
    fn default() -> Self {
        Self {
            model: String::new(),
            max_tokens: 1024,
            temperature: 0.0,
            top_k: 250,
            top_p: 1.0,
            stop_sequences: vec!["Human".to_string()],
        }
    }
}

pub struct InstructionRewriter {
    llm: Arc<dyn LlmProvider>,
    config: RewriterConfig,
}

impl InstructionRewriter {
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self::with_config(llm, RewriterConfig::default())
    }

    pub fn with_config(llm: Arc<dyn LlmProvider>, config: RewriterConfig) -> Self {
        Self { llm, config }
    }

    pub fn config(&self) -> &RewriterConfig {
        &self.config
    }

    /// Rewrite an instruction into a first-person question.
    ///
    /// One request, no retries here: transport retries belong to the
    /// provider, and a response without a `<question>` field is an error.
    pub async fn rewrite(&self, instruction: &str) -> Result<String, RewriteError> {
        let request = self.build_request(instruction);
        let response = self.llm.generate(request).await?;
        let content = response
            .first_content()
            .filter(|c| !c.trim().is_empty())
            .ok_or(RewriteError::EmptyResponse)?;

        let question = extract_question(content)?;
        debug!(
            question_len = question.len(),
            completion_tokens = response.usage.completion_tokens,
            "Instruction rewritten"
        );
        Ok(question)
    }

    fn build_request(&self, instruction: &str) -> GenerationRequest {
        let mut request = GenerationRequest::new(
            self.config.model.clone(),
            vec![Message::user(build_prompt(instruction))],
        )
        .with_max_tokens(self.config.max_tokens)
        .with_temperature(self.config.temperature)
        .with_top_k(self.config.top_k)
        .with_top_p(self.config.top_p);
        for stop in &self.config.stop_sequences {
            request = request.with_stop(stop.clone());
        }
        request
    }
}

/// Remove the fixed boilerplate sentence (exact, case-sensitive match).
pub fn strip_boilerplate(instruction: &str) -> String {
    if instruction.contains(BOILERPLATE) {
        instruction.replace(BOILERPLATE, "")
    } else {
        instruction.to_string()
    }
}

/// Full rewrite prompt for an instruction, boilerplate already stripped.
pub fn build_prompt(instruction: &str) -> String {
    REWRITE_PROMPT_TEMPLATE.replace("{instruction}", &strip_boilerplate(instruction))
}

fn answer_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?is)<question(?:\s[^>]*)?>(.*?)</question\s*>").expect("valid regex")
    })
}

/// Extract the text of the first `<question>` element in a model response.
pub fn extract_question(content: &str) -> Result<String, RewriteError> {
    let captures = answer_regex()
        .captures(content)
        .ok_or_else(|| RewriteError::MissingTag {
            tag: ANSWER_TAG,
            preview: preview(content),
        })?;

    let question = decode_entities(captures[1].trim());
    if question.is_empty() {
        return Err(RewriteError::EmptyTag { tag: ANSWER_TAG });
    }
    Ok(question)
}

fn preview(content: &str) -> String {
    content.trim().chars().take(50).collect()
}

fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
