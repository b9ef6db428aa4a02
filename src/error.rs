//! Error types for gt-forge operations.
//!
//! Defines error types for each stage of the augmentation pipeline:
//! - Domain resolution (tool catalog, data, tasks, policy)
//! - Instruction rewriting and answer extraction
//! - Tool-call execution
//! - Persistence of the augmented task list
//! - LLM API interactions

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while resolving a domain to its artifacts.
///
/// Any of these is fatal: there is no partially resolved domain.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Unknown domain '{0}' (expected one of: airline, retail)")]
    UnknownDomain(String),

    #[error("Domain '{domain}' is missing its {artifact} at '{}'", .path.display())]
    MissingArtifact {
        domain: String,
        artifact: &'static str,
        path: PathBuf,
    },

    #[error("Failed to parse {artifact} for domain '{domain}': {source}")]
    InvalidArtifact {
        domain: String,
        artifact: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Data table '{table}' must be a JSON object")]
    InvalidTable { table: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur while rewriting an instruction into a question.
#[derive(Debug, Error)]
pub enum RewriteError {
    #[error("LLM request failed: {0}")]
    Llm(#[from] LlmError),

    #[error("LLM response contained no content")]
    EmptyResponse,

    #[error("LLM response is missing a <{tag}> field. Content starts with: '{preview}'")]
    MissingTag { tag: &'static str, preview: String },

    #[error("LLM response has an empty <{tag}> field")]
    EmptyTag { tag: &'static str },
}

/// Errors raised by an individual tool invocation.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Invalid arguments for '{tool}': {message}")]
    InvalidArguments { tool: String, message: String },

    #[error("Data table '{0}' is not present in the snapshot")]
    MissingTable(String),
}

/// Errors that can occur while building an environment or replaying actions.
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("Unknown tool '{name}' at action {index}")]
    UnknownTool { index: usize, name: String },

    #[error("Tool '{0}' is declared more than once in the catalog")]
    DuplicateTool(String),

    #[error("Action {index} ('{name}') failed: {source}")]
    ToolFailed {
        index: usize,
        name: String,
        #[source]
        source: ToolError,
    },

    #[error("Failed to load data snapshot: {0}")]
    DataLoad(#[from] DomainError),
}

/// Errors that can occur while persisting the augmented task list.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("Output directory does not exist: {}", .0.display())]
    MissingDirectory(PathBuf),

    #[error("Failed to write '{}': {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors that can occur during LLM operations.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Missing API base URL: LITELLM_API_BASE environment variable not set")]
    MissingApiBase,

    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    #[error("Failed to parse LLM response: {0}")]
    ParseError(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("API error ({code}): {message}")]
    ApiError { code: u16, message: String },
}

/// Fatal errors that abort an augmentation run.
#[derive(Debug, Error)]
pub enum AugmentError {
    #[error("Task {index}: {source}")]
    Rewrite {
        index: usize,
        #[source]
        source: RewriteError,
    },

    #[error("Task {index}: {source}")]
    Execution {
        index: usize,
        #[source]
        source: ExecutionError,
    },
}
