//! gt-forge: ground-truth augmentation for tool-use benchmark tasks.
//!
//! Each task of a benchmark domain (a user, an instruction and a sequence of
//! ground-truth tool calls) gains two derived fields: a first-person
//! `question` produced by an LLM rewrite, and the `action_results` obtained
//! by replaying the tool calls against a fresh copy of the domain data.

pub mod cli;
pub mod domain;
pub mod environment;
pub mod error;
pub mod executor;
pub mod llm;
pub mod persist;
pub mod pipeline;
pub mod rewriter;
pub mod task;

pub use domain::{Domain, DomainModule, DomainRegistry, Tool};
pub use error::{
    AugmentError, DomainError, ExecutionError, LlmError, PersistError, RewriteError, ToolError,
};
pub use pipeline::{AugmentConfig, AugmentPipeline, RunStats, TaskSelection};
pub use rewriter::InstructionRewriter;
pub use task::{ActionCall, Task};
