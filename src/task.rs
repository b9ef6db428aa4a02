//! Benchmark task records.
//!
//! A task is identified by its position in the domain's task list. The
//! pipeline fills in `question` and `action_results`; every other field,
//! including ones this crate does not model (annotator, expected outputs,
//! ...), is carried through unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One ground-truth tool invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionCall {
    /// Tool identifier; must exist in the domain's tool catalog.
    pub name: String,
    /// Keyword arguments, passed to the tool exactly as given.
    #[serde(default, alias = "kwargs")]
    pub arguments: Map<String, Value>,
}

impl ActionCall {
    pub fn new(name: impl Into<String>, arguments: Map<String, Value>) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }
}

/// One benchmark scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub user_id: String,
    pub instruction: String,
    /// Ordered: later calls may observe state mutated by earlier ones.
    pub actions: Vec<ActionCall>,
    /// First-person rewrite of `instruction`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
    /// Outputs aligned 1:1 with `actions`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_results: Option<Vec<Value>>,
    /// Fields not modelled here, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Task {
    pub fn new(
        user_id: impl Into<String>,
        instruction: impl Into<String>,
        actions: Vec<ActionCall>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            instruction: instruction.into(),
            actions,
            question: None,
            action_results: None,
            extra: Map::new(),
        }
    }

    /// Whether the pipeline has populated both derived fields.
    pub fn is_augmented(&self) -> bool {
        self.question.is_some() && self.action_results.is_some()
    }
}
