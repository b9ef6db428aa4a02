//! Sequential task augmentation.
//!
//! For every selected task, in ascending index order:
//!
//! ```text
//! Selected -> EnvironmentReady -> QuestionGenerated -> ActionsExecuted -> Merged
//! ```
//!
//! Any error aborts the run. The failing task is left untouched and later
//! tasks are not attempted.

use std::time::{Duration, Instant};

use serde_json::Value;
use tracing::info;

use crate::domain::DomainModule;
use crate::environment::refresh;
use crate::error::AugmentError;
use crate::executor::execute_actions;
use crate::rewriter::InstructionRewriter;
use crate::task::Task;

use super::results::decode_results;
use super::selection::TaskSelection;

/// Counters for a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Tasks that reached `Merged`.
    pub processed: usize,
    /// Tasks not selected.
    pub skipped: usize,
    /// Length of the task list.
    pub total: usize,
}

/// Derived fields for one task, produced before anything is merged.
#[derive(Debug, Clone, PartialEq)]
pub struct Augmentation {
    pub question: String,
    pub action_results: Vec<Value>,
}

pub struct AugmentPipeline {
    rewriter: InstructionRewriter,
    task_delay: Duration,
}

impl AugmentPipeline {
    pub fn new(rewriter: InstructionRewriter, task_delay: Duration) -> Self {
        Self {
            rewriter,
            task_delay,
        }
    }

    /// Augment the selected tasks of `tasks` in place.
    ///
    /// `tasks` is normally a copy of `module.tasks()`; unselected entries are
    /// not touched. The configured delay is awaited between two processed
    /// tasks.
    pub async fn process_tasks(
        &self,
        module: &DomainModule,
        tasks: &mut [Task],
        selection: &TaskSelection,
    ) -> Result<RunStats, AugmentError> {
        let started = Instant::now();
        let selected = selection.resolve(tasks.len());
        let mut stats = RunStats {
            processed: 0,
            skipped: tasks.len() - selected.len(),
            total: tasks.len(),
        };

        info!(
            domain = %module.domain(),
            selected = selected.len(),
            total = stats.total,
            "Starting augmentation run"
        );

        for (position, &index) in selected.iter().enumerate() {
            if position > 0 && !self.task_delay.is_zero() {
                tokio::time::sleep(self.task_delay).await;
            }

            info!(task_index = index, "Processing task");
            let augmentation = self.augment_task(module, index, &tasks[index]).await?;

            let task = &mut tasks[index];
            info!(
                task_index = index,
                actions = task.actions.len(),
                "Task augmented"
            );
            task.question = Some(augmentation.question);
            task.action_results = Some(augmentation.action_results);
            stats.processed += 1;
        }

        info!(
            processed = stats.processed,
            skipped = stats.skipped,
            total = stats.total,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Augmentation run finished"
        );
        Ok(stats)
    }

    /// Run one task through refresh, rewrite, and replay without merging.
    pub async fn augment_task(
        &self,
        module: &DomainModule,
        index: usize,
        task: &Task,
    ) -> Result<Augmentation, AugmentError> {
        let mut env = refresh(module).map_err(|source| AugmentError::Execution { index, source })?;

        let question = self
            .rewriter
            .rewrite(&task.instruction)
            .await
            .map_err(|source| AugmentError::Rewrite { index, source })?;

        let raw = execute_actions(&task.actions, &env.tools, &mut env.data)
            .map_err(|source| AugmentError::Execution { index, source })?;

        Ok(Augmentation {
            question,
            action_results: decode_results(raw),
        })
    }
}
