//! Task augmentation pipeline.
//!
//! # Pipeline Flow
//!
//! 1. **Selection**: explicit indices, or everything but the domain denylist
//! 2. **Refresh**: a fresh data snapshot and tool map for the task
//! 3. **Rewrite**: the instruction becomes a first-person question
//! 4. **Replay**: ground-truth actions run in order against the snapshot
//! 5. **Merge**: `question` and decoded `action_results` land on the task
//! 6. **Pause**: the configured delay before the next selected task
//!
//! # Example
//!
//! ```rust,ignore
//! use gt_forge::domain::DomainRegistry;
//! use gt_forge::pipeline::{AugmentConfig, AugmentPipeline, TaskSelection};
//! use gt_forge::rewriter::InstructionRewriter;
//!
//! let config = AugmentConfig::from_env()?;
//! let module = DomainRegistry::new(&config.data_root).resolve("retail")?;
//! let rewriter = InstructionRewriter::with_config(llm, config.rewriter.clone());
//! let pipeline = AugmentPipeline::new(rewriter, config.task_delay);
//!
//! let mut tasks = module.tasks().to_vec();
//! let selection = TaskSelection::for_domain(module.domain(), Some(&[0, 3]));
//! let stats = pipeline.process_tasks(&module, &mut tasks, &selection).await?;
//! ```

pub mod config;
pub mod orchestrator;
pub mod results;
pub mod selection;

pub use config::{AugmentConfig, ConfigError};
pub use orchestrator::{AugmentPipeline, Augmentation, RunStats};
pub use results::decode_results;
pub use selection::TaskSelection;
