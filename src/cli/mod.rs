//! Command-line interface for gt-forge.
//!
//! Parses the domain and task selection, runs the augmentation pipeline and
//! reports where the augmented task list was written.

mod commands;

pub use commands::{parse_cli, run, run_augment, run_with_cli, Cli};
