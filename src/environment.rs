//! Task-scoped environments.
//!
//! An [`Environment`] is built fresh for every task and dropped right after
//! the task's actions run, so tool side effects never cross task boundaries.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::domain::{DomainData, DomainModule, Tool};
use crate::error::ExecutionError;

/// Name-to-tool lookup built from a domain's catalog.
pub type ToolMap = HashMap<String, Arc<dyn Tool>>;

/// A fresh data snapshot plus the tools that operate on it.
pub struct Environment {
    pub data: DomainData,
    pub tools: ToolMap,
}

/// Build a fresh environment for one task.
///
/// Loads a brand-new snapshot from the domain's data factory and indexes
/// the tool catalog by name. A name declared twice is a configuration error.
pub fn refresh(module: &DomainModule) -> Result<Environment, ExecutionError> {
    let data = module.load_data()?;
    let tools = build_tool_map(module.tools())?;
    debug!(
        domain = %module.domain(),
        tools = tools.len(),
        "Environment refreshed"
    );
    Ok(Environment { data, tools })
}

pub fn build_tool_map(catalog: &[Arc<dyn Tool>]) -> Result<ToolMap, ExecutionError> {
    let mut tools = ToolMap::with_capacity(catalog.len());
    for tool in catalog {
        let name = tool.name().to_string();
        if tools.contains_key(&name) {
            return Err(ExecutionError::DuplicateTool(name));
        }
        tools.insert(name, Arc::clone(tool));
    }
    Ok(tools)
}
