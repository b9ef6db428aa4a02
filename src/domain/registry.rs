//! Resolution of a domain name to its four artifacts.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use super::data::{table_path, DataLoader, DomainData};
use super::tool::ToolCatalog;
use super::Domain;
use crate::error::DomainError;
use crate::task::Task;

const TASKS_FILE: &str = "tasks.json";
const POLICY_FILE: &str = "wiki.md";
const DATA_DIR: &str = "data";

/// Everything the pipeline needs from one domain.
pub struct DomainModule {
    domain: Domain,
    tools: ToolCatalog,
    loader: DataLoader,
    tasks: Vec<Task>,
    policy: String,
}

impl DomainModule {
    /// Assemble a module from already-loaded parts.
    pub fn new(
        domain: Domain,
        tools: ToolCatalog,
        loader: DataLoader,
        tasks: Vec<Task>,
        policy: impl Into<String>,
    ) -> Self {
        Self {
            domain,
            tools,
            loader,
            tasks,
            policy: policy.into(),
        }
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    pub fn tools(&self) -> &ToolCatalog {
        &self.tools
    }

    /// Produce a fresh, independent data snapshot.
    pub fn load_data(&self) -> Result<DomainData, DomainError> {
        (self.loader)()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Opaque policy text; carried for downstream consumers.
    pub fn policy(&self) -> &str {
        &self.policy
    }
}

impl std::fmt::Debug for DomainModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DomainModule")
            .field("domain", &self.domain)
            .field("tools", &self.tools.iter().map(|t| t.name()).collect::<Vec<_>>())
            .field("tasks", &self.tasks.len())
            .field("policy_len", &self.policy.len())
            .finish()
    }
}

/// Resolves domains against a data root directory.
#[derive(Debug, Clone)]
pub struct DomainRegistry {
    data_root: PathBuf,
}

impl DomainRegistry {
    pub fn new(data_root: impl Into<PathBuf>) -> Self {
        Self {
            data_root: data_root.into(),
        }
    }

    pub fn data_root(&self) -> &Path {
        &self.data_root
    }

    /// Directory holding a domain's artifacts.
    pub fn domain_dir(&self, domain: Domain) -> PathBuf {
        self.data_root.join(domain.as_str())
    }

    /// Resolve a domain by name.
    pub fn resolve(&self, name: &str) -> Result<DomainModule, DomainError> {
        let domain: Domain = name.parse()?;
        self.resolve_domain(domain)
    }

    /// Resolve all four artifacts of `domain`; any missing piece is an error.
    pub fn resolve_domain(&self, domain: Domain) -> Result<DomainModule, DomainError> {
        let dir = self.domain_dir(domain);
        let tasks_path = dir.join(TASKS_FILE);
        let policy_path = dir.join(POLICY_FILE);
        let data_dir = dir.join(DATA_DIR);

        require(domain, "task list", &tasks_path)?;
        require(domain, "policy", &policy_path)?;
        require(domain, "data directory", &data_dir)?;
        for table in domain.tables() {
            require(domain, "data table", &table_path(&data_dir, table))?;
        }

        let raw = fs::read_to_string(&tasks_path)?;
        let tasks: Vec<Task> =
            serde_json::from_str(&raw).map_err(|source| DomainError::InvalidArtifact {
                domain: domain.to_string(),
                artifact: "task list".to_string(),
                source,
            })?;
        let policy = fs::read_to_string(&policy_path)?;

        let tables = domain.tables();
        let loader: DataLoader = Arc::new(move || {
            debug!(domain = %domain, dir = %data_dir.display(), "Loading data snapshot");
            DomainData::load_dir(domain.as_str(), &data_dir, tables)
        });

        let tools = domain.tool_catalog();
        for tool in &tools {
            debug!(tool = tool.name(), description = tool.description(), "Tool available");
        }
        info!(
            domain = %domain,
            tasks = tasks.len(),
            tools = tools.len(),
            "Resolved domain"
        );

        Ok(DomainModule::new(
            domain,
            tools,
            loader,
            tasks,
            policy,
        ))
    }
}

fn require(domain: Domain, artifact: &'static str, path: &Path) -> Result<(), DomainError> {
    if path.exists() {
        Ok(())
    } else {
        Err(DomainError::MissingArtifact {
            domain: domain.to_string(),
            artifact,
            path: path.to_path_buf(),
        })
    }
}
