//! Configuration for the augmentation run.
//!
//! Covers where the domain artifacts live, how long to pause between tasks,
//! and the generation parameters used for instruction rewriting.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::rewriter::RewriterConfig;

/// Default pause between two processed tasks.
pub const DEFAULT_TASK_DELAY: Duration = Duration::from_secs(15);

/// Default directory holding one sub-directory per domain.
pub const DEFAULT_DATA_ROOT: &str = "./data";

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable has an invalid value.
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    /// Configuration validation failed.
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Configuration for one augmentation run.
#[derive(Debug, Clone, PartialEq)]
pub struct AugmentConfig {
    /// Root directory containing `<domain>/tasks.json`, `wiki.md` and `data/`.
    pub data_root: PathBuf,
    /// Pause after every processed task, for the LLM service's rate limit.
    pub task_delay: Duration,
    /// Generation parameters for the rewrite call.
    pub rewriter: RewriterConfig,
}

impl Default for AugmentConfig {
    fn default() -> Self {
        Self {
            data_root: PathBuf::from(DEFAULT_DATA_ROOT),
            task_delay: DEFAULT_TASK_DELAY,
            rewriter: RewriterConfig::default(),
        }
    }
}

impl AugmentConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `GT_FORGE_DATA_ROOT`: Domain data root (default: ./data)
    /// - `GT_FORGE_MODEL`: Rewrite model (default: provider default)
    /// - `GT_FORGE_DELAY_SECS`: Delay between tasks in seconds (default: 15)
    /// - `GT_FORGE_MAX_TOKENS`: Rewrite output bound (default: 1024)
    /// - `GT_FORGE_TEMPERATURE`: Rewrite temperature (default: 0.0)
    /// - `GT_FORGE_TOP_K`: Rewrite top-k (default: 250)
    /// - `GT_FORGE_TOP_P`: Rewrite top-p (default: 1.0)
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable cannot be parsed or the result
    /// fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(val) = lookup("GT_FORGE_DATA_ROOT") {
            config.data_root = PathBuf::from(val);
        }

        if let Some(val) = lookup("GT_FORGE_DELAY_SECS") {
            let secs: f64 = parse_env_value(&val, "GT_FORGE_DELAY_SECS")?;
            config.task_delay = Duration::try_from_secs_f64(secs).map_err(|_| {
                ConfigError::InvalidValue {
                    key: "GT_FORGE_DELAY_SECS".to_string(),
                    message: format!("'{}' is not a valid duration", val),
                }
            })?;
        }

        // Rewrite settings
        if let Some(val) = lookup("GT_FORGE_MODEL") {
            config.rewriter.model = val;
        }

        if let Some(val) = lookup("GT_FORGE_MAX_TOKENS") {
            config.rewriter.max_tokens = parse_env_value(&val, "GT_FORGE_MAX_TOKENS")?;
        }

        if let Some(val) = lookup("GT_FORGE_TEMPERATURE") {
            config.rewriter.temperature = parse_env_value(&val, "GT_FORGE_TEMPERATURE")?;
        }

        if let Some(val) = lookup("GT_FORGE_TOP_K") {
            config.rewriter.top_k = parse_env_value(&val, "GT_FORGE_TOP_K")?;
        }

        if let Some(val) = lookup("GT_FORGE_TOP_P") {
            config.rewriter.top_p = parse_env_value(&val, "GT_FORGE_TOP_P")?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationFailed` if any values are invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.data_root.as_os_str().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "data_root cannot be empty".to_string(),
            ));
        }

        if self.rewriter.max_tokens == 0 {
            return Err(ConfigError::ValidationFailed(
                "max_tokens must be greater than 0".to_string(),
            ));
        }

        if !(0.0..=2.0).contains(&self.rewriter.temperature) {
            return Err(ConfigError::ValidationFailed(
                "temperature must be between 0.0 and 2.0".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.rewriter.top_p) || self.rewriter.top_p == 0.0 {
            return Err(ConfigError::ValidationFailed(
                "top_p must be in (0.0, 1.0]".to_string(),
            ));
        }

        if self.rewriter.top_k == 0 {
            return Err(ConfigError::ValidationFailed(
                "top_k must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Builder method to set the data root.
    pub fn with_data_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_root = path.into();
        self
    }

    /// Builder method to set the inter-task delay.
    pub fn with_task_delay(mut self, delay: Duration) -> Self {
        self.task_delay = delay;
        self
    }

    /// Builder method to set the rewrite model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.rewriter.model = model.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.rewriter.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.rewriter.temperature = temperature;
        self
    }
}

/// Parse an environment variable value into a type.
fn parse_env_value<T: std::str::FromStr>(value: &str, key: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("could not parse '{}'", value),
    })
}
