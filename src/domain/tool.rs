//! The `Tool` trait and argument helpers shared by every domain.

use std::sync::Arc;

use serde_json::{Map, Value};

use super::data::DomainData;
use crate::error::ToolError;

/// Trait for tools that operate on a domain's data snapshot.
///
/// Tools return the benchmark's raw output string: JSON text on success, or
/// an `Error: ...` message for domain-level failures such as a missing
/// record. `Err` is reserved for calls the tool cannot interpret at all.
pub trait Tool: Send + Sync {
    /// Returns the unique name of the tool.
    fn name(&self) -> &str;

    /// Returns a description of what the tool does.
    fn description(&self) -> &str;

    /// Invoke the tool against `data` with keyword arguments.
    fn invoke(&self, data: &mut DomainData, args: &Map<String, Value>)
        -> Result<String, ToolError>;
}

/// Ordered tool catalog of one domain.
pub type ToolCatalog = Vec<Arc<dyn Tool>>;

fn invalid(tool: &str, message: impl Into<String>) -> ToolError {
    ToolError::InvalidArguments {
        tool: tool.to_string(),
        message: message.into(),
    }
}

/// Fetch a required string argument.
pub fn required_str<'a>(
    tool: &str,
    args: &'a Map<String, Value>,
    key: &str,
) -> Result<&'a str, ToolError> {
    match args.get(key) {
        Some(Value::String(s)) => Ok(s),
        Some(other) => Err(invalid(
            tool,
            format!("argument '{}' must be a string, got {}", key, other),
        )),
        None => Err(invalid(tool, format!("missing required argument '{}'", key))),
    }
}

/// Fetch an optional string argument.
pub fn optional_str<'a>(
    tool: &str,
    args: &'a Map<String, Value>,
    key: &str,
) -> Result<Option<&'a str>, ToolError> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(_) => required_str(tool, args, key).map(Some),
    }
}

/// Fetch a required non-negative integer argument.
pub fn required_u64(tool: &str, args: &Map<String, Value>, key: &str) -> Result<u64, ToolError> {
    match args.get(key) {
        Some(v) => v.as_u64().ok_or_else(|| {
            invalid(
                tool,
                format!("argument '{}' must be a non-negative integer, got {}", key, v),
            )
        }),
        None => Err(invalid(tool, format!("missing required argument '{}'", key))),
    }
}

/// Serialize a tool output value the way every tool reports success.
pub fn to_output(value: &Value) -> String {
    value.to_string()
}

/// Round a currency amount to cents.
pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}
