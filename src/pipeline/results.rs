//! Decoding of raw tool outputs into stored action results.

use serde_json::Value;
use tracing::debug;

/// Decode every raw output as JSON, all or nothing.
///
/// If any single entry fails to parse, the whole list is kept as the
/// original raw strings. A partially decoded mix is never produced.
pub fn decode_results(raw: Vec<String>) -> Vec<Value> {
    let decoded: Result<Vec<Value>, _> = raw.iter().map(|r| serde_json::from_str(r)).collect();
    match decoded {
        Ok(values) => values,
        Err(err) => {
            debug!(error = %err, entries = raw.len(), "Keeping raw action results");
            raw.into_iter().map(Value::String).collect()
        }
    }
}
