//! Ordered replay of a task's ground-truth tool calls.

use tracing::debug;

use crate::domain::{DomainData, Tool};
use crate::environment::ToolMap;
use crate::error::ExecutionError;
use crate::task::ActionCall;

/// Run `actions` in order against one snapshot, collecting raw outputs.
///
/// `results[i]` is the output of `actions[i]`. Mutations made by action `i`
/// are visible to action `i + 1`. An action naming a tool that is not in
/// `tools` aborts the whole replay.
pub fn execute_actions(
    actions: &[ActionCall],
    tools: &ToolMap,
    data: &mut DomainData,
) -> Result<Vec<String>, ExecutionError> {
    let mut results = Vec::with_capacity(actions.len());

    for (index, action) in actions.iter().enumerate() {
        let tool = tools
            .get(&action.name)
            .ok_or_else(|| ExecutionError::UnknownTool {
                index,
                name: action.name.clone(),
            })?;

        let output = tool
            .invoke(data, &action.arguments)
            .map_err(|source| ExecutionError::ToolFailed {
                index,
                name: action.name.clone(),
                source,
            })?;

        debug!(index, tool = %action.name, output_len = output.len(), "Action executed");
        results.push(output);
    }

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::retail;
    use crate::environment::build_tool_map;
    use serde_json::{json, Map, Value};

    fn action(name: &str, args: Value) -> ActionCall {
        ActionCall::new(name, args.as_object().cloned().unwrap_or_else(Map::new))
    }

    fn data() -> DomainData {
        let orders = json!({
            "5591": {"status": "pending", "user_id": "u", "payment_history": []}
        });
        DomainData::new()
            .with_table("users", Map::new())
            .with_table("orders", orders.as_object().cloned().unwrap())
            .with_table("products", Map::new())
    }

    #[test]
    fn test_results_align_with_actions_and_see_prior_mutations() {
        let tools = build_tool_map(&retail::catalog()).unwrap();
        let mut data = data();
        let actions = vec![
            action("get_order_details", json!({"order_id": "5591"})),
            action("cancel_order", json!({"order_id": "5591"})),
            action("get_order_details", json!({"order_id": "5591"})),
            action("calculate", json!({"expression": "1 + 1"})),
        ];

        let results = execute_actions(&actions, &tools, &mut data).unwrap();
        assert_eq!(results.len(), actions.len());

        let before: Value = serde_json::from_str(&results[0]).unwrap();
        let after: Value = serde_json::from_str(&results[2]).unwrap();
        assert_eq!(before["status"], "pending");
        assert_eq!(after["status"], "cancelled");
        assert_eq!(results[3], "2");
    }

    #[test]
    fn test_unknown_tool_is_fatal() {
        let tools = build_tool_map(&retail::catalog()).unwrap();
        let mut data = data();
        let actions = vec![
            action("calculate", json!({"expression": "2"})),
            action("book_flight", json!({})),
        ];

        let err = execute_actions(&actions, &tools, &mut data).unwrap_err();
        assert!(matches!(
            err,
            ExecutionError::UnknownTool { index: 1, ref name } if name == "book_flight"
        ));
    }

    #[test]
    fn test_tool_argument_error_is_fatal() {
        let tools = build_tool_map(&retail::catalog()).unwrap();
        let mut data = data();
        let actions = vec![action("cancel_order", json!({}))];

        let err = execute_actions(&actions, &tools, &mut data).unwrap_err();
        assert!(matches!(err, ExecutionError::ToolFailed { index: 0, .. }));
    }

    #[test]
    fn test_empty_action_list() {
        let tools = build_tool_map(&retail::catalog()).unwrap();
        let mut data = data();
        let results = execute_actions(&[], &tools, &mut data).unwrap();
        assert!(results.is_empty());
    }
}
