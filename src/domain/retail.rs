//! Retail customer-service tools over `users`, `orders` and `products`.

use std::sync::Arc;

use serde_json::{json, Map, Value};

use super::common::{CalculateTool, ThinkTool, TransferToHumanAgentsTool};
use super::data::DomainData;
use super::tool::{optional_str, required_str, round_cents, to_output, Tool, ToolCatalog};
use crate::error::ToolError;

pub const TABLES: &[&str] = &["users", "orders", "products"];

/// Reasons accepted by [`CancelOrderTool`].
pub const CANCEL_REASONS: &[&str] = &["no longer needed", "ordered by mistake"];

pub fn catalog() -> ToolCatalog {
    vec![
        Arc::new(CalculateTool),
        Arc::new(CancelOrderTool),
        Arc::new(FindUserIdByNameZipTool),
        Arc::new(GetOrderDetailsTool),
        Arc::new(GetProductDetailsTool),
        Arc::new(GetUserDetailsTool),
        Arc::new(ListAllProductTypesTool),
        Arc::new(ModifyUserAddressTool),
        Arc::new(ThinkTool),
        Arc::new(TransferToHumanAgentsTool),
    ]
}

fn lookup(data: &DomainData, table: &str, id: &str, not_found: &str) -> Result<String, ToolError> {
    Ok(match data.record(table, id)? {
        Some(record) => to_output(record),
        None => format!("Error: {} not found", not_found),
    })
}

pub struct GetUserDetailsTool;

impl Tool for GetUserDetailsTool {
    fn name(&self) -> &str {
        "get_user_details"
    }

    fn description(&self) -> &str {
        "Get the details of a user, including their orders."
    }

    fn invoke(&self, data: &mut DomainData, args: &Map<String, Value>) -> Result<String, ToolError> {
        let user_id = required_str(self.name(), args, "user_id")?;
        lookup(data, "users", user_id, "user")
    }
}

pub struct GetOrderDetailsTool;

impl Tool for GetOrderDetailsTool {
    fn name(&self) -> &str {
        "get_order_details"
    }

    fn description(&self) -> &str {
        "Get the status and details of an order."
    }

    fn invoke(&self, data: &mut DomainData, args: &Map<String, Value>) -> Result<String, ToolError> {
        let order_id = required_str(self.name(), args, "order_id")?;
        lookup(data, "orders", order_id, "order")
    }
}

pub struct GetProductDetailsTool;

impl Tool for GetProductDetailsTool {
    fn name(&self) -> &str {
        "get_product_details"
    }

    fn description(&self) -> &str {
        "Get the inventory details of a product."
    }

    fn invoke(&self, data: &mut DomainData, args: &Map<String, Value>) -> Result<String, ToolError> {
        let product_id = required_str(self.name(), args, "product_id")?;
        lookup(data, "products", product_id, "product")
    }
}

pub struct FindUserIdByNameZipTool;

impl Tool for FindUserIdByNameZipTool {
    fn name(&self) -> &str {
        "find_user_id_by_name_zip"
    }

    fn description(&self) -> &str {
        "Find a user id by first name, last name, and zip code."
    }

    fn invoke(&self, data: &mut DomainData, args: &Map<String, Value>) -> Result<String, ToolError> {
        let first_name = required_str(self.name(), args, "first_name")?.to_lowercase();
        let last_name = required_str(self.name(), args, "last_name")?.to_lowercase();
        let zip = required_str(self.name(), args, "zip")?;

        let found = data.table("users")?.iter().find(|(_, user)| {
            let name = &user["name"];
            name["first_name"].as_str().map(str::to_lowercase).as_deref()
                == Some(first_name.as_str())
                && name["last_name"].as_str().map(str::to_lowercase).as_deref()
                    == Some(last_name.as_str())
                && user["address"]["zip"].as_str() == Some(zip)
        });

        Ok(match found {
            Some((user_id, _)) => user_id.clone(),
            None => "Error: user not found".to_string(),
        })
    }
}

pub struct ListAllProductTypesTool;

impl Tool for ListAllProductTypesTool {
    fn name(&self) -> &str {
        "list_all_product_types"
    }

    fn description(&self) -> &str {
        "List the name and product id of all product types."
    }

    fn invoke(&self, data: &mut DomainData, _args: &Map<String, Value>) -> Result<String, ToolError> {
        let types: Map<String, Value> = data
            .table("products")?
            .iter()
            .filter_map(|(product_id, product)| {
                product["name"]
                    .as_str()
                    .map(|name| (name.to_string(), Value::String(product_id.clone())))
            })
            .collect();
        Ok(to_output(&Value::Object(types)))
    }
}

/// Cancels a pending order and refunds every payment to its original method.
///
/// Gift card refunds are credited back to the card balance immediately.
pub struct CancelOrderTool;

impl Tool for CancelOrderTool {
    fn name(&self) -> &str {
        "cancel_order"
    }

    fn description(&self) -> &str {
        "Cancel a pending order. The reason must be 'no longer needed' or 'ordered by mistake'."
    }

    fn invoke(&self, data: &mut DomainData, args: &Map<String, Value>) -> Result<String, ToolError> {
        let order_id = required_str(self.name(), args, "order_id")?;
        let reason = optional_str(self.name(), args, "reason")?.unwrap_or(CANCEL_REASONS[0]);

        let (user_id, payments) = match data.record("orders", order_id)? {
            None => return Ok("Error: order not found".to_string()),
            Some(order) if order["status"] != "pending" => {
                return Ok("Error: non-pending order cannot be cancelled".to_string())
            }
            Some(order) => (
                order["user_id"].as_str().unwrap_or_default().to_string(),
                order["payment_history"]
                    .as_array()
                    .cloned()
                    .unwrap_or_default(),
            ),
        };
        if !CANCEL_REASONS.contains(&reason) {
            return Ok("Error: invalid reason".to_string());
        }

        let mut refunds = Vec::with_capacity(payments.len());
        for payment in &payments {
            let method_id = payment["payment_method_id"].as_str().unwrap_or_default();
            let amount = payment["amount"].as_f64().unwrap_or_default();
            refunds.push(json!({
                "transaction_type": "refund",
                "amount": amount,
                "payment_method_id": method_id,
            }));

            if method_id.contains("gift_card") {
                if let Some(method) = data
                    .record_mut("users", &user_id)?
                    .and_then(|user| user["payment_methods"].get_mut(method_id))
                {
                    let balance = method["balance"].as_f64().unwrap_or_default();
                    method["balance"] = json!(round_cents(balance + amount));
                }
            }
        }

        let Some(order) = data.record_mut("orders", order_id)? else {
            return Ok("Error: order not found".to_string());
        };
        order["status"] = json!("cancelled");
        order["cancel_reason"] = json!(reason);
        if let Some(history) = order["payment_history"].as_array_mut() {
            history.extend(refunds);
        } else {
            order["payment_history"] = Value::Array(refunds);
        }
        Ok(to_output(order))
    }
}

pub struct ModifyUserAddressTool;

impl Tool for ModifyUserAddressTool {
    fn name(&self) -> &str {
        "modify_user_address"
    }

    fn description(&self) -> &str {
        "Modify the default address of a user."
    }

    fn invoke(&self, data: &mut DomainData, args: &Map<String, Value>) -> Result<String, ToolError> {
        let user_id = required_str(self.name(), args, "user_id")?;
        let mut address = Map::new();
        for key in ["address1", "address2", "city", "state", "country", "zip"] {
            address.insert(key.to_string(), json!(required_str(self.name(), args, key)?));
        }

        Ok(match data.record_mut("users", user_id)? {
            Some(user) => {
                user["address"] = Value::Object(address);
                to_output(user)
            }
            None => "Error: user not found".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> DomainData {
        let users = json!({
            "jane_doe_123": {
                "name": {"first_name": "Jane", "last_name": "Doe"},
                "address": {"zip": "10001", "city": "New York"},
                "payment_methods": {
                    "gift_card_1": {"source": "gift_card", "balance": 10.0},
                    "credit_card_2": {"source": "credit_card"}
                },
                "orders": ["5591", "5592"]
            }
        });
        let orders = json!({
            "5591": {
                "order_id": "5591",
                "user_id": "jane_doe_123",
                "status": "pending",
                "payment_history": [
                    {"transaction_type": "payment", "amount": 25.5, "payment_method_id": "gift_card_1"},
                    {"transaction_type": "payment", "amount": 100.0, "payment_method_id": "credit_card_2"}
                ]
            },
            "5592": {
                "order_id": "5592",
                "user_id": "jane_doe_123",
                "status": "delivered",
                "payment_history": []
            }
        });
        let products = json!({
            "p1": {"name": "Desk Lamp", "product_id": "p1"},
            "p2": {"name": "Backpack", "product_id": "p2"}
        });
        DomainData::new()
            .with_table("users", users.as_object().cloned().unwrap())
            .with_table("orders", orders.as_object().cloned().unwrap())
            .with_table("products", products.as_object().cloned().unwrap())
    }

    fn call(tool: &dyn Tool, data: &mut DomainData, args: Value) -> String {
        tool.invoke(data, args.as_object().unwrap()).unwrap()
    }

    #[test]
    fn test_catalog_names_are_unique() {
        let mut names: Vec<String> = catalog().iter().map(|t| t.name().to_string()).collect();
        let before = names.len();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), before);
        assert!(names.contains(&"cancel_order".to_string()));
    }

    #[test]
    fn test_find_user_id_is_case_insensitive_on_name() {
        let mut data = snapshot();
        let out = call(
            &FindUserIdByNameZipTool,
            &mut data,
            json!({"first_name": "jane", "last_name": "DOE", "zip": "10001"}),
        );
        assert_eq!(out, "jane_doe_123");

        let out = call(
            &FindUserIdByNameZipTool,
            &mut data,
            json!({"first_name": "jane", "last_name": "doe", "zip": "99999"}),
        );
        assert_eq!(out, "Error: user not found");
    }

    #[test]
    fn test_cancel_order_refunds_and_credits_gift_card() {
        let mut data = snapshot();
        let out = call(&CancelOrderTool, &mut data, json!({"order_id": "5591"}));

        let order: Value = serde_json::from_str(&out).expect("output is JSON");
        assert_eq!(order["status"], "cancelled");
        assert_eq!(order["cancel_reason"], "no longer needed");
        let history = order["payment_history"].as_array().unwrap();
        assert_eq!(history.len(), 4);
        assert_eq!(history[2]["transaction_type"], "refund");
        assert_eq!(history[2]["amount"], 25.5);

        let balance = data.record("users", "jane_doe_123").unwrap().unwrap()["payment_methods"]
            ["gift_card_1"]["balance"]
            .as_f64()
            .unwrap();
        assert_eq!(balance, 35.5);
    }

    #[test]
    fn test_cancel_order_twice_reports_non_pending() {
        let mut data = snapshot();
        call(&CancelOrderTool, &mut data, json!({"order_id": "5591"}));
        let out = call(&CancelOrderTool, &mut data, json!({"order_id": "5591"}));
        assert_eq!(out, "Error: non-pending order cannot be cancelled");
    }

    #[test]
    fn test_cancel_order_rejects_unknown_reason_without_mutation() {
        let mut data = snapshot();
        let before = data.clone();
        let out = call(
            &CancelOrderTool,
            &mut data,
            json!({"order_id": "5591", "reason": "changed my mind"}),
        );
        assert_eq!(out, "Error: invalid reason");
        assert_eq!(data, before);
    }

    #[test]
    fn test_cancel_order_missing_order() {
        let mut data = snapshot();
        let out = call(&CancelOrderTool, &mut data, json!({"order_id": "0000"}));
        assert_eq!(out, "Error: order not found");
    }

    #[test]
    fn test_list_all_product_types() {
        let mut data = snapshot();
        let out = call(&ListAllProductTypesTool, &mut data, json!({}));
        let types: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(types["Backpack"], "p2");
        assert_eq!(types["Desk Lamp"], "p1");
    }

    #[test]
    fn test_missing_arguments_are_errors() {
        let mut data = snapshot();
        let err = CancelOrderTool
            .invoke(&mut data, &Map::new())
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments { .. }));

        let err = ModifyUserAddressTool
            .invoke(
                &mut data,
                json!({"user_id": "jane_doe_123", "address1": "1 Main St"})
                    .as_object()
                    .unwrap(),
            )
            .unwrap_err();
        assert!(err.to_string().contains("address2"));
    }
}
