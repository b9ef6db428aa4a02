//! Airline customer-service tools over `users`, `reservations` and `flights`.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde_json::{json, Map, Value};

use super::common::{CalculateTool, ThinkTool, TransferToHumanAgentsTool};
use super::data::DomainData;
use super::tool::{required_str, required_u64, round_cents, to_output, Tool, ToolCatalog};
use crate::error::ToolError;

pub const TABLES: &[&str] = &["users", "reservations", "flights"];

/// Task indices known to be unreliable and skipped unless selected explicitly.
pub const DEFAULT_DENYLIST: &[usize] = &[5, 9, 24, 27, 28, 36, 38, 40, 41, 42, 44, 46];

/// Price of each additional non-free checked bag.
const NONFREE_BAGGAGE_PRICE: f64 = 50.0;

pub fn catalog() -> ToolCatalog {
    vec![
        Arc::new(CalculateTool),
        Arc::new(CancelReservationTool),
        Arc::new(GetReservationDetailsTool),
        Arc::new(GetUserDetailsTool),
        Arc::new(ListAllAirportsTool),
        Arc::new(SearchDirectFlightTool),
        Arc::new(ThinkTool),
        Arc::new(TransferToHumanAgentsTool),
        Arc::new(UpdateReservationBaggagesTool),
    ]
}

pub struct GetUserDetailsTool;

impl Tool for GetUserDetailsTool {
    fn name(&self) -> &str {
        "get_user_details"
    }

    fn description(&self) -> &str {
        "Get the details of a user, including their reservations."
    }

    fn invoke(&self, data: &mut DomainData, args: &Map<String, Value>) -> Result<String, ToolError> {
        let user_id = required_str(self.name(), args, "user_id")?;
        Ok(match data.record("users", user_id)? {
            Some(user) => to_output(user),
            None => "Error: user not found".to_string(),
        })
    }
}

pub struct GetReservationDetailsTool;

impl Tool for GetReservationDetailsTool {
    fn name(&self) -> &str {
        "get_reservation_details"
    }

    fn description(&self) -> &str {
        "Get the details of a reservation."
    }

    fn invoke(&self, data: &mut DomainData, args: &Map<String, Value>) -> Result<String, ToolError> {
        let reservation_id = required_str(self.name(), args, "reservation_id")?;
        Ok(match data.record("reservations", reservation_id)? {
            Some(reservation) => to_output(reservation),
            None => "Error: reservation not found".to_string(),
        })
    }
}

/// Lists available direct flights on one date.
///
/// Each result is the flight record without its `dates` calendar, merged
/// with that date's availability and prices.
pub struct SearchDirectFlightTool;

impl Tool for SearchDirectFlightTool {
    fn name(&self) -> &str {
        "search_direct_flight"
    }

    fn description(&self) -> &str {
        "Search direct flights between two cities on a specific date (YYYY-MM-DD)."
    }

    fn invoke(&self, data: &mut DomainData, args: &Map<String, Value>) -> Result<String, ToolError> {
        let origin = required_str(self.name(), args, "origin")?;
        let destination = required_str(self.name(), args, "destination")?;
        let date = required_str(self.name(), args, "date")?;

        let results: Vec<Value> = data
            .table("flights")?
            .values()
            .filter(|flight| flight["origin"] == origin && flight["destination"] == destination)
            .filter_map(|flight| {
                let day = flight["dates"].get(date)?;
                if day["status"] != "available" {
                    return None;
                }
                let mut entry: Map<String, Value> = flight
                    .as_object()?
                    .iter()
                    .filter(|(key, _)| key.as_str() != "dates")
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect();
                if let Some(day) = day.as_object() {
                    entry.extend(day.iter().map(|(k, v)| (k.clone(), v.clone())));
                }
                Some(Value::Object(entry))
            })
            .collect();

        Ok(to_output(&Value::Array(results)))
    }
}

/// Lists every airport code served by at least one flight.
pub struct ListAllAirportsTool;

impl Tool for ListAllAirportsTool {
    fn name(&self) -> &str {
        "list_all_airports"
    }

    fn description(&self) -> &str {
        "List all airports served by the airline."
    }

    fn invoke(&self, data: &mut DomainData, _args: &Map<String, Value>) -> Result<String, ToolError> {
        let airports: BTreeSet<&str> = data
            .table("flights")?
            .values()
            .flat_map(|flight| [flight["origin"].as_str(), flight["destination"].as_str()])
            .flatten()
            .collect();
        Ok(to_output(&json!(airports)))
    }
}

/// Cancels a reservation, appending a negative entry per original payment.
pub struct CancelReservationTool;

impl Tool for CancelReservationTool {
    fn name(&self) -> &str {
        "cancel_reservation"
    }

    fn description(&self) -> &str {
        "Cancel the whole reservation and refund every payment."
    }

    fn invoke(&self, data: &mut DomainData, args: &Map<String, Value>) -> Result<String, ToolError> {
        let reservation_id = required_str(self.name(), args, "reservation_id")?;
        let Some(reservation) = data.record_mut("reservations", reservation_id)? else {
            return Ok("Error: reservation not found".to_string());
        };

        let refunds: Vec<Value> = reservation["payment_history"]
            .as_array()
            .map(|payments| {
                payments
                    .iter()
                    .map(|p| {
                        json!({
                            "payment_id": p["payment_id"],
                            "amount": -p["amount"].as_f64().unwrap_or_default(),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();

        match reservation["payment_history"].as_array_mut() {
            Some(history) => history.extend(refunds),
            None => reservation["payment_history"] = Value::Array(refunds),
        }
        reservation["status"] = json!("cancelled");
        Ok(to_output(reservation))
    }
}

/// Changes the checked-bag counts on a reservation, charging for extra
/// non-free bags.
pub struct UpdateReservationBaggagesTool;

impl Tool for UpdateReservationBaggagesTool {
    fn name(&self) -> &str {
        "update_reservation_baggages"
    }

    fn description(&self) -> &str {
        "Update the baggage information of a reservation."
    }

    fn invoke(&self, data: &mut DomainData, args: &Map<String, Value>) -> Result<String, ToolError> {
        let reservation_id = required_str(self.name(), args, "reservation_id")?;
        let total_baggages = required_u64(self.name(), args, "total_baggages")?;
        let nonfree_baggages = required_u64(self.name(), args, "nonfree_baggages")?;
        let payment_id = required_str(self.name(), args, "payment_id")?;

        let Some(reservation) = data.record("reservations", reservation_id)? else {
            return Ok("Error: reservation not found".to_string());
        };
        let user_id = reservation["user_id"].as_str().unwrap_or_default().to_string();
        let already_paid = reservation["nonfree_baggages"].as_u64().unwrap_or_default();
        let total_price =
            NONFREE_BAGGAGE_PRICE * nonfree_baggages.saturating_sub(already_paid) as f64;

        let Some(method) = data
            .record("users", &user_id)?
            .and_then(|user| user["payment_methods"].get(payment_id))
        else {
            return Ok("Error: payment method not found".to_string());
        };
        if payment_id.contains("certificate") {
            return Ok("Error: certificate cannot be used to update reservation".to_string());
        }
        let is_gift_card = payment_id.contains("gift_card");
        if is_gift_card && method["amount"].as_f64().unwrap_or_default() < total_price {
            return Ok("Error: gift card balance is not enough".to_string());
        }

        if is_gift_card && total_price > 0.0 {
            if let Some(method) = data
                .record_mut("users", &user_id)?
                .and_then(|user| user["payment_methods"].get_mut(payment_id))
            {
                let balance = method["amount"].as_f64().unwrap_or_default();
                method["amount"] = json!(round_cents(balance - total_price));
            }
        }

        let Some(reservation) = data.record_mut("reservations", reservation_id)? else {
            return Ok("Error: reservation not found".to_string());
        };
        reservation["total_baggages"] = json!(total_baggages);
        reservation["nonfree_baggages"] = json!(nonfree_baggages);
        if total_price > 0.0 {
            let charge = json!({"payment_id": payment_id, "amount": total_price});
            match reservation["payment_history"].as_array_mut() {
                Some(history) => history.push(charge),
                None => reservation["payment_history"] = json!([charge]),
            }
        }
        Ok(to_output(reservation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> DomainData {
        let users = json!({
            "mia_li_3668": {
                "name": {"first_name": "Mia", "last_name": "Li"},
                "payment_methods": {
                    "gift_card_7": {"source": "gift_card", "amount": 60.0, "id": "gift_card_7"},
                    "certificate_1": {"source": "certificate", "amount": 250.0, "id": "certificate_1"},
                    "credit_card_4": {"source": "credit_card", "id": "credit_card_4"}
                },
                "reservations": ["NO6JO3"]
            }
        });
        let reservations = json!({
            "NO6JO3": {
                "reservation_id": "NO6JO3",
                "user_id": "mia_li_3668",
                "status": "active",
                "total_baggages": 1,
                "nonfree_baggages": 0,
                "payment_history": [{"payment_id": "credit_card_4", "amount": 320.0}]
            }
        });
        let flights = json!({
            "HAT001": {
                "flight_number": "HAT001",
                "origin": "JFK",
                "destination": "SFO",
                "dates": {
                    "2024-05-16": {"status": "available", "prices": {"economy": 150}},
                    "2024-05-17": {"status": "cancelled"}
                }
            },
            "HAT002": {
                "flight_number": "HAT002",
                "origin": "SFO",
                "destination": "ORD",
                "dates": {"2024-05-16": {"status": "available"}}
            }
        });
        DomainData::new()
            .with_table("users", users.as_object().cloned().unwrap())
            .with_table("reservations", reservations.as_object().cloned().unwrap())
            .with_table("flights", flights.as_object().cloned().unwrap())
    }

    fn call(tool: &dyn Tool, data: &mut DomainData, args: Value) -> String {
        tool.invoke(data, args.as_object().unwrap()).unwrap()
    }

    #[test]
    fn test_denylist_is_sorted_and_unique() {
        assert!(DEFAULT_DENYLIST.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_search_direct_flight_filters_by_availability() {
        let mut data = snapshot();
        let out = call(
            &SearchDirectFlightTool,
            &mut data,
            json!({"origin": "JFK", "destination": "SFO", "date": "2024-05-16"}),
        );
        let flights: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(flights.as_array().unwrap().len(), 1);
        assert_eq!(flights[0]["flight_number"], "HAT001");
        assert_eq!(flights[0]["prices"]["economy"], 150);
        assert!(flights[0].get("dates").is_none());

        let out = call(
            &SearchDirectFlightTool,
            &mut data,
            json!({"origin": "JFK", "destination": "SFO", "date": "2024-05-17"}),
        );
        assert_eq!(out, "[]");
    }

    #[test]
    fn test_list_all_airports() {
        let mut data = snapshot();
        let out = call(&ListAllAirportsTool, &mut data, json!({}));
        assert_eq!(out, r#"["JFK","ORD","SFO"]"#);
    }

    #[test]
    fn test_cancel_reservation_appends_negative_refunds() {
        let mut data = snapshot();
        let out = call(
            &CancelReservationTool,
            &mut data,
            json!({"reservation_id": "NO6JO3"}),
        );
        let reservation: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(reservation["status"], "cancelled");
        assert_eq!(reservation["payment_history"][1]["amount"], -320.0);

        let out = call(
            &CancelReservationTool,
            &mut data,
            json!({"reservation_id": "ZZZZZZ"}),
        );
        assert_eq!(out, "Error: reservation not found");
    }

    #[test]
    fn test_update_baggages_charges_gift_card() {
        let mut data = snapshot();
        let out = call(
            &UpdateReservationBaggagesTool,
            &mut data,
            json!({
                "reservation_id": "NO6JO3",
                "total_baggages": 2,
                "nonfree_baggages": 1,
                "payment_id": "gift_card_7"
            }),
        );
        let reservation: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(reservation["nonfree_baggages"], 1);
        assert_eq!(reservation["payment_history"][1]["amount"], 50.0);

        let balance = data.record("users", "mia_li_3668").unwrap().unwrap()["payment_methods"]
            ["gift_card_7"]["amount"]
            .as_f64()
            .unwrap();
        assert_eq!(balance, 10.0);
    }

    #[test]
    fn test_update_baggages_rejects_certificate_and_unknown_method() {
        let mut data = snapshot();
        let args = |payment_id: &str| {
            json!({
                "reservation_id": "NO6JO3",
                "total_baggages": 3,
                "nonfree_baggages": 2,
                "payment_id": payment_id
            })
        };
        assert_eq!(
            call(&UpdateReservationBaggagesTool, &mut data, args("certificate_1")),
            "Error: certificate cannot be used to update reservation"
        );
        assert_eq!(
            call(&UpdateReservationBaggagesTool, &mut data, args("paypal_9")),
            "Error: payment method not found"
        );
        assert_eq!(
            call(&UpdateReservationBaggagesTool, &mut data, args("gift_card_7")),
            "Error: gift card balance is not enough"
        );
    }
}
