mod common;

use common::seeded_state;
use hrm_ops::agent::{AgentRequest, AgentStatus, Intent};
use hrm_ops::service::inventory::AddItem;
use hrm_ops::state::AppState;
use serde_json::json;

async fn stock_item(state: &AppState, name: &str, quantity: i64, reorder_level: i64) {
    state
        .inventory
        .add_item(AddItem {
            name: name.to_string(),
            quantity,
            unit: Some("kg".to_string()),
            location: Some("warehouse".to_string()),
            reorder_level: Some(reorder_level),
            reorder_quantity: Some(50),
        })
        .await
        .unwrap();
}

#[actix_web::test]
async fn stock_check_names_the_requested_item() {
    let (_, state) = seeded_state().await;
    stock_item(&state, "apples", 42, 10).await;

    let request = AgentRequest::new("check stock level for apples").with_entity("item", "apples");
    let response = state.agent.dispatch(&request, Some(1)).await;

    assert_eq!(response.status, AgentStatus::Success);
    assert_eq!(response.intent, Intent::StockCheck);
    assert!(response.text.contains("apples"));
    assert!(response.text.contains("42"));
    assert_eq!(response.actions[0].action_type, "show_stock");
}

#[actix_web::test]
async fn stock_check_reports_unknown_items_inline() {
    let (_, state) = seeded_state().await;
    let request = AgentRequest::new("how many kiwis").with_entity("item", "kiwis");
    let response = state.agent.dispatch(&request, None).await;

    assert_eq!(response.status, AgentStatus::Success);
    assert!(response.text.contains("kiwis: item not found"));
    assert!(response.actions.is_empty());
}

#[actix_web::test]
async fn unrecognized_command_falls_back_to_summary() {
    let (_, state) = seeded_state().await;
    stock_item(&state, "apples", 5, 10).await;
    stock_item(&state, "pears", 30, 10).await;

    let response = state.agent.dispatch(&AgentRequest::new("good morning"), None).await;

    assert_eq!(response.status, AgentStatus::Success);
    assert_eq!(response.intent, Intent::Summary);
    assert_eq!(response.actions[0].action_type, "show_summary");
    assert_eq!(response.actions[0].data["item_count"], json!(2));
    assert_eq!(response.actions[0].data["total_units"], json!(35));
    assert_eq!(response.actions[0].data["low_stock_count"], json!(1));
}

#[actix_web::test]
async fn low_stock_suggests_reorders() {
    let (_, state) = seeded_state().await;
    stock_item(&state, "apples", 10, 10).await;
    stock_item(&state, "pears", 30, 10).await;

    let response = state.agent.dispatch(&AgentRequest::new("what is running low?"), None).await;

    assert_eq!(response.intent, Intent::LowStock);
    let kinds: Vec<&str> = response.actions.iter().map(|a| a.action_type.as_str()).collect();
    assert_eq!(kinds, vec!["show_low_stock", "suggest_reorder"]);
    assert!(response.text.contains("apples"));
    assert!(!response.text.contains("pears"));
}

#[actix_web::test]
async fn second_reorder_while_pending_is_an_error_response() {
    let (_, state) = seeded_state().await;
    stock_item(&state, "apples", 3, 10).await;

    let request = AgentRequest::new("reorder apples")
        .with_entity("item", "apples")
        .with_entity("quantity", "80");
    let first = state.agent.dispatch(&request, Some(7)).await;
    assert_eq!(first.status, AgentStatus::Success);
    assert_eq!(first.actions[0].action_type, "reorder_created");
    assert_eq!(first.actions[0].data["quantity"], json!(80));
    assert_eq!(first.actions[0].data["status"], json!("pending"));

    let second = state.agent.dispatch(&request, Some(7)).await;
    assert_eq!(second.status, AgentStatus::Error);
    assert_eq!(second.intent, Intent::Reorder);
    assert!(second.actions.is_empty());
    assert!(second.text.contains("already pending"));
}

#[actix_web::test]
async fn reorder_covers_every_named_item() {
    let (_, state) = seeded_state().await;
    stock_item(&state, "apples", 3, 10).await;
    stock_item(&state, "pears", 4, 10).await;
    stock_item(&state, "plums", 2, 10).await;
    state
        .inventory
        .reorder("plums", None, None, None)
        .await
        .unwrap();

    let request = AgentRequest::new("reorder apples and pears, plums and kiwis")
        .with_entity("item", "apples")
        .with_entity("item", "pears")
        .with_entity("item", "plums")
        .with_entity("item", "kiwis");
    let response = state.agent.dispatch(&request, Some(7)).await;

    assert_eq!(response.status, AgentStatus::Success);
    assert_eq!(response.actions.len(), 2);
    assert!(response.actions.iter().all(|a| a.action_type == "reorder_created"));
    assert_eq!(response.actions[0].data["quantity"], json!(50));
    assert!(response.text.contains("of apples"));
    assert!(response.text.contains("of pears"));
    assert!(response.text.contains("plums: A reorder of 50 kg is already pending"));
    assert!(response.text.contains("kiwis: item not found"));

    // plums kept its single pending reorder
    let summary = state.inventory.summary().await.unwrap();
    assert_eq!(summary.pending_reorders, 3);
}

#[actix_web::test]
async fn reorder_without_item_covers_every_low_stock_item() {
    let (_, state) = seeded_state().await;
    stock_item(&state, "apples", 1, 10).await;
    stock_item(&state, "pears", 2, 10).await;
    stock_item(&state, "plums", 90, 10).await;

    let response = state.agent.dispatch(&AgentRequest::new("restock everything"), None).await;
    assert_eq!(response.status, AgentStatus::Success);
    assert_eq!(response.actions.len(), 2);

    let summary = state.inventory.summary().await.unwrap();
    assert_eq!(summary.pending_reorders, 2);
}

#[actix_web::test]
async fn add_item_uses_context_location_and_rejects_duplicates() {
    let (_, state) = seeded_state().await;
    let mut request = AgentRequest::new("add item bananas")
        .with_entity("item", "Bananas")
        .with_entity("quantity", "12");
    request.context.insert("default_location".into(), json!("Store"));

    let created = state.agent.dispatch(&request, None).await;
    assert_eq!(created.status, AgentStatus::Success);
    assert_eq!(created.intent, Intent::AddItem);
    assert_eq!(created.actions[0].action_type, "item_created");

    let stock = state.inventory.stock("bananas").await.unwrap();
    assert_eq!(stock.at("store"), 12);
    assert_eq!(stock.item.sku, "BAN-001");

    let duplicate = state.agent.dispatch(&request, None).await;
    assert_eq!(duplicate.status, AgentStatus::Error);
}

#[actix_web::test]
async fn transfer_moves_stock_and_refuses_overdrafts() {
    let (_, state) = seeded_state().await;
    stock_item(&state, "apples", 20, 5).await;

    let request = AgentRequest::new("transfer apples to the store")
        .with_entity("item", "apples")
        .with_entity("quantity", "8")
        .with_entity("location", "warehouse")
        .with_entity("location", "store");
    let moved = state.agent.dispatch(&request, None).await;
    assert_eq!(moved.status, AgentStatus::Success);
    assert_eq!(moved.actions[0].action_type, "stock_transferred");

    let stock = state.inventory.stock("apples").await.unwrap();
    assert_eq!(stock.at("warehouse"), 12);
    assert_eq!(stock.at("store"), 8);
    assert_eq!(stock.total_quantity, 20);

    let too_many = AgentRequest::new("move apples")
        .with_entity("item", "apples")
        .with_entity("quantity", "100")
        .with_entity("from_location", "warehouse")
        .with_entity("to_location", "store");
    let refused = state.agent.dispatch(&too_many, None).await;
    assert_eq!(refused.status, AgentStatus::Error);
    assert!(refused.text.contains("Insufficient stock"));
    assert_eq!(state.inventory.stock("apples").await.unwrap().at("warehouse"), 12);
}
