use serde_json::json;

use super::{entity, AgentAction, AgentRequest, AgentResponse, Intent, DEFAULT_LOCATION_KEY};
use crate::error::{AppError, AppResult};
use crate::model::inventory::{ItemStock, DEFAULT_LOCATION};
use crate::service::inventory::{AddItem, InventoryService};

fn describe(stock: &ItemStock) -> String {
    let mut line = format!("{}: {} {}", stock.item.name, stock.total_quantity, stock.item.unit);
    if stock.locations.len() > 1 {
        let parts: Vec<String> = stock
            .locations
            .iter()
            .map(|l| format!("{} {}", l.location, l.quantity))
            .collect();
        line.push_str(&format!(" ({})", parts.join(", ")));
    }
    line
}

pub async fn stock_check(inventory: &InventoryService, request: &AgentRequest) -> AppResult<AgentResponse> {
    let names = request.values(entity::ITEM);
    if names.is_empty() {
        return Ok(AgentResponse::success(
            Intent::StockCheck,
            "Please specify which items you'd like to check stock levels for.",
            Vec::new(),
        ));
    }

    let mut lines = vec!["Current stock levels:".to_string()];
    let mut actions = Vec::new();
    for name in names {
        match inventory.stock(name).await {
            Ok(stock) => {
                lines.push(describe(&stock));
                actions.push(AgentAction::new(
                    "show_stock",
                    format!("Stock for {}", stock.item.name),
                    json!(stock),
                ));
            }
            Err(AppError::NotFound(_)) => lines.push(format!("{}: item not found", name)),
            Err(e) => return Err(e),
        }
    }

    Ok(AgentResponse::success(Intent::StockCheck, lines.join("\n"), actions))
}

pub async fn low_stock(inventory: &InventoryService) -> AppResult<AgentResponse> {
    let items = inventory.low_stock().await?;
    if items.is_empty() {
        return Ok(AgentResponse::success(
            Intent::LowStock,
            "All items are adequately stocked.",
            Vec::new(),
        ));
    }

    let mut lines = vec!["Low stock alert:".to_string()];
    let mut actions = vec![AgentAction::new(
        "show_low_stock",
        format!("{} items at or below reorder level", items.len()),
        json!(items),
    )];
    for low in &items {
        lines.push(format!(
            "- {}: {} {} (reorder level {})",
            low.item.name, low.total_quantity, low.item.unit, low.item.reorder_level
        ));
        actions.push(AgentAction::new(
            "suggest_reorder",
            format!("Reorder {} {} of {}", low.item.reorder_quantity, low.item.unit, low.item.name),
            json!({
                "item_id": low.item.id,
                "item": low.item.name,
                "quantity": low.item.reorder_quantity,
            }),
        ));
    }
    lines.push("Would you like me to create reorder requests for these items?".to_string());

    Ok(AgentResponse::success(Intent::LowStock, lines.join("\n"), actions))
}

/// Reorders each named item, or every low-stock item without a pending
/// reorder when no item is named.
pub async fn reorder(
    inventory: &InventoryService,
    request: &AgentRequest,
    requested_by: Option<u64>,
) -> AppResult<AgentResponse> {
    let quantity = request.quantity()?;

    let names = request.values(entity::ITEM);
    if !names.is_empty() {
        let mut lines = Vec::new();
        let mut actions = Vec::new();
        for name in names {
            match inventory
                .reorder(name, quantity, requested_by, Some(request.command.clone()))
                .await
            {
                Ok((stock, reorder)) => {
                    lines.push(format!(
                        "Created reorder #{} for {} {} of {}.",
                        reorder.id, reorder.quantity, stock.item.unit, stock.item.name
                    ));
                    actions.push(AgentAction::new(
                        "reorder_created",
                        format!("Reorder {}", stock.item.name),
                        json!(reorder),
                    ));
                }
                Err(AppError::NotFound(_)) => lines.push(format!("{}: item not found", name)),
                Err(AppError::Conflict(msg) | AppError::Validation(msg)) => {
                    lines.push(format!("{}: {}", name, msg))
                }
                Err(e) => return Err(e),
            }
        }

        let text = lines.join("\n");
        if actions.is_empty() {
            return Ok(AgentResponse::error(Intent::Reorder, text));
        }
        return Ok(AgentResponse::success(Intent::Reorder, text, actions));
    }

    let mut actions = Vec::new();
    let mut skipped = 0;
    for low in inventory.low_stock().await? {
        match inventory
            .reorder(&low.item.sku, None, requested_by, Some(request.command.clone()))
            .await
        {
            Ok((_, reorder)) => actions.push(AgentAction::new(
                "reorder_created",
                format!("Reorder {}", low.item.name),
                json!(reorder),
            )),
            Err(AppError::Conflict(_) | AppError::Validation(_)) => skipped += 1,
            Err(e) => return Err(e),
        }
    }

    let mut text = format!("Created {} reorder requests for low stock items.", actions.len());
    if skipped > 0 {
        text.push_str(&format!(" Skipped {} already pending or without a reorder quantity.", skipped));
    }
    Ok(AgentResponse::success(Intent::Reorder, text, actions))
}

pub async fn add_item(inventory: &InventoryService, request: &AgentRequest) -> AppResult<AgentResponse> {
    let name = request
        .first(entity::ITEM)
        .ok_or_else(|| AppError::validation("Please name the item to add"))?;

    let location = request
        .first(entity::LOCATION)
        .or_else(|| request.context_str(DEFAULT_LOCATION_KEY))
        .unwrap_or(DEFAULT_LOCATION);

    let stock = inventory
        .add_item(AddItem {
            name: name.to_string(),
            quantity: request.quantity()?.unwrap_or(0),
            unit: request.first(entity::UNIT).map(str::to_string),
            location: Some(location.to_string()),
            reorder_level: None,
            reorder_quantity: None,
        })
        .await?;

    let text = format!(
        "Added {} ({}) with {} {} at {}.",
        stock.item.name,
        stock.item.sku,
        stock.total_quantity,
        stock.item.unit,
        location.to_lowercase()
    );
    let action = AgentAction::new("item_created", format!("New item {}", stock.item.name), json!(stock));
    Ok(AgentResponse::success(Intent::AddItem, text, vec![action]))
}

pub async fn transfer(inventory: &InventoryService, request: &AgentRequest) -> AppResult<AgentResponse> {
    let name = request
        .first(entity::ITEM)
        .ok_or_else(|| AppError::validation("Please name the item to transfer"))?;
    let quantity = request
        .quantity()?
        .ok_or_else(|| AppError::validation("Please say how many units to transfer"))?;

    let locations = request.values(entity::LOCATION);
    let from = request
        .first(entity::FROM_LOCATION)
        .or_else(|| locations.first().copied());
    let to = request
        .first(entity::TO_LOCATION)
        .or_else(|| locations.get(1).copied());
    let (Some(from), Some(to)) = (from, to) else {
        return Err(AppError::validation("Please give both a source and a destination location"));
    };

    let moved = inventory.transfer(name, quantity, from, to).await?;
    let text = format!(
        "Moved {} {} of {} from {} to {}. {} now holds {}, {} holds {}.",
        moved.quantity,
        moved.item.unit,
        moved.item.name,
        moved.from.location,
        moved.to.location,
        moved.from.location,
        moved.from.quantity,
        moved.to.location,
        moved.to.quantity
    );
    let action = AgentAction::new(
        "stock_transferred",
        format!("Transfer {}", moved.item.name),
        json!(moved),
    );
    Ok(AgentResponse::success(Intent::Transfer, text, vec![action]))
}

pub async fn summary(inventory: &InventoryService) -> AppResult<AgentResponse> {
    let summary = inventory.summary().await?;
    let text = format!(
        "Inventory summary:\n- Items: {}\n- Units in stock: {}\n- Low stock items: {}\n- Pending reorders: {}\nHow can I help you with inventory today?",
        summary.item_count, summary.total_units, summary.low_stock_count, summary.pending_reorders
    );
    let action = AgentAction::new("show_summary", "Inventory summary", json!(summary));
    Ok(AgentResponse::success(Intent::Summary, text, vec![action]))
}
