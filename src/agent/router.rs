use once_cell::sync::Lazy;
use tracing::{info, instrument, warn};

use super::{handlers, AgentRequest, AgentResponse, Intent};
use crate::service::inventory::InventoryService;

type Predicate = Box<dyn Fn(&str) -> bool + Send + Sync>;

fn contains_any(keywords: &'static [&'static str]) -> Predicate {
    Box::new(move |text: &str| keywords.iter().any(|k| text.contains(k)))
}

/// Whole-word match, so `move` does not fire on "remove".
fn word_any(words: &'static [&'static str]) -> Predicate {
    Box::new(move |text: &str| {
        text.split(|c: char| !c.is_alphanumeric())
            .any(|token| words.contains(&token))
    })
}

fn either(a: Predicate, b: Predicate) -> Predicate {
    Box::new(move |text: &str| a(text) || b(text))
}

/// First matching rule wins; commands matching nothing get the summary.
/// Explicit stock-check phrases outrank everything, the bare "stock" and
/// "quantity" catch-alls come last.
static RULES: Lazy<Vec<(Intent, Predicate)>> = Lazy::new(|| {
    vec![
        (
            Intent::StockCheck,
            contains_any(&["stock level", "check stock", "inventory level"]),
        ),
        (
            Intent::LowStock,
            contains_any(&["low stock", "running low", "below reorder", "out of stock"]),
        ),
        (
            Intent::Reorder,
            contains_any(&["reorder", "restock", "order more", "purchase"]),
        ),
        (
            Intent::AddItem,
            either(
                contains_any(&["add item", "new product", "new item", "create item"]),
                word_any(&["add"]),
            ),
        ),
        (
            Intent::Transfer,
            either(contains_any(&["transfer"]), word_any(&["move"])),
        ),
        (
            Intent::StockCheck,
            contains_any(&["stock", "how many", "quantity"]),
        ),
    ]
});

/// Case-insensitive intent selection over the ordered rule table.
pub fn route(command: &str) -> Intent {
    let text = command.to_lowercase();
    RULES
        .iter()
        .find(|(_, matches)| matches(&text))
        .map(|(intent, _)| *intent)
        .unwrap_or(Intent::Summary)
}

#[derive(Clone)]
pub struct CommandRouter {
    inventory: InventoryService,
}

impl CommandRouter {
    pub fn new(inventory: InventoryService) -> Self {
        Self { inventory }
    }

    /// Never fails: handler errors become `status = error` responses here.
    #[instrument(name = "agent_command", skip(self, request), fields(command = %request.command))]
    pub async fn dispatch(&self, request: &AgentRequest, requested_by: Option<u64>) -> AgentResponse {
        let intent = route(&request.command);
        info!(intent = %intent, "Command routed");

        let result = match intent {
            Intent::LowStock => handlers::low_stock(&self.inventory).await,
            Intent::Reorder => handlers::reorder(&self.inventory, request, requested_by).await,
            Intent::Transfer => handlers::transfer(&self.inventory, request).await,
            Intent::AddItem => handlers::add_item(&self.inventory, request).await,
            Intent::StockCheck => handlers::stock_check(&self.inventory, request).await,
            Intent::Summary => handlers::summary(&self.inventory).await,
        };

        result.unwrap_or_else(|e| {
            warn!(intent = %intent, error = %e, "Command failed");
            AgentResponse::error(
                intent,
                format!("I couldn't complete that request: {}", e.public_message()),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_route_in_rule_order() {
        assert_eq!(route("Check stock level for apples"), Intent::StockCheck);
        assert_eq!(route("what is running LOW?"), Intent::LowStock);
        assert_eq!(route("which items are out of stock"), Intent::LowStock);
        assert_eq!(route("items below reorder point"), Intent::LowStock);
        assert_eq!(route("restock the apples"), Intent::Reorder);
        assert_eq!(route("transfer 5 apples to the store"), Intent::Transfer);
        assert_eq!(route("add item pears"), Intent::AddItem);
        assert_eq!(route("how many pears do we have"), Intent::StockCheck);
    }

    #[test]
    fn explicit_stock_check_outranks_low_stock() {
        assert_eq!(route("check stock of items running low"), Intent::StockCheck);
        assert_eq!(route("stock level of everything out of stock"), Intent::StockCheck);
        assert_eq!(route("low stock items"), Intent::LowStock);
    }

    #[test]
    fn purchase_and_new_product_are_recognized() {
        assert_eq!(route("purchase more apples"), Intent::Reorder);
        assert_eq!(route("new product pears"), Intent::AddItem);
        assert_eq!(route("new item plums"), Intent::AddItem);
    }

    #[test]
    fn move_and_add_match_whole_words_only() {
        assert_eq!(route("move 3 apples to the store"), Intent::Transfer);
        assert_eq!(route("remove expired apples"), Intent::Summary);
        assert_eq!(route("address book"), Intent::Summary);
        assert_eq!(route("add pears"), Intent::AddItem);
        assert_eq!(route("please add, then move"), Intent::AddItem);
    }

    #[test]
    fn unmatched_commands_fall_back_to_summary() {
        assert_eq!(route("hello there"), Intent::Summary);
        assert_eq!(route(""), Intent::Summary);
    }
}
