use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

pub const DEFAULT_LOCATION: &str = "main";

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Item {
    pub id: u64,
    #[schema(example = "APL-001")]
    pub sku: String,
    #[schema(example = "apples")]
    pub name: String,
    #[schema(example = "kg")]
    pub unit: String,
    /// Total stock at or below this level counts as low
    pub reorder_level: i64,
    /// Default quantity for a new reorder request
    pub reorder_quantity: i64,
    pub is_active: bool,
    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct StockLevel {
    pub item_id: u64,
    #[schema(example = "warehouse")]
    pub location: String,
    pub quantity: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ItemStock {
    pub item: Item,
    pub total_quantity: i64,
    pub locations: Vec<StockLevel>,
}

impl ItemStock {
    pub fn new(item: Item, mut locations: Vec<StockLevel>) -> Self {
        locations.sort_by(|a, b| a.location.cmp(&b.location));
        let total_quantity = locations.iter().map(|l| l.quantity).sum();
        Self {
            item,
            total_quantity,
            locations,
        }
    }

    pub fn is_low(&self) -> bool {
        self.total_quantity <= self.item.reorder_level
    }

    pub fn at(&self, location: &str) -> i64 {
        self.locations
            .iter()
            .find(|l| l.location.eq_ignore_ascii_case(location))
            .map(|l| l.quantity)
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LowStockItem {
    pub item: Item,
    pub total_quantity: i64,
    /// Units missing to get back above the reorder level
    pub shortfall: i64,
}

impl From<&ItemStock> for LowStockItem {
    fn from(stock: &ItemStock) -> Self {
        Self {
            item: stock.item.clone(),
            total_quantity: stock.total_quantity,
            shortfall: (stock.item.reorder_level - stock.total_quantity + 1).max(0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr, ToSchema)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ReorderStatus {
    Pending,
    Ordered,
    Received,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReorderRequest {
    pub id: u64,
    pub item_id: u64,
    pub quantity: i64,
    pub status: ReorderStatus,
    pub requested_by: Option<u64>,
    pub note: Option<String>,
    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewItem {
    pub sku: String,
    pub name: String,
    pub unit: String,
    pub reorder_level: i64,
    pub reorder_quantity: i64,
    pub location: String,
    pub initial_quantity: i64,
}

#[derive(Debug, Clone)]
pub struct NewReorder {
    pub item_id: u64,
    pub quantity: i64,
    pub requested_by: Option<u64>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateReorder {
    #[schema(example = "apples")]
    pub item: String,
    /// Falls back to the item's reorder quantity
    pub quantity: Option<i64>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Transfer {
    pub item: Item,
    pub quantity: i64,
    pub from: StockLevel,
    pub to: StockLevel,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct InventorySummary {
    pub item_count: i64,
    pub total_units: i64,
    pub low_stock_count: i64,
    pub pending_reorders: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ItemListResponse {
    pub data: Vec<ItemStock>,
    #[schema(example = 1)]
    pub page_index: u32,
    #[schema(example = 10)]
    pub page_size: u32,
    #[schema(example = 42)]
    pub total: i64,
}

/// Derives a SKU from an item name: first three letters plus a counter.
pub fn sku_for(name: &str, sequence: u64) -> String {
    let stem: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(3)
        .collect::<String>()
        .to_ascii_uppercase();
    let stem = if stem.is_empty() { "ITM".to_string() } else { stem };
    format!("{}-{:03}", stem, sequence)
}
