use std::sync::Arc;

use tracing::{info, instrument};

use crate::error::{AppError, AppResult};
use crate::model::inventory::{
    sku_for, InventorySummary, ItemListResponse, ItemStock, LowStockItem, NewItem, NewReorder,
    ReorderRequest, Transfer, DEFAULT_LOCATION,
};
use crate::repository::InventoryRepository;
use crate::utils::pagination::PageRequest;

/// Input for [`InventoryService::add_item`].
#[derive(Debug, Clone)]
pub struct AddItem {
    pub name: String,
    pub quantity: i64,
    pub unit: Option<String>,
    pub location: Option<String>,
    pub reorder_level: Option<i64>,
    pub reorder_quantity: Option<i64>,
}

#[derive(Clone)]
pub struct InventoryService {
    repo: Arc<dyn InventoryRepository>,
}

impl InventoryService {
    pub fn new(repo: Arc<dyn InventoryRepository>) -> Self {
        Self { repo }
    }

    pub async fn stock(&self, name_or_sku: &str) -> AppResult<ItemStock> {
        let item = self
            .repo
            .find_item(name_or_sku.trim())
            .await?
            .ok_or_else(|| AppError::not_found(format!("No item named '{}'", name_or_sku.trim())))?;
        self.repo.item_stock(&item).await
    }

    pub async fn list(&self, page: PageRequest) -> AppResult<ItemListResponse> {
        let (data, total) = self.repo.list_stock(page).await?;
        Ok(ItemListResponse {
            data,
            page_index: page.page_index,
            page_size: page.page_size,
            total,
        })
    }

    pub async fn low_stock(&self) -> AppResult<Vec<LowStockItem>> {
        let stock = self.repo.low_stock().await?;
        Ok(stock.iter().map(LowStockItem::from).collect())
    }

    /// Opens a pending reorder; at most one pending reorder per item.
    #[instrument(name = "reorder", skip(self))]
    pub async fn reorder(
        &self,
        name_or_sku: &str,
        quantity: Option<i64>,
        requested_by: Option<u64>,
        note: Option<String>,
    ) -> AppResult<(ItemStock, ReorderRequest)> {
        let stock = self.stock(name_or_sku).await?;

        if let Some(pending) = self.repo.pending_reorder(stock.item.id).await? {
            return Err(AppError::Conflict(format!(
                "A reorder of {} {} is already pending for '{}'",
                pending.quantity, stock.item.unit, stock.item.name
            )));
        }

        let quantity = quantity.unwrap_or(stock.item.reorder_quantity);
        if quantity <= 0 {
            return Err(AppError::validation("reorder quantity must be positive"));
        }

        let reorder = self
            .repo
            .insert_reorder(&NewReorder {
                item_id: stock.item.id,
                quantity,
                requested_by,
                note,
            })
            .await?;

        info!(item = %stock.item.name, quantity, reorder_id = reorder.id, "Reorder created");
        Ok((stock, reorder))
    }

    #[instrument(name = "add_item", skip(self))]
    pub async fn add_item(&self, input: AddItem) -> AppResult<ItemStock> {
        let name = input.name.trim().to_lowercase();
        if name.is_empty() {
            return Err(AppError::validation("item name must not be empty"));
        }
        if input.quantity < 0 {
            return Err(AppError::validation("quantity must not be negative"));
        }
        if self.repo.find_item(&name).await?.is_some() {
            return Err(AppError::Conflict(format!("Item '{}' already exists", name)));
        }

        let sequence = self.repo.next_item_sequence().await?;
        let item = self
            .repo
            .insert_item(&NewItem {
                sku: sku_for(&name, sequence),
                name,
                unit: input.unit.unwrap_or_else(|| "unit".to_string()),
                reorder_level: input.reorder_level.unwrap_or(0).max(0),
                reorder_quantity: input.reorder_quantity.unwrap_or(0).max(0),
                location: input
                    .location
                    .map(|l| l.trim().to_lowercase())
                    .filter(|l| !l.is_empty())
                    .unwrap_or_else(|| DEFAULT_LOCATION.to_string()),
                initial_quantity: input.quantity,
            })
            .await?;

        info!(item = %item.name, sku = %item.sku, "Item added");
        self.repo.item_stock(&item).await
    }

    #[instrument(name = "transfer", skip(self))]
    pub async fn transfer(&self, name_or_sku: &str, quantity: i64, from: &str, to: &str) -> AppResult<Transfer> {
        if quantity <= 0 {
            return Err(AppError::validation("transfer quantity must be positive"));
        }
        let (from, to) = (from.trim().to_lowercase(), to.trim().to_lowercase());
        if from.is_empty() || to.is_empty() {
            return Err(AppError::validation("source and destination locations are required"));
        }
        if from == to {
            return Err(AppError::validation("source and destination must differ"));
        }

        let stock = self.stock(name_or_sku).await?;
        let (from_level, to_level) = self.repo.transfer(stock.item.id, &from, &to, quantity).await?;

        info!(item = %stock.item.name, quantity, from = %from, to = %to, "Stock transferred");
        Ok(Transfer {
            item: stock.item,
            quantity,
            from: from_level,
            to: to_level,
        })
    }

    pub async fn summary(&self) -> AppResult<InventorySummary> {
        self.repo.summary().await
    }
}
