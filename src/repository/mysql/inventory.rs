use std::collections::HashMap;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, MySql};
use tracing::error;

use super::MySqlStore;
use crate::error::{AppError, AppResult};
use crate::model::inventory::{
    InventorySummary, Item, ItemStock, NewItem, NewReorder, ReorderRequest, ReorderStatus, StockLevel,
};
use crate::repository::InventoryRepository;
use crate::utils::db_utils::Conditions;
use crate::utils::pagination::PageRequest;

const ITEM_COLUMNS: &str =
    "id, sku, name, unit, reorder_level, reorder_quantity, is_active, created_at";

const REORDER_COLUMNS: &str = "id, item_id, quantity, status, requested_by, note, created_at";

/// Ids of active items whose summed stock is at or below the reorder level.
const LOW_STOCK_IDS: &str = r#"
    SELECT i.id
    FROM items i
    LEFT JOIN stock_levels s ON s.item_id = i.id
    WHERE i.is_active = TRUE
    GROUP BY i.id, i.reorder_level
    HAVING COALESCE(SUM(s.quantity), 0) <= i.reorder_level
"#;

#[derive(FromRow)]
struct ReorderRow {
    id: u64,
    item_id: u64,
    quantity: i64,
    status: String,
    requested_by: Option<u64>,
    note: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<ReorderRow> for ReorderRequest {
    type Error = AppError;

    fn try_from(row: ReorderRow) -> Result<Self, Self::Error> {
        let status = ReorderStatus::from_str(&row.status)
            .map_err(|_| AppError::internal(format!("unknown reorder status '{}'", row.status)))?;
        Ok(ReorderRequest {
            id: row.id,
            item_id: row.item_id,
            quantity: row.quantity,
            status,
            requested_by: row.requested_by,
            note: row.note,
            created_at: row.created_at,
        })
    }
}

impl MySqlStore {
    /// Attaches per-location stock to already loaded items, keeping their order.
    async fn with_stock(&self, items: Vec<Item>) -> AppResult<Vec<ItemStock>> {
        let ids: Vec<u64> = items.iter().map(|i| i.id).collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut c = Conditions::new();
        c.push_in("item_id", &ids);
        let sql = format!(
            "SELECT item_id, location, quantity FROM stock_levels{} ORDER BY location",
            c.where_sql()
        );
        let levels = sqlx::query_as_with::<MySql, StockLevel, _>(&sql, c.arguments(&[]))
            .fetch_all(&self.pool)
            .await?;

        let mut by_item: HashMap<u64, Vec<StockLevel>> = HashMap::new();
        for level in levels {
            by_item.entry(level.item_id).or_default().push(level);
        }

        Ok(items
            .into_iter()
            .map(|item| {
                let levels = by_item.remove(&item.id).unwrap_or_default();
                ItemStock::new(item, levels)
            })
            .collect())
    }

    async fn fetch_level<'e, E>(executor: E, item_id: u64, location: &str) -> AppResult<StockLevel>
    where
        E: sqlx::Executor<'e, Database = MySql>,
    {
        let quantity: Option<i64> = sqlx::query_scalar(
            "SELECT quantity FROM stock_levels WHERE item_id = ? AND location = ?",
        )
        .bind(item_id)
        .bind(location)
        .fetch_optional(executor)
        .await?;

        Ok(StockLevel {
            item_id,
            location: location.to_string(),
            quantity: quantity.unwrap_or(0),
        })
    }
}

#[async_trait]
impl InventoryRepository for MySqlStore {
    async fn find_item(&self, name_or_sku: &str) -> AppResult<Option<Item>> {
        let item = sqlx::query_as::<_, Item>(&format!(
            "SELECT {} FROM items WHERE LOWER(name) = LOWER(?) OR LOWER(sku) = LOWER(?) LIMIT 1",
            ITEM_COLUMNS
        ))
        .bind(name_or_sku)
        .bind(name_or_sku)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    async fn item_stock(&self, item: &Item) -> AppResult<ItemStock> {
        let levels = sqlx::query_as::<_, StockLevel>(
            "SELECT item_id, location, quantity FROM stock_levels WHERE item_id = ? ORDER BY location",
        )
        .bind(item.id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ItemStock::new(item.clone(), levels))
    }

    async fn list_stock(&self, page: PageRequest) -> AppResult<(Vec<ItemStock>, i64)> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items WHERE is_active = TRUE")
            .fetch_one(&self.pool)
            .await?;

        let items = sqlx::query_as::<_, Item>(&format!(
            "SELECT {} FROM items WHERE is_active = TRUE ORDER BY name ASC LIMIT ? OFFSET ?",
            ITEM_COLUMNS
        ))
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok((self.with_stock(items).await?, total))
    }

    async fn low_stock(&self) -> AppResult<Vec<ItemStock>> {
        let items = sqlx::query_as::<_, Item>(&format!(
            "SELECT {} FROM items WHERE id IN ({}) ORDER BY name ASC",
            ITEM_COLUMNS, LOW_STOCK_IDS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to fetch low stock items");
            e
        })?;

        self.with_stock(items).await
    }

    async fn insert_item(&self, item: &NewItem) -> AppResult<Item> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO items (sku, name, unit, reorder_level, reorder_quantity)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&item.sku)
        .bind(&item.name)
        .bind(&item.unit)
        .bind(item.reorder_level)
        .bind(item.reorder_quantity)
        .execute(&mut *tx)
        .await?;
        let item_id = result.last_insert_id();

        sqlx::query("INSERT INTO stock_levels (item_id, location, quantity) VALUES (?, ?, ?)")
            .bind(item_id)
            .bind(&item.location)
            .bind(item.initial_quantity)
            .execute(&mut *tx)
            .await?;

        let row = sqlx::query_as::<_, Item>(&format!("SELECT {} FROM items WHERE id = ?", ITEM_COLUMNS))
            .bind(item_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(row)
    }

    async fn next_item_sequence(&self) -> AppResult<u64> {
        let next: u64 = sqlx::query_scalar("SELECT CAST(COALESCE(MAX(id), 0) + 1 AS UNSIGNED) FROM items")
            .fetch_one(&self.pool)
            .await?;
        Ok(next)
    }

    async fn pending_reorder(&self, item_id: u64) -> AppResult<Option<ReorderRequest>> {
        let row = sqlx::query_as::<_, ReorderRow>(&format!(
            "SELECT {} FROM reorder_requests WHERE item_id = ? AND status = ? ORDER BY id DESC LIMIT 1",
            REORDER_COLUMNS
        ))
        .bind(item_id)
        .bind(ReorderStatus::Pending.as_ref())
        .fetch_optional(&self.pool)
        .await?;

        row.map(ReorderRequest::try_from).transpose()
    }

    async fn insert_reorder(&self, reorder: &NewReorder) -> AppResult<ReorderRequest> {
        let result = sqlx::query(
            r#"
            INSERT INTO reorder_requests (item_id, quantity, status, requested_by, note)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(reorder.item_id)
        .bind(reorder.quantity)
        .bind(ReorderStatus::Pending.as_ref())
        .bind(reorder.requested_by)
        .bind(&reorder.note)
        .execute(&self.pool)
        .await?;

        let row = sqlx::query_as::<_, ReorderRow>(&format!(
            "SELECT {} FROM reorder_requests WHERE id = ?",
            REORDER_COLUMNS
        ))
        .bind(result.last_insert_id())
        .fetch_one(&self.pool)
        .await?;

        ReorderRequest::try_from(row)
    }

    async fn transfer(&self, item_id: u64, from: &str, to: &str, quantity: i64) -> AppResult<(StockLevel, StockLevel)> {
        let mut tx = self.pool.begin().await?;

        let available: Option<i64> = sqlx::query_scalar(
            "SELECT quantity FROM stock_levels WHERE item_id = ? AND location = ? FOR UPDATE",
        )
        .bind(item_id)
        .bind(from)
        .fetch_optional(&mut *tx)
        .await?;
        let available = available.unwrap_or(0);

        if available < quantity {
            return Err(AppError::validation(format!(
                "Insufficient stock at {}: {} available, {} requested",
                from, available, quantity
            )));
        }

        sqlx::query("UPDATE stock_levels SET quantity = quantity - ? WHERE item_id = ? AND location = ?")
            .bind(quantity)
            .bind(item_id)
            .bind(from)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            INSERT INTO stock_levels (item_id, location, quantity)
            VALUES (?, ?, ?)
            ON DUPLICATE KEY UPDATE quantity = quantity + VALUES(quantity)
            "#,
        )
        .bind(item_id)
        .bind(to)
        .bind(quantity)
        .execute(&mut *tx)
        .await?;

        let from_level = Self::fetch_level(&mut *tx, item_id, from).await?;
        let to_level = Self::fetch_level(&mut *tx, item_id, to).await?;

        tx.commit().await?;
        Ok((from_level, to_level))
    }

    async fn summary(&self) -> AppResult<InventorySummary> {
        let item_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items WHERE is_active = TRUE")
            .fetch_one(&self.pool)
            .await?;

        let total_units: i64 = sqlx::query_scalar(
            r#"
            SELECT CAST(COALESCE(SUM(s.quantity), 0) AS SIGNED)
            FROM stock_levels s
            JOIN items i ON i.id = s.item_id
            WHERE i.is_active = TRUE
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        let low_stock_count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM ({}) low", LOW_STOCK_IDS))
            .fetch_one(&self.pool)
            .await?;

        let pending_reorders: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reorder_requests WHERE status = ?")
            .bind(ReorderStatus::Pending.as_ref())
            .fetch_one(&self.pool)
            .await?;

        Ok(InventorySummary {
            item_count,
            total_units,
            low_stock_count,
            pending_reorders,
        })
    }
}
