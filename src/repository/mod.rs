//! Storage seams. Services depend on these traits; `mysql` is the production
//! backend and `memory` backs local runs and the test-suite.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use crate::error::{AppError, AppResult};
use crate::model::employee::EmployeeBrief;
use crate::model::holiday::{Holiday, HolidayFilter};
use crate::model::inventory::{
    InventorySummary, Item, ItemStock, NewItem, NewReorder, ReorderRequest, StockLevel,
};
use crate::model::ticket::{NewTicket, Ticket, TicketDetail, TicketFilter};
use crate::model::user::{RefreshTokenRecord, User};
use crate::utils::pagination::PageRequest;

pub mod memory;
pub mod mysql;

/// Insert payload for a holiday; the store stamps timestamps and flags.
#[derive(Debug, Clone)]
pub struct NewHoliday {
    pub name: String,
    pub date: NaiveDate,
    pub description: Option<String>,
    pub is_recurring: bool,
}

/// Rejection for a date already held by the live holiday `existing`.
pub(crate) fn date_taken(existing: &Holiday) -> AppError {
    AppError::validation(format!(
        "An active holiday already exists on {} ({})",
        existing.date, existing.name
    ))
}

#[async_trait]
pub trait HolidayRepository: Send + Sync {
    /// Fails with [`date_taken`] when a live (active, not deleted) holiday
    /// holds the date. The check and the write are one unit of work.
    async fn insert(&self, holiday: &NewHoliday) -> AppResult<Holiday>;

    /// Deleted rows included; callers decide visibility.
    async fn find(&self, id: u64) -> AppResult<Option<Holiday>>;

    /// One page ordered by date, plus the total number of matches.
    async fn list(&self, filter: &HolidayFilter, page: PageRequest) -> AppResult<(Vec<Holiday>, i64)>;

    /// Live holidays dated in `year` plus every live recurring holiday.
    async fn calendar(&self, year: i32) -> AppResult<Vec<Holiday>>;

    /// Same date rule as [`insert`](Self::insert) while the row stays live.
    async fn update(&self, holiday: &Holiday) -> AppResult<()>;

    /// Returns false when no undeleted row with `id` exists.
    async fn soft_delete(&self, id: u64) -> AppResult<bool>;
}

#[async_trait]
pub trait TicketRepository: Send + Sync {
    /// Validates the employee, numbers the ticket for `now`'s day and inserts
    /// it as one unit of work.
    async fn create(&self, ticket: &NewTicket, now: DateTime<Utc>) -> AppResult<TicketDetail>;

    async fn find(&self, id: u64) -> AppResult<Option<TicketDetail>>;

    /// Flat ticket listing, newest first.
    async fn list(&self, filter: &TicketFilter, page: PageRequest) -> AppResult<(Vec<TicketDetail>, i64)>;

    /// Distinct employees owning at least one matching ticket.
    async fn count_summary_employees(&self, filter: &TicketFilter) -> AppResult<i64>;

    /// One page of those employees ordered by first name, last name, id.
    async fn summary_employees(&self, filter: &TicketFilter, page: PageRequest) -> AppResult<Vec<EmployeeBrief>>;

    /// All matching tickets of the given employees, newest first.
    async fn tickets_for_employees(&self, filter: &TicketFilter, employee_ids: &[u64]) -> AppResult<Vec<Ticket>>;
}

#[async_trait]
pub trait InventoryRepository: Send + Sync {
    /// Case-insensitive match on name or SKU.
    async fn find_item(&self, name_or_sku: &str) -> AppResult<Option<Item>>;

    async fn item_stock(&self, item: &Item) -> AppResult<ItemStock>;

    async fn list_stock(&self, page: PageRequest) -> AppResult<(Vec<ItemStock>, i64)>;

    /// Active items whose total stock is at or below their reorder level.
    async fn low_stock(&self) -> AppResult<Vec<ItemStock>>;

    async fn insert_item(&self, item: &NewItem) -> AppResult<Item>;

    async fn next_item_sequence(&self) -> AppResult<u64>;

    async fn pending_reorder(&self, item_id: u64) -> AppResult<Option<ReorderRequest>>;

    async fn insert_reorder(&self, reorder: &NewReorder) -> AppResult<ReorderRequest>;

    /// Moves stock atomically; fails with a validation error when the source
    /// holds less than `quantity`.
    async fn transfer(&self, item_id: u64, from: &str, to: &str, quantity: i64) -> AppResult<(StockLevel, StockLevel)>;

    async fn summary(&self) -> AppResult<InventorySummary>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;

    async fn touch_last_login(&self, user_id: u64) -> AppResult<()>;

    async fn store_refresh_token(&self, user_id: u64, jti: &str, expires_at: i64) -> AppResult<()>;

    async fn find_refresh_token(&self, jti: &str) -> AppResult<Option<RefreshTokenRecord>>;

    /// Idempotent; returns whether a live token was revoked.
    async fn revoke_refresh_token(&self, jti: &str) -> AppResult<bool>;
}
