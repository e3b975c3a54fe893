//! Process-local store with the same semantics as the MySQL backend.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use tokio::sync::RwLock;

use crate::error::{AppError, AppResult};
use crate::model::employee::{Employee, EmployeeBrief};
use crate::model::holiday::{Holiday, HolidayFilter};
use crate::model::inventory::{
    InventorySummary, Item, ItemStock, NewItem, NewReorder, ReorderRequest, ReorderStatus, StockLevel,
};
use crate::model::ticket::{NewTicket, Ticket, TicketDetail, TicketFilter};
use crate::model::user::{RefreshTokenRecord, User};
use crate::repository::{
    date_taken, HolidayRepository, InventoryRepository, NewHoliday, TicketRepository, UserRepository,
};
use crate::service::ticket::number::{day_prefix, next_ticket_number};
use crate::utils::pagination::PageRequest;

#[derive(Default)]
struct Tables {
    employees: BTreeMap<u64, Employee>,
    holidays: BTreeMap<u64, Holiday>,
    tickets: BTreeMap<u64, Ticket>,
    items: BTreeMap<u64, Item>,
    /// (item id, location) => quantity
    stock: BTreeMap<(u64, String), i64>,
    reorders: BTreeMap<u64, ReorderRequest>,
    users: BTreeMap<u64, User>,
    refresh_tokens: BTreeMap<String, RefreshTokenRecord>,
    next_refresh_id: u64,
}

fn next_id<V>(map: &BTreeMap<u64, V>) -> u64 {
    map.keys().next_back().map_or(1, |k| k + 1)
}

impl Tables {
    fn live_holiday_on(&self, date: NaiveDate, exclude_id: Option<u64>) -> Option<&Holiday> {
        self.holidays
            .values()
            .find(|h| h.is_live() && h.date == date && Some(h.id) != exclude_id)
    }

    fn brief(&self, employee_id: u64) -> AppResult<EmployeeBrief> {
        self.employees
            .get(&employee_id)
            .map(Employee::brief)
            .ok_or_else(|| AppError::internal(format!("ticket references missing employee {}", employee_id)))
    }

    /// Matching tickets with their employee, newest first.
    fn matching(&self, filter: &TicketFilter) -> Vec<(&Ticket, EmployeeBrief)> {
        let mut rows: Vec<(&Ticket, EmployeeBrief)> = self
            .tickets
            .values()
            .filter_map(|t| {
                let employee = self.employees.get(&t.employee_id)?.brief();
                filter.matches(t, &employee).then_some((t, employee))
            })
            .collect();
        rows.sort_by(|(a, _), (b, _)| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        rows
    }

    fn item_stock(&self, item: &Item) -> ItemStock {
        let locations = self
            .stock
            .range((item.id, String::new())..)
            .take_while(|((id, _), _)| *id == item.id)
            .map(|((id, location), quantity)| StockLevel {
                item_id: *id,
                location: location.clone(),
                quantity: *quantity,
            })
            .collect();
        ItemStock::new(item.clone(), locations)
    }

    fn level(&self, item_id: u64, location: &str) -> StockLevel {
        StockLevel {
            item_id,
            location: location.to_string(),
            quantity: *self.stock.get(&(item_id, location.to_string())).unwrap_or(&0),
        }
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Employees are owned elsewhere; this is how they reach the memory store.
    pub async fn add_employee(&self, employee: Employee) {
        self.tables.write().await.employees.insert(employee.id, employee);
    }

    pub async fn add_user(&self, username: &str, password_hash: &str, role_id: u8, employee_id: Option<u64>) -> u64 {
        let mut tables = self.tables.write().await;
        let id = next_id(&tables.users);
        tables.users.insert(
            id,
            User {
                id,
                username: username.to_string(),
                password: password_hash.to_string(),
                role_id,
                employee_id,
            },
        );
        id
    }

    /// Number of stored holiday rows, deleted ones included.
    pub async fn holiday_rows(&self) -> usize {
        self.tables.read().await.holidays.len()
    }
}

#[async_trait]
impl HolidayRepository for MemoryStore {
    async fn insert(&self, holiday: &NewHoliday) -> AppResult<Holiday> {
        let mut tables = self.tables.write().await;
        if let Some(existing) = tables.live_holiday_on(holiday.date, None) {
            return Err(date_taken(existing));
        }
        let now = Utc::now();
        let row = Holiday {
            id: next_id(&tables.holidays),
            name: holiday.name.clone(),
            date: holiday.date,
            description: holiday.description.clone(),
            is_recurring: holiday.is_recurring,
            is_active: true,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        };
        tables.holidays.insert(row.id, row.clone());
        Ok(row)
    }

    async fn find(&self, id: u64) -> AppResult<Option<Holiday>> {
        Ok(self.tables.read().await.holidays.get(&id).cloned())
    }

    async fn list(&self, filter: &HolidayFilter, page: PageRequest) -> AppResult<(Vec<Holiday>, i64)> {
        let tables = self.tables.read().await;
        let mut rows: Vec<Holiday> = tables.holidays.values().filter(|h| filter.matches(h)).cloned().collect();
        rows.sort_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)));
        Ok((page.slice(&rows), rows.len() as i64))
    }

    async fn calendar(&self, year: i32) -> AppResult<Vec<Holiday>> {
        let tables = self.tables.read().await;
        Ok(tables
            .holidays
            .values()
            .filter(|h| h.is_live() && (h.is_recurring || h.date.year() == year))
            .cloned()
            .collect())
    }

    async fn update(&self, holiday: &Holiday) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        if holiday.is_live() {
            if let Some(existing) = tables.live_holiday_on(holiday.date, Some(holiday.id)) {
                return Err(date_taken(existing));
            }
        }
        let row = tables
            .holidays
            .get_mut(&holiday.id)
            .ok_or_else(|| AppError::not_found("Holiday not found"))?;
        *row = Holiday {
            updated_at: Utc::now(),
            created_at: row.created_at,
            ..holiday.clone()
        };
        Ok(())
    }

    async fn soft_delete(&self, id: u64) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        match tables.holidays.get_mut(&id) {
            Some(h) if !h.is_deleted => {
                h.is_active = false;
                h.is_deleted = true;
                h.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[async_trait]
impl TicketRepository for MemoryStore {
    async fn create(&self, ticket: &NewTicket, now: DateTime<Utc>) -> AppResult<TicketDetail> {
        let mut tables = self.tables.write().await;

        let employee = match tables.employees.get(&ticket.employee_id) {
            Some(e) if e.is_active() => e.brief(),
            _ => return Err(AppError::not_found("Employee not found or inactive")),
        };

        let prefix = day_prefix(now.date_naive());
        let last = tables
            .tickets
            .values()
            .map(|t| t.ticket_number.as_str())
            .filter(|n| n.starts_with(&prefix))
            .max_by(|a, b| a.len().cmp(&b.len()).then(a.cmp(b)));
        let ticket_number = next_ticket_number(now.date_naive(), last);

        if tables.tickets.values().any(|t| t.ticket_number == ticket_number) {
            return Err(AppError::Conflict(format!("Duplicate ticket number {}", ticket_number)));
        }

        let row = Ticket {
            id: next_id(&tables.tickets),
            ticket_number,
            employee_id: ticket.employee_id,
            ticket_type: ticket.ticket_type,
            deduction_amount: ticket.deduction_amount,
            reason: ticket.reason.clone(),
            created_by: ticket.created_by,
            created_at: now,
        };
        tables.tickets.insert(row.id, row.clone());

        Ok(TicketDetail { ticket: row, employee })
    }

    async fn find(&self, id: u64) -> AppResult<Option<TicketDetail>> {
        let tables = self.tables.read().await;
        match tables.tickets.get(&id) {
            Some(t) => Ok(Some(TicketDetail {
                ticket: t.clone(),
                employee: tables.brief(t.employee_id)?,
            })),
            None => Ok(None),
        }
    }

    async fn list(&self, filter: &TicketFilter, page: PageRequest) -> AppResult<(Vec<TicketDetail>, i64)> {
        let tables = self.tables.read().await;
        let rows: Vec<TicketDetail> = tables
            .matching(filter)
            .into_iter()
            .map(|(t, employee)| TicketDetail {
                ticket: t.clone(),
                employee,
            })
            .collect();
        let total = rows.len() as i64;
        Ok((page.slice(&rows), total))
    }

    async fn count_summary_employees(&self, filter: &TicketFilter) -> AppResult<i64> {
        let tables = self.tables.read().await;
        let ids: BTreeSet<u64> = tables.matching(filter).iter().map(|(t, _)| t.employee_id).collect();
        Ok(ids.len() as i64)
    }

    async fn summary_employees(&self, filter: &TicketFilter, page: PageRequest) -> AppResult<Vec<EmployeeBrief>> {
        let tables = self.tables.read().await;
        let mut employees: BTreeMap<u64, EmployeeBrief> = BTreeMap::new();
        for (t, employee) in tables.matching(filter) {
            employees.entry(t.employee_id).or_insert(employee);
        }
        let mut employees: Vec<EmployeeBrief> = employees.into_values().collect();
        // case-insensitive like the default MySQL collation
        employees.sort_by_cached_key(|e| (e.first_name.to_lowercase(), e.last_name.to_lowercase(), e.id));
        Ok(page.slice(&employees))
    }

    async fn tickets_for_employees(&self, filter: &TicketFilter, employee_ids: &[u64]) -> AppResult<Vec<Ticket>> {
        let tables = self.tables.read().await;
        Ok(tables
            .matching(filter)
            .into_iter()
            .filter(|(t, _)| employee_ids.contains(&t.employee_id))
            .map(|(t, _)| t.clone())
            .collect())
    }
}

#[async_trait]
impl InventoryRepository for MemoryStore {
    async fn find_item(&self, name_or_sku: &str) -> AppResult<Option<Item>> {
        let tables = self.tables.read().await;
        Ok(tables
            .items
            .values()
            .find(|i| i.name.eq_ignore_ascii_case(name_or_sku) || i.sku.eq_ignore_ascii_case(name_or_sku))
            .cloned())
    }

    async fn item_stock(&self, item: &Item) -> AppResult<ItemStock> {
        Ok(self.tables.read().await.item_stock(item))
    }

    async fn list_stock(&self, page: PageRequest) -> AppResult<(Vec<ItemStock>, i64)> {
        let tables = self.tables.read().await;
        let mut items: Vec<&Item> = tables.items.values().filter(|i| i.is_active).collect();
        items.sort_by(|a, b| a.name.cmp(&b.name));
        let total = items.len() as i64;
        let stock: Vec<ItemStock> = page
            .slice(&items)
            .into_iter()
            .map(|i| tables.item_stock(i))
            .collect();
        Ok((stock, total))
    }

    async fn low_stock(&self) -> AppResult<Vec<ItemStock>> {
        let tables = self.tables.read().await;
        let mut low: Vec<ItemStock> = tables
            .items
            .values()
            .filter(|i| i.is_active)
            .map(|i| tables.item_stock(i))
            .filter(ItemStock::is_low)
            .collect();
        low.sort_by(|a, b| a.item.name.cmp(&b.item.name));
        Ok(low)
    }

    async fn insert_item(&self, item: &NewItem) -> AppResult<Item> {
        let mut tables = self.tables.write().await;
        if tables
            .items
            .values()
            .any(|i| i.name.eq_ignore_ascii_case(&item.name) || i.sku.eq_ignore_ascii_case(&item.sku))
        {
            return Err(AppError::Conflict(format!("Item '{}' already exists", item.name)));
        }
        let row = Item {
            id: next_id(&tables.items),
            sku: item.sku.clone(),
            name: item.name.clone(),
            unit: item.unit.clone(),
            reorder_level: item.reorder_level,
            reorder_quantity: item.reorder_quantity,
            is_active: true,
            created_at: Utc::now(),
        };
        tables.items.insert(row.id, row.clone());
        tables
            .stock
            .insert((row.id, item.location.to_lowercase()), item.initial_quantity);
        Ok(row)
    }

    async fn next_item_sequence(&self) -> AppResult<u64> {
        Ok(next_id(&self.tables.read().await.items))
    }

    async fn pending_reorder(&self, item_id: u64) -> AppResult<Option<ReorderRequest>> {
        let tables = self.tables.read().await;
        Ok(tables
            .reorders
            .values()
            .find(|r| r.item_id == item_id && r.status == ReorderStatus::Pending)
            .cloned())
    }

    async fn insert_reorder(&self, reorder: &NewReorder) -> AppResult<ReorderRequest> {
        let mut tables = self.tables.write().await;
        let row = ReorderRequest {
            id: next_id(&tables.reorders),
            item_id: reorder.item_id,
            quantity: reorder.quantity,
            status: ReorderStatus::Pending,
            requested_by: reorder.requested_by,
            note: reorder.note.clone(),
            created_at: Utc::now(),
        };
        tables.reorders.insert(row.id, row.clone());
        Ok(row)
    }

    async fn transfer(&self, item_id: u64, from: &str, to: &str, quantity: i64) -> AppResult<(StockLevel, StockLevel)> {
        let mut tables = self.tables.write().await;
        let available = tables.level(item_id, from).quantity;
        if available < quantity {
            return Err(AppError::validation(format!(
                "Insufficient stock at {}: {} available, {} requested",
                from, available, quantity
            )));
        }
        *tables.stock.entry((item_id, from.to_string())).or_insert(0) -= quantity;
        *tables.stock.entry((item_id, to.to_string())).or_insert(0) += quantity;
        Ok((tables.level(item_id, from), tables.level(item_id, to)))
    }

    async fn summary(&self) -> AppResult<InventorySummary> {
        let tables = self.tables.read().await;
        let stock: Vec<ItemStock> = tables
            .items
            .values()
            .filter(|i| i.is_active)
            .map(|i| tables.item_stock(i))
            .collect();
        Ok(InventorySummary {
            item_count: stock.len() as i64,
            total_units: stock.iter().map(|s| s.total_quantity).sum(),
            low_stock_count: stock.iter().filter(|s| s.is_low()).count() as i64,
            pending_reorders: tables
                .reorders
                .values()
                .filter(|r| r.status == ReorderStatus::Pending)
                .count() as i64,
        })
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.username.eq_ignore_ascii_case(username))
            .cloned())
    }

    async fn touch_last_login(&self, _user_id: u64) -> AppResult<()> {
        Ok(())
    }

    async fn store_refresh_token(&self, user_id: u64, jti: &str, _expires_at: i64) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        tables.next_refresh_id += 1;
        let id = tables.next_refresh_id;
        tables.refresh_tokens.insert(
            jti.to_string(),
            RefreshTokenRecord {
                id,
                user_id,
                revoked: false,
            },
        );
        Ok(())
    }

    async fn find_refresh_token(&self, jti: &str) -> AppResult<Option<RefreshTokenRecord>> {
        Ok(self.tables.read().await.refresh_tokens.get(jti).cloned())
    }

    async fn revoke_refresh_token(&self, jti: &str) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        match tables.refresh_tokens.get_mut(jti) {
            Some(record) if !record.revoked => {
                record.revoked = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
