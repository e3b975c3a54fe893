use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, MySql};
use tracing::{debug, error, warn};

use super::MySqlStore;
use crate::error::{AppError, AppResult};
use crate::model::employee::{ACTIVE_STATUS, EmployeeBrief};
use crate::model::ticket::{NewTicket, Ticket, TicketDetail, TicketFilter, TicketType};
use crate::repository::TicketRepository;
use crate::service::ticket::number::{day_prefix, next_ticket_number};
use crate::utils::db_utils::{Conditions, SqlValue, like_contains};
use crate::utils::pagination::PageRequest;

const FROM_TICKETS: &str = "FROM tickets t JOIN employees e ON e.id = t.employee_id";

const TICKET_COLUMNS: &str = "t.id, t.ticket_number, t.employee_id, t.ticket_type, \
     t.deduction_amount, t.reason, t.created_by, t.created_at";

const DETAIL_COLUMNS: &str = "t.id, t.ticket_number, t.employee_id, t.ticket_type, \
     t.deduction_amount, t.reason, t.created_by, t.created_at, \
     e.employee_code, e.first_name, e.last_name, e.email, e.department_id";

#[derive(FromRow)]
struct TicketRow {
    id: u64,
    ticket_number: String,
    employee_id: u64,
    ticket_type: String,
    deduction_amount: Decimal,
    reason: Option<String>,
    created_by: Option<u64>,
    created_at: DateTime<Utc>,
}

fn parse_type(raw: &str, ticket_number: &str) -> TicketType {
    TicketType::from_str(raw).unwrap_or_else(|_| {
        warn!(ticket_type = %raw, ticket_number = %ticket_number, "Unknown ticket type, reporting as OTHER");
        TicketType::Other
    })
}

impl From<TicketRow> for Ticket {
    fn from(row: TicketRow) -> Self {
        Ticket {
            ticket_type: parse_type(&row.ticket_type, &row.ticket_number),
            id: row.id,
            ticket_number: row.ticket_number,
            employee_id: row.employee_id,
            deduction_amount: row.deduction_amount,
            reason: row.reason,
            created_by: row.created_by,
            created_at: row.created_at,
        }
    }
}

#[derive(FromRow)]
struct TicketDetailRow {
    #[sqlx(flatten)]
    ticket: TicketRow,
    employee_code: String,
    first_name: String,
    last_name: String,
    email: String,
    department_id: u64,
}

impl From<TicketDetailRow> for TicketDetail {
    fn from(row: TicketDetailRow) -> Self {
        let employee = EmployeeBrief {
            id: row.ticket.employee_id,
            employee_code: row.employee_code,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            department_id: row.department_id,
        };
        TicketDetail {
            ticket: row.ticket.into(),
            employee,
        }
    }
}

#[derive(FromRow)]
struct EmployeeStatusRow {
    status: String,
}

/// WHERE conditions over `tickets t JOIN employees e`.
fn ticket_conditions(filter: &TicketFilter) -> Conditions {
    let mut c = Conditions::new();

    if let Some(employee_id) = filter.employee_id {
        c.push_eq("t.employee_id", employee_id);
    }
    if let Some(ticket_type) = filter.ticket_type {
        c.push_eq("t.ticket_type", ticket_type.as_ref());
    }
    if let Some(from) = filter.created_from() {
        c.push("t.created_at >= ?", vec![from.into()]);
    }
    if let Some(before) = filter.created_before() {
        c.push("t.created_at < ?", vec![before.into()]);
    }
    if let Some(department_id) = filter.department_id {
        c.push_eq("e.department_id", department_id);
    }
    if let Some(term) = filter.search_term() {
        let like = SqlValue::from(like_contains(term));
        c.push(
            "(e.first_name LIKE ? OR e.last_name LIKE ? \
             OR CONCAT(e.first_name, ' ', e.last_name) LIKE ? \
             OR e.email LIKE ? OR e.employee_code LIKE ? OR CAST(e.id AS CHAR) = ?)",
            vec![
                like.clone(),
                like.clone(),
                like.clone(),
                like.clone(),
                like,
                term.into(),
            ],
        );
    }

    c
}

impl MySqlStore {
    async fn fetch_detail<'e, E>(executor: E, id: u64) -> AppResult<Option<TicketDetail>>
    where
        E: sqlx::Executor<'e, Database = MySql>,
    {
        let sql = format!("SELECT {} {} WHERE t.id = ?", DETAIL_COLUMNS, FROM_TICKETS);
        let row = sqlx::query_as::<_, TicketDetailRow>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(row.map(TicketDetail::from))
    }
}

#[async_trait]
impl TicketRepository for MySqlStore {
    async fn create(&self, ticket: &NewTicket, now: DateTime<Utc>) -> AppResult<TicketDetail> {
        let mut tx = self.pool.begin().await?;

        let employee = sqlx::query_as::<_, EmployeeStatusRow>("SELECT status FROM employees WHERE id = ?")
            .bind(ticket.employee_id)
            .fetch_optional(&mut *tx)
            .await?;

        match employee {
            Some(e) if e.status.eq_ignore_ascii_case(ACTIVE_STATUS) => {}
            _ => return Err(AppError::not_found("Employee not found or inactive")),
        }

        // read-then-increment; the unique key on ticket_number rejects a racing duplicate
        let prefix = day_prefix(now.date_naive());
        let last: Option<String> = sqlx::query_scalar(
            r#"
            SELECT ticket_number
            FROM tickets
            WHERE ticket_number LIKE ?
            ORDER BY LENGTH(ticket_number) DESC, ticket_number DESC
            LIMIT 1
            "#,
        )
        .bind(format!("{}%", prefix))
        .fetch_optional(&mut *tx)
        .await?;

        let ticket_number = next_ticket_number(now.date_naive(), last.as_deref());

        let result = sqlx::query(
            r#"
            INSERT INTO tickets
            (ticket_number, employee_id, ticket_type, deduction_amount, reason, created_by, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&ticket_number)
        .bind(ticket.employee_id)
        .bind(ticket.ticket_type.as_ref())
        .bind(ticket.deduction_amount)
        .bind(&ticket.reason)
        .bind(ticket.created_by)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            error!(error = %e, ticket_number = %ticket_number, "Failed to insert ticket");
            e
        })?;

        let detail = Self::fetch_detail(&mut *tx, result.last_insert_id())
            .await?
            .ok_or_else(|| AppError::internal("inserted ticket vanished"))?;

        tx.commit().await?;
        Ok(detail)
    }

    async fn find(&self, id: u64) -> AppResult<Option<TicketDetail>> {
        Self::fetch_detail(&self.pool, id).await
    }

    async fn list(&self, filter: &TicketFilter, page: PageRequest) -> AppResult<(Vec<TicketDetail>, i64)> {
        let c = ticket_conditions(filter);

        let count_sql = format!("SELECT COUNT(*) {}{}", FROM_TICKETS, c.where_sql());
        debug!(sql = %count_sql, bindings = ?c.values(), "Counting tickets");
        let total = sqlx::query_scalar_with::<MySql, i64, _>(&count_sql, c.arguments(&[]))
            .fetch_one(&self.pool)
            .await?;

        let data_sql = format!(
            "SELECT {} {}{} ORDER BY t.created_at DESC, t.id DESC LIMIT ? OFFSET ?",
            DETAIL_COLUMNS,
            FROM_TICKETS,
            c.where_sql()
        );
        let rows = sqlx::query_as_with::<MySql, TicketDetailRow, _>(
            &data_sql,
            c.arguments(&[SqlValue::U64(page.limit()), SqlValue::U64(page.offset())]),
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!(error = %e, sql = %data_sql, "Failed to fetch tickets");
            e
        })?;

        Ok((rows.into_iter().map(TicketDetail::from).collect(), total))
    }

    async fn count_summary_employees(&self, filter: &TicketFilter) -> AppResult<i64> {
        let c = ticket_conditions(filter);
        let sql = format!("SELECT COUNT(DISTINCT t.employee_id) {}{}", FROM_TICKETS, c.where_sql());
        debug!(sql = %sql, bindings = ?c.values(), "Counting summary employees");

        let total = sqlx::query_scalar_with::<MySql, i64, _>(&sql, c.arguments(&[]))
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    async fn summary_employees(&self, filter: &TicketFilter, page: PageRequest) -> AppResult<Vec<EmployeeBrief>> {
        let c = ticket_conditions(filter);
        let sql = format!(
            "SELECT DISTINCT e.id, e.employee_code, e.first_name, e.last_name, e.email, e.department_id \
             {}{} ORDER BY e.first_name ASC, e.last_name ASC, e.id ASC LIMIT ? OFFSET ?",
            FROM_TICKETS,
            c.where_sql()
        );
        debug!(sql = %sql, page_index = page.page_index, page_size = page.page_size, "Fetching summary employees");

        let employees = sqlx::query_as_with::<MySql, EmployeeBrief, _>(
            &sql,
            c.arguments(&[SqlValue::U64(page.limit()), SqlValue::U64(page.offset())]),
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!(error = %e, sql = %sql, "Failed to fetch summary employees");
            e
        })?;

        Ok(employees)
    }

    async fn tickets_for_employees(&self, filter: &TicketFilter, employee_ids: &[u64]) -> AppResult<Vec<Ticket>> {
        let mut c = ticket_conditions(filter);
        c.push_in("t.employee_id", employee_ids);

        let sql = format!(
            "SELECT {} {}{} ORDER BY t.created_at DESC, t.id DESC",
            TICKET_COLUMNS,
            FROM_TICKETS,
            c.where_sql()
        );
        let rows = sqlx::query_as_with::<MySql, TicketRow, _>(&sql, c.arguments(&[]))
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Ticket::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn no_filters_means_no_where_clause() {
        assert_eq!(ticket_conditions(&TicketFilter::default()).where_sql(), "");
    }

    #[test]
    fn filters_reference_ticket_and_employee_aliases() {
        let filter = TicketFilter {
            employee_id: Some(5),
            ticket_type: Some(TicketType::EarlyLeave),
            date_from: NaiveDate::from_ymd_opt(2026, 1, 1),
            date_to: NaiveDate::from_ymd_opt(2026, 1, 31),
            search: None,
            department_id: Some(2),
        };
        let c = ticket_conditions(&filter);

        assert_eq!(
            c.where_sql(),
            " WHERE t.employee_id = ? AND t.ticket_type = ? AND t.created_at >= ? \
             AND t.created_at < ? AND e.department_id = ?"
        );
        let end = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        assert_eq!(c.values()[1], SqlValue::String("EARLY_LEAVE".into()));
        assert_eq!(c.values()[3], SqlValue::DateTime(end));
    }

    #[test]
    fn search_binds_like_patterns_and_exact_id() {
        let filter = TicketFilter {
            search: Some(" doe ".into()),
            ..Default::default()
        };
        let c = ticket_conditions(&filter);
        assert_eq!(c.values().len(), 6);
        assert_eq!(c.values()[0], SqlValue::String("%doe%".into()));
        assert_eq!(c.values()[5], SqlValue::String("doe".into()));
    }

    #[test]
    fn unknown_stored_type_reads_as_other() {
        assert_eq!(parse_type("SUSPENSION", "TKT-20260101-0001"), TicketType::Other);
        assert_eq!(parse_type("ABSENT", "TKT-20260101-0001"), TicketType::Absent);
    }
}
