//! Employee-level ticket summaries.
//!
//! Pagination runs over employees, never over tickets: a page of size N holds
//! N employees no matter how many tickets each of them has, and `total` is the
//! number of distinct employees with a matching ticket.

use std::collections::HashMap;

use rust_decimal::Decimal;
use tracing::debug;

use crate::error::AppResult;
use crate::model::employee::EmployeeBrief;
use crate::model::ticket::{EmployeeTicketSummary, Ticket, TicketFilter, TicketSummaryPage, TicketType};
use crate::repository::TicketRepository;
use crate::utils::pagination::PageRequest;

pub const RECENT_TICKET_LIMIT: usize = 5;

/// Folds one employee's matching tickets into a summary.
///
/// `tickets` may come in any order; the preview is re-sorted newest first.
pub fn summarize_employee(employee: EmployeeBrief, mut tickets: Vec<Ticket>) -> EmployeeTicketSummary {
    tickets.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

    let mut late = 0;
    let mut absent = 0;
    let mut early_leave = 0;
    let mut total_deduction = Decimal::ZERO;

    for ticket in &tickets {
        total_deduction += ticket.deduction_amount;
        match ticket.ticket_type {
            TicketType::Late => late += 1,
            TicketType::Absent => absent += 1,
            TicketType::EarlyLeave => early_leave += 1,
            TicketType::Misconduct | TicketType::Other => {}
        }
    }

    let total = tickets.len() as i64;
    let latest_ticket_at = tickets.first().map(|t| t.created_at);
    tickets.truncate(RECENT_TICKET_LIMIT);

    EmployeeTicketSummary {
        employee,
        total_tickets: total,
        total_deduction,
        late_count: late,
        absent_count: absent,
        early_leave_count: early_leave,
        other_count: total - late - absent - early_leave,
        latest_ticket_at,
        recent_tickets: tickets,
    }
}

/// Builds one page of employee summaries from the store.
pub async fn summarize(
    repo: &dyn TicketRepository,
    filter: &TicketFilter,
    page: PageRequest,
) -> AppResult<TicketSummaryPage> {
    let total = repo.count_summary_employees(filter).await?;
    let employees = repo.summary_employees(filter, page).await?;

    let ids: Vec<u64> = employees.iter().map(|e| e.id).collect();
    let tickets = if ids.is_empty() {
        Vec::new()
    } else {
        repo.tickets_for_employees(filter, &ids).await?
    };

    let mut by_employee: HashMap<u64, Vec<Ticket>> = HashMap::with_capacity(ids.len());
    for ticket in tickets {
        by_employee.entry(ticket.employee_id).or_default().push(ticket);
    }

    let data: Vec<EmployeeTicketSummary> = employees
        .into_iter()
        .map(|employee| {
            let tickets = by_employee.remove(&employee.id).unwrap_or_default();
            summarize_employee(employee, tickets)
        })
        .collect();

    debug!(
        total,
        page_index = page.page_index,
        page_size = page.page_size,
        returned = data.len(),
        "Built ticket summary page"
    );

    Ok(TicketSummaryPage {
        data,
        page_index: page.page_index,
        page_size: page.page_size,
        total,
        total_pages: page.total_pages(total),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn employee() -> EmployeeBrief {
        EmployeeBrief {
            id: 1,
            employee_code: "EMP-001".into(),
            first_name: "John".into(),
            last_name: "Doe".into(),
            email: "john@company.com".into(),
            department_id: 10,
        }
    }

    fn ticket(id: u64, ticket_type: TicketType, cents: i64, minutes: i64) -> Ticket {
        let base = Utc.with_ymd_and_hms(2026, 1, 15, 9, 0, 0).unwrap();
        Ticket {
            id,
            ticket_number: format!("TKT-20260115-{:04}", id),
            employee_id: 1,
            ticket_type,
            deduction_amount: Decimal::new(cents, 2),
            reason: None,
            created_by: None,
            created_at: base + Duration::minutes(minutes),
        }
    }

    #[test]
    fn counts_by_type_with_other_as_remainder() {
        let tickets = vec![
            ticket(1, TicketType::Late, 1000, 0),
            ticket(2, TicketType::Late, 1000, 1),
            ticket(3, TicketType::Absent, 5000, 2),
            ticket(4, TicketType::EarlyLeave, 2500, 3),
            ticket(5, TicketType::Misconduct, 7500, 4),
            ticket(6, TicketType::Other, 0, 5),
        ];
        let s = summarize_employee(employee(), tickets);

        assert_eq!(s.total_tickets, 6);
        assert_eq!(s.late_count, 2);
        assert_eq!(s.absent_count, 1);
        assert_eq!(s.early_leave_count, 1);
        assert_eq!(s.other_count, 2);
        assert_eq!(s.total_deduction, Decimal::new(17000, 2));
    }

    #[test]
    fn preview_is_newest_five() {
        let tickets: Vec<Ticket> = (1..=8)
            .map(|i| ticket(i, TicketType::Late, 100, i as i64))
            .collect();
        let s = summarize_employee(employee(), tickets);

        assert_eq!(s.recent_tickets.len(), RECENT_TICKET_LIMIT);
        let ids: Vec<u64> = s.recent_tickets.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![8, 7, 6, 5, 4]);
        assert_eq!(s.latest_ticket_at, Some(s.recent_tickets[0].created_at));
        assert_eq!(s.total_tickets, 8);
    }

    #[test]
    fn empty_ticket_list_yields_zeroes() {
        let s = summarize_employee(employee(), Vec::new());
        assert_eq!(s.total_tickets, 0);
        assert_eq!(s.other_count, 0);
        assert_eq!(s.total_deduction, Decimal::ZERO);
        assert!(s.latest_ticket_at.is_none());
    }
}
