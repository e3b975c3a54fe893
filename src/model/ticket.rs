use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::{IntoParams, ToSchema};

use crate::model::employee::EmployeeBrief;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    ToSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum TicketType {
    Late,
    Absent,
    EarlyLeave,
    Misconduct,
    Other,
}

/// Ticket row as stored.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "id": 7,
    "ticket_number": "TKT-20260115-0003",
    "employee_id": 1,
    "ticket_type": "LATE",
    "deduction_amount": "150.00",
    "reason": "Arrived 40 minutes late",
    "created_by": 2,
    "created_at": "2026-01-15T09:41:00Z"
}))]
pub struct Ticket {
    pub id: u64,
    #[schema(example = "TKT-20260115-0003")]
    pub ticket_number: String,
    pub employee_id: u64,
    pub ticket_type: TicketType,
    #[schema(value_type = String, example = "150.00")]
    pub deduction_amount: Decimal,
    pub reason: Option<String>,
    pub created_by: Option<u64>,
    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
}

/// Ticket with its employee relation loaded.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TicketDetail {
    #[serde(flatten)]
    pub ticket: Ticket,
    pub employee: EmployeeBrief,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateTicket {
    #[schema(example = 1)]
    pub employee_id: u64,
    pub ticket_type: TicketType,
    #[schema(value_type = String, example = "150.00")]
    pub deduction_amount: Decimal,
    #[schema(example = "Arrived 40 minutes late")]
    pub reason: Option<String>,
}

/// What the store persists. Number and timestamp are decided by the caller.
#[derive(Debug, Clone)]
pub struct NewTicket {
    pub employee_id: u64,
    pub ticket_type: TicketType,
    pub deduction_amount: Decimal,
    pub reason: Option<String>,
    pub created_by: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TicketFilter {
    /// Only tickets for this employee
    pub employee_id: Option<u64>,
    pub ticket_type: Option<TicketType>,
    /// Inclusive start day, `YYYY-MM-DD`
    #[param(value_type = Option<String>, format = "date")]
    pub date_from: Option<NaiveDate>,
    /// Inclusive end day, `YYYY-MM-DD`
    #[param(value_type = Option<String>, format = "date")]
    pub date_to: Option<NaiveDate>,
    /// Matches employee first/last/full name, email, code or exact id
    pub search: Option<String>,
    pub department_id: Option<u64>,
}

impl TicketFilter {
    /// Lower bound on `created_at`
    pub fn created_from(&self) -> Option<NaiveDateTime> {
        self.date_from.map(|d| d.and_time(NaiveTime::MIN))
    }

    /// Exclusive upper bound on `created_at`: midnight after `date_to`
    pub fn created_before(&self) -> Option<NaiveDateTime> {
        self.date_to
            .and_then(|d| d.succ_opt())
            .map(|d| d.and_time(NaiveTime::MIN))
    }

    pub fn search_term(&self) -> Option<&str> {
        self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    /// In-process evaluation of the same predicate the SQL backend builds.
    pub fn matches(&self, ticket: &Ticket, employee: &EmployeeBrief) -> bool {
        if self.employee_id.is_some_and(|id| id != ticket.employee_id) {
            return false;
        }
        if self.ticket_type.is_some_and(|t| t != ticket.ticket_type) {
            return false;
        }
        let created = ticket.created_at.naive_utc();
        if self.created_from().is_some_and(|from| created < from) {
            return false;
        }
        if self.created_before().is_some_and(|before| created >= before) {
            return false;
        }
        if self.department_id.is_some_and(|d| d != employee.department_id) {
            return false;
        }
        match self.search_term() {
            Some(term) => search_matches(term, employee),
            None => true,
        }
    }
}

fn search_matches(term: &str, employee: &EmployeeBrief) -> bool {
    let needle = term.to_lowercase();
    let contains = |s: &str| s.to_lowercase().contains(&needle);

    contains(&employee.first_name)
        || contains(&employee.last_name)
        || contains(&employee.full_name())
        || contains(&employee.email)
        || contains(&employee.employee_code)
        || employee.id.to_string() == term
}

/// Per-employee aggregate over the tickets matching a [`TicketFilter`].
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EmployeeTicketSummary {
    pub employee: EmployeeBrief,
    pub total_tickets: i64,
    #[schema(value_type = String, example = "450.00")]
    pub total_deduction: Decimal,
    pub late_count: i64,
    pub absent_count: i64,
    pub early_leave_count: i64,
    /// Everything that is not LATE, ABSENT or EARLY_LEAVE
    pub other_count: i64,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub latest_ticket_at: Option<DateTime<Utc>>,
    /// Newest first, at most five
    pub recent_tickets: Vec<Ticket>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TicketSummaryPage {
    pub data: Vec<EmployeeTicketSummary>,
    #[schema(example = 1)]
    pub page_index: u32,
    #[schema(example = 10)]
    pub page_size: u32,
    /// Distinct employees with at least one matching ticket
    #[schema(example = 2)]
    pub total: i64,
    #[schema(example = 1)]
    pub total_pages: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TicketListResponse {
    pub data: Vec<TicketDetail>,
    #[schema(example = 1)]
    pub page_index: u32,
    #[schema(example = 10)]
    pub page_size: u32,
    #[schema(example = 25)]
    pub total: i64,
}
