pub mod number;
pub mod summary;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{info, instrument};

use crate::error::{AppError, AppResult};
use crate::model::ticket::{CreateTicket, NewTicket, TicketDetail, TicketFilter, TicketListResponse, TicketSummaryPage};
use crate::repository::TicketRepository;
use crate::utils::pagination::PageRequest;

#[derive(Clone)]
pub struct TicketService {
    repo: Arc<dyn TicketRepository>,
}

impl TicketService {
    pub fn new(repo: Arc<dyn TicketRepository>) -> Self {
        Self { repo }
    }

    pub async fn create_ticket(&self, input: CreateTicket, created_by: Option<u64>) -> AppResult<TicketDetail> {
        self.create_ticket_at(input, created_by, Utc::now()).await
    }

    /// Same as [`create_ticket`](Self::create_ticket) with an explicit clock.
    #[instrument(name = "create_ticket", skip(self, input), fields(employee_id = input.employee_id))]
    pub async fn create_ticket_at(
        &self,
        input: CreateTicket,
        created_by: Option<u64>,
        now: DateTime<Utc>,
    ) -> AppResult<TicketDetail> {
        if input.deduction_amount < Decimal::ZERO {
            return Err(AppError::validation("deduction_amount must not be negative"));
        }

        let new = NewTicket {
            employee_id: input.employee_id,
            ticket_type: input.ticket_type,
            deduction_amount: input.deduction_amount.round_dp(2),
            reason: input
                .reason
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty()),
            created_by,
        };

        let detail = self.repo.create(&new, now).await?;

        info!(
            ticket_number = %detail.ticket.ticket_number,
            ticket_type = %detail.ticket.ticket_type,
            "Ticket created"
        );
        Ok(detail)
    }

    pub async fn get_ticket(&self, id: u64) -> AppResult<TicketDetail> {
        self.repo
            .find(id)
            .await?
            .ok_or_else(|| AppError::not_found("Ticket not found"))
    }

    pub async fn list_tickets(&self, filter: &TicketFilter, page: PageRequest) -> AppResult<TicketListResponse> {
        let (data, total) = self.repo.list(filter, page).await?;
        Ok(TicketListResponse {
            data,
            page_index: page.page_index,
            page_size: page.page_size,
            total,
        })
    }

    #[instrument(name = "ticket_summary", skip(self, filter))]
    pub async fn summary(&self, filter: &TicketFilter, page: PageRequest) -> AppResult<TicketSummaryPage> {
        summary::summarize(self.repo.as_ref(), filter, page).await
    }
}
