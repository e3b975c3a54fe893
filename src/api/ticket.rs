use actix_web::{web, HttpResponse};

use crate::auth::auth::AuthUser;
use crate::model::ticket::{CreateTicket, TicketFilter};
use crate::state::AppState;
use crate::utils::pagination::PageQuery;

/// Create ticket
#[utoipa::path(
    post,
    path = "/api/tickets",
    request_body = CreateTicket,
    responses(
        (status = 201, description = "Ticket created with its employee", body = crate::model::ticket::TicketDetail),
        (status = 400, description = "Negative deduction"),
        (status = 404, description = "Employee missing or inactive"),
        (status = 409, description = "Ticket number taken by a concurrent request")
    ),
    tag = "Ticket",
    security(("bearer_auth" = []))
)]
pub async fn create_ticket(
    auth: AuthUser,
    state: web::Data<AppState>,
    payload: web::Json<CreateTicket>,
) -> actix_web::Result<HttpResponse> {
    auth.require_hr_or_admin()?;

    let ticket = state.tickets.create_ticket(payload.into_inner(), Some(auth.user_id)).await?;
    Ok(HttpResponse::Created().json(ticket))
}

/// List tickets
#[utoipa::path(
    get,
    path = "/api/tickets",
    params(TicketFilter, PageQuery),
    responses((status = 200, description = "Tickets, newest first", body = crate::model::ticket::TicketListResponse)),
    tag = "Ticket",
    security(("bearer_auth" = []))
)]
pub async fn list_tickets(
    auth: AuthUser,
    state: web::Data<AppState>,
    filter: web::Query<TicketFilter>,
    page: web::Query<PageQuery>,
) -> actix_web::Result<HttpResponse> {
    auth.require_hr_or_admin()?;

    let tickets = state.tickets.list_tickets(&filter, page.into_inner().into()).await?;
    Ok(HttpResponse::Ok().json(tickets))
}

/// Ticket summary per employee
///
/// Pages over employees, not tickets: `total` counts distinct employees with
/// at least one matching ticket.
#[utoipa::path(
    get,
    path = "/api/tickets/summary",
    params(TicketFilter, PageQuery),
    responses((status = 200, description = "One page of employee summaries", body = crate::model::ticket::TicketSummaryPage)),
    tag = "Ticket",
    security(("bearer_auth" = []))
)]
pub async fn ticket_summary(
    auth: AuthUser,
    state: web::Data<AppState>,
    filter: web::Query<TicketFilter>,
    page: web::Query<PageQuery>,
) -> actix_web::Result<HttpResponse> {
    auth.require_hr_or_admin()?;

    let summary = state.tickets.summary(&filter, page.into_inner().into()).await?;
    Ok(HttpResponse::Ok().json(summary))
}

/// Get ticket
#[utoipa::path(
    get,
    path = "/api/tickets/{id}",
    params(("id" = u64, Path, description = "Ticket id")),
    responses(
        (status = 200, description = "Ticket with its employee", body = crate::model::ticket::TicketDetail),
        (status = 404, description = "Ticket not found")
    ),
    tag = "Ticket",
    security(("bearer_auth" = []))
)]
pub async fn get_ticket(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<u64>,
) -> actix_web::Result<HttpResponse> {
    auth.require_hr_or_admin()?;

    let ticket = state.tickets.get_ticket(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ticket))
}
