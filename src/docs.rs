use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::agent::{AgentAction, AgentRequest, AgentResponse, AgentStatus, Entity, Intent};
use crate::api::inventory::ReorderCreated;
use crate::model::employee::EmployeeBrief;
use crate::model::holiday::{CreateHoliday, Holiday, HolidayCheck, HolidayListResponse, UpdateHoliday};
use crate::model::inventory::{
    CreateReorder, Item, ItemListResponse, ItemStock, LowStockItem, ReorderRequest, ReorderStatus, StockLevel,
};
use crate::model::ticket::{
    CreateTicket, EmployeeTicketSummary, Ticket, TicketDetail, TicketListResponse, TicketSummaryPage, TicketType,
};
use crate::model::user::{LoginRequest, TokenPair};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HRM Operations API",
        version = "1.0.0",
        description = r#"
## HR & Inventory Operations

Back office API for day to day HR and stock keeping.

### Key Features
- **Holidays**
  - Calendar CRUD with one active holiday per date, soft delete, recurring dates
- **Tickets**
  - Disciplinary/attendance tickets with payroll deductions
  - Per-employee summaries paginated over employees
- **Inventory**
  - Stock per location, low stock report, reorder requests
- **Agent**
  - Free-text commands routed to inventory actions

### Security
All endpoints except `/auth/*` require a **JWT Bearer** access token.
Mutations and ticket reads are limited to **Admin** and **HR**.

### Response Format
- JSON responses; errors as `{"message": "..."}`
- `page_index` (1-based) and `page_size` on list endpoints
"#,
    ),
    paths(
        crate::auth::handlers::login,
        crate::auth::handlers::refresh_token,
        crate::auth::handlers::logout,

        crate::api::holiday::list_holidays,
        crate::api::holiday::create_holiday,
        crate::api::holiday::check_holiday,
        crate::api::holiday::get_holiday,
        crate::api::holiday::update_holiday,
        crate::api::holiday::delete_holiday,

        crate::api::ticket::create_ticket,
        crate::api::ticket::list_tickets,
        crate::api::ticket::ticket_summary,
        crate::api::ticket::get_ticket,

        crate::api::inventory::list_items,
        crate::api::inventory::low_stock,
        crate::api::inventory::create_reorder,

        crate::api::agent::run_command
    ),
    components(
        schemas(
            LoginRequest,
            TokenPair,
            Holiday,
            HolidayListResponse,
            CreateHoliday,
            UpdateHoliday,
            HolidayCheck,
            EmployeeBrief,
            TicketType,
            Ticket,
            TicketDetail,
            CreateTicket,
            EmployeeTicketSummary,
            TicketSummaryPage,
            TicketListResponse,
            Item,
            StockLevel,
            ItemStock,
            LowStockItem,
            ReorderStatus,
            ReorderRequest,
            CreateReorder,
            ReorderCreated,
            ItemListResponse,
            Entity,
            AgentRequest,
            AgentAction,
            AgentStatus,
            Intent,
            AgentResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Login and token rotation"),
        (name = "Holiday", description = "Holiday calendar APIs"),
        (name = "Ticket", description = "Ticket and deduction APIs"),
        (name = "Inventory", description = "Stock and reorder APIs"),
        (name = "Agent", description = "Free-text command API"),
    )
)]
pub struct ApiDoc;
