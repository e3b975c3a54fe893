use actix_web::{web, HttpResponse};

use crate::agent::AgentRequest;
use crate::auth::auth::AuthUser;
use crate::state::AppState;

/// Run a free-text inventory command
///
/// Always answers 200; failures are reported with `status = "error"`.
#[utoipa::path(
    post,
    path = "/api/agent/command",
    request_body = AgentRequest,
    responses((status = 200, description = "Handler outcome", body = crate::agent::AgentResponse)),
    tag = "Agent",
    security(("bearer_auth" = []))
)]
pub async fn run_command(
    auth: AuthUser,
    state: web::Data<AppState>,
    payload: web::Json<AgentRequest>,
) -> HttpResponse {
    let response = state.agent.dispatch(&payload, Some(auth.user_id)).await;
    HttpResponse::Ok().json(response)
}
