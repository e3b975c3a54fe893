use actix_web::{web, HttpResponse};
use serde::Serialize;
use utoipa::ToSchema;

use crate::auth::auth::AuthUser;
use crate::model::inventory::{CreateReorder, ItemStock, ReorderRequest};
use crate::state::AppState;
use crate::utils::pagination::PageQuery;

#[derive(Serialize, ToSchema)]
pub struct ReorderCreated {
    pub item: ItemStock,
    pub reorder: ReorderRequest,
}

/// List items with stock
#[utoipa::path(
    get,
    path = "/api/inventory/items",
    params(PageQuery),
    responses((status = 200, description = "Items ordered by name", body = crate::model::inventory::ItemListResponse)),
    tag = "Inventory",
    security(("bearer_auth" = []))
)]
pub async fn list_items(
    _auth: AuthUser,
    state: web::Data<AppState>,
    page: web::Query<PageQuery>,
) -> actix_web::Result<HttpResponse> {
    let items = state.inventory.list(page.into_inner().into()).await?;
    Ok(HttpResponse::Ok().json(items))
}

/// Items at or below reorder level
#[utoipa::path(
    get,
    path = "/api/inventory/low-stock",
    responses((status = 200, description = "Low stock items", body = [crate::model::inventory::LowStockItem])),
    tag = "Inventory",
    security(("bearer_auth" = []))
)]
pub async fn low_stock(_auth: AuthUser, state: web::Data<AppState>) -> actix_web::Result<HttpResponse> {
    let items = state.inventory.low_stock().await?;
    Ok(HttpResponse::Ok().json(items))
}

/// Create reorder request
#[utoipa::path(
    post,
    path = "/api/inventory/reorders",
    request_body = CreateReorder,
    responses(
        (status = 201, description = "Pending reorder opened", body = ReorderCreated),
        (status = 404, description = "Unknown item"),
        (status = 409, description = "A reorder is already pending")
    ),
    tag = "Inventory",
    security(("bearer_auth" = []))
)]
pub async fn create_reorder(
    auth: AuthUser,
    state: web::Data<AppState>,
    payload: web::Json<CreateReorder>,
) -> actix_web::Result<HttpResponse> {
    auth.require_hr_or_admin()?;

    let CreateReorder { item, quantity, note } = payload.into_inner();
    let (item, reorder) = state
        .inventory
        .reorder(&item, quantity, Some(auth.user_id), note)
        .await?;
    Ok(HttpResponse::Created().json(ReorderCreated { item, reorder }))
}
