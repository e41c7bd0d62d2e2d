use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, patch},
};
use uuid::Uuid;

use crate::{
    dto::inventory::{CreateItemRequest, InventoryList, RestockRequest, UpdateItemRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::InventoryItem,
    response::ApiResponse,
    routes::params::{InventoryQuery, LowStockQuery},
    services::inventory_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_items).post(create_item))
        .route("/low-stock", get(list_low_stock))
        .route("/{id}", get(get_item).put(update_item).delete(delete_item))
        .route("/{id}/restock", patch(restock_item))
}

#[utoipa::path(
    get,
    path = "/api/inventory",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("kind" = Option<String>, Query, description = "fuel or shop"),
        ("q" = Option<String>, Query, description = "Search by name"),
        ("sort_by" = Option<String>, Query, description = "created_at, name, unit_price"),
        ("sort_order" = Option<String>, Query, description = "Sort order: asc, desc")
    ),
    responses(
        (status = 200, description = "List inventory items", body = ApiResponse<InventoryList>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Inventory"
)]
pub async fn list_items(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<InventoryQuery>,
) -> AppResult<Json<ApiResponse<InventoryList>>> {
    let resp = inventory_service::list_items(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/inventory/{id}",
    params(("id" = Uuid, Path, description = "Inventory item ID")),
    responses(
        (status = 200, description = "Get inventory item", body = ApiResponse<InventoryItem>),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Inventory"
)]
pub async fn get_item(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<InventoryItem>>> {
    let resp = inventory_service::get_item(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/inventory",
    request_body = CreateItemRequest,
    responses(
        (status = 200, description = "Create inventory item", body = ApiResponse<InventoryItem>),
        (status = 400, description = "Invalid item"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Item already exists")
    ),
    security(("bearer_auth" = [])),
    tag = "Inventory"
)]
pub async fn create_item(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateItemRequest>,
) -> AppResult<Json<ApiResponse<InventoryItem>>> {
    let resp = inventory_service::create_item(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/inventory/{id}",
    params(("id" = Uuid, Path, description = "Inventory item ID")),
    request_body = UpdateItemRequest,
    responses(
        (status = 200, description = "Updated inventory item", body = ApiResponse<InventoryItem>),
        (status = 400, description = "Invalid quantities"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Inventory"
)]
pub async fn update_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateItemRequest>,
) -> AppResult<Json<ApiResponse<InventoryItem>>> {
    let resp = inventory_service::update_item(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/inventory/{id}/restock",
    params(("id" = Uuid, Path, description = "Inventory item ID")),
    request_body = RestockRequest,
    responses(
        (status = 200, description = "Restocked inventory item", body = ApiResponse<InventoryItem>),
        (status = 400, description = "Invalid quantity"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Inventory"
)]
pub async fn restock_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<RestockRequest>,
) -> AppResult<Json<ApiResponse<InventoryItem>>> {
    let resp = inventory_service::restock_item(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/inventory/{id}",
    params(("id" = Uuid, Path, description = "Inventory item ID")),
    responses(
        (status = 200, description = "Deleted inventory item"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Inventory"
)]
pub async fn delete_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = inventory_service::delete_item(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/inventory/low-stock",
    params(
        ("threshold" = Option<i64>, Query, description = "Available below this is low, default from config"),
        ("kind" = Option<String>, Query, description = "fuel or shop"),
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20")
    ),
    responses(
        (status = 200, description = "List low stock items", body = ApiResponse<InventoryList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Inventory"
)]
pub async fn list_low_stock(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<LowStockQuery>,
) -> AppResult<Json<ApiResponse<InventoryList>>> {
    let resp = inventory_service::list_low_stock(&state, query).await?;
    Ok(Json(resp))
}
