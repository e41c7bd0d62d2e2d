use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::bills::{BillList, BillWithItems, CreateBillRequest, UpdateBillRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    routes::params::BillListQuery,
    services::bill_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_bills).post(create_bill))
        .route("/{id}", get(get_bill).put(update_bill).delete(delete_bill))
}

#[utoipa::path(
    post,
    path = "/api/bills",
    request_body = CreateBillRequest,
    responses(
        (status = 200, description = "Create a bill", body = ApiResponse<BillWithItems>),
        (status = 400, description = "Invalid lines or promo code")
    ),
    security(("bearer_auth" = [])),
    tag = "Bills"
)]
pub async fn create_bill(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateBillRequest>,
) -> AppResult<Json<ApiResponse<BillWithItems>>> {
    let resp = bill_service::create_bill(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/bills",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("q" = Option<String>, Query, description = "Search by customer name"),
        ("sort_order" = Option<String>, Query, description = "Sort order: asc, desc")
    ),
    responses(
        (status = 200, description = "List bills", body = ApiResponse<BillList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Bills"
)]
pub async fn list_bills(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<BillListQuery>,
) -> AppResult<Json<ApiResponse<BillList>>> {
    let resp = bill_service::list_bills(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/bills/{id}",
    params(("id" = Uuid, Path, description = "Bill ID")),
    responses(
        (status = 200, description = "Bill with items", body = ApiResponse<BillWithItems>),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Bills"
)]
pub async fn get_bill(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<BillWithItems>>> {
    let resp = bill_service::get_bill(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/bills/{id}",
    params(("id" = Uuid, Path, description = "Bill ID")),
    request_body = UpdateBillRequest,
    responses(
        (status = 200, description = "Updated bill", body = ApiResponse<BillWithItems>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Bills"
)]
pub async fn update_bill(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateBillRequest>,
) -> AppResult<Json<ApiResponse<BillWithItems>>> {
    let resp = bill_service::update_bill(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/bills/{id}",
    params(("id" = Uuid, Path, description = "Bill ID")),
    responses(
        (status = 200, description = "Deleted bill"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Bills"
)]
pub async fn delete_bill(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = bill_service::delete_bill(&state, &user, id).await?;
    Ok(Json(resp))
}
