use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};

use crate::{
    dto::sales::{RecordSaleRequest, SaleList, SalesSummary},
    error::AppResult,
    middleware::auth::AuthUser,
    models::SaleRecord,
    response::ApiResponse,
    routes::params::SaleListQuery,
    services::sales_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_sales).post(record_sale))
        .route("/summary", get(sales_summary))
}

#[utoipa::path(
    post,
    path = "/api/sales",
    request_body = RecordSaleRequest,
    responses(
        (status = 200, description = "Record a fuel or shop sale", body = ApiResponse<SaleRecord>),
        (status = 400, description = "Invalid quantity or insufficient stock"),
        (status = 404, description = "Item not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Sales"
)]
pub async fn record_sale(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<RecordSaleRequest>,
) -> AppResult<Json<ApiResponse<SaleRecord>>> {
    let resp = sales_service::record_sale(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/sales",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("kind" = Option<String>, Query, description = "fuel or shop"),
        ("item_id" = Option<String>, Query, description = "Only sales of this item")
    ),
    responses(
        (status = 200, description = "List sales, newest first", body = ApiResponse<SaleList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Sales"
)]
pub async fn list_sales(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<SaleListQuery>,
) -> AppResult<Json<ApiResponse<SaleList>>> {
    let resp = sales_service::list_sales(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/sales/summary",
    responses(
        (status = 200, description = "Sales totals per item kind", body = ApiResponse<SalesSummary>)
    ),
    security(("bearer_auth" = [])),
    tag = "Sales"
)]
pub async fn sales_summary(
    State(state): State<AppState>,
    _user: AuthUser,
) -> AppResult<Json<ApiResponse<SalesSummary>>> {
    let resp = sales_service::sales_summary(&state).await?;
    Ok(Json(resp))
}
