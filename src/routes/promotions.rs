use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::promotions::{
        AppliedPromo, ApplyPromoRequest, CreatePromoRequest, PromoList, UpdatePromoRequest,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::PromoCode,
    response::ApiResponse,
    routes::params::Pagination,
    services::promo_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_promos).post(create_promo))
        .route("/apply", post(apply_promo))
        .route("/{id}", get(get_promo).put(update_promo).delete(delete_promo))
}

#[utoipa::path(
    post,
    path = "/api/promotions/apply",
    request_body = ApplyPromoRequest,
    responses(
        (status = 200, description = "Discounted total; consumes one use", body = ApiResponse<AppliedPromo>),
        (status = 400, description = "Invalid or expired promo code")
    ),
    security(("bearer_auth" = [])),
    tag = "Promotions"
)]
pub async fn apply_promo(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<ApplyPromoRequest>,
) -> AppResult<Json<ApiResponse<AppliedPromo>>> {
    let resp = promo_service::apply_promo(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/promotions",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20")
    ),
    responses(
        (status = 200, description = "List promo codes", body = ApiResponse<PromoList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Promotions"
)]
pub async fn list_promos(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<PromoList>>> {
    let resp = promo_service::list_promos(&state, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/promotions/{id}",
    params(("id" = Uuid, Path, description = "Promo code ID")),
    responses(
        (status = 200, description = "Get promo code", body = ApiResponse<PromoCode>),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Promotions"
)]
pub async fn get_promo(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<PromoCode>>> {
    let resp = promo_service::get_promo(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/promotions",
    request_body = CreatePromoRequest,
    responses(
        (status = 200, description = "Create promo code", body = ApiResponse<PromoCode>),
        (status = 400, description = "Invalid promo code"),
        (status = 409, description = "Code already exists")
    ),
    security(("bearer_auth" = [])),
    tag = "Promotions"
)]
pub async fn create_promo(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreatePromoRequest>,
) -> AppResult<Json<ApiResponse<PromoCode>>> {
    let resp = promo_service::create_promo(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/promotions/{id}",
    params(("id" = Uuid, Path, description = "Promo code ID")),
    request_body = UpdatePromoRequest,
    responses(
        (status = 200, description = "Updated promo code", body = ApiResponse<PromoCode>),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Promotions"
)]
pub async fn update_promo(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePromoRequest>,
) -> AppResult<Json<ApiResponse<PromoCode>>> {
    let resp = promo_service::update_promo(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/promotions/{id}",
    params(("id" = Uuid, Path, description = "Promo code ID")),
    responses(
        (status = 200, description = "Deleted promo code"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Promotions"
)]
pub async fn delete_promo(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = promo_service::delete_promo(&state, &user, id).await?;
    Ok(Json(resp))
}
