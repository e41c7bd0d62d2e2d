use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, patch},
};
use uuid::Uuid;

use crate::{
    dto::staff::{
        AttendanceList, CreateLeaveRequest, DecideLeaveRequest, LeaveList, MarkAttendanceRequest,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::{Attendance, LeaveRequest},
    response::ApiResponse,
    routes::params::{AttendanceQuery, LeaveQuery},
    services::staff_service,
    state::AppState,
};

pub fn attendance_router() -> Router<AppState> {
    Router::new().route("/", get(list_attendance).post(mark_attendance))
}

pub fn leave_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_leaves).post(request_leave))
        .route("/{id}", patch(decide_leave))
}

#[utoipa::path(
    post,
    path = "/api/attendance",
    request_body = MarkAttendanceRequest,
    responses(
        (status = 200, description = "Record attendance for a day", body = ApiResponse<Attendance>),
        (status = 400, description = "Invalid shift times"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Staff"
)]
pub async fn mark_attendance(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<MarkAttendanceRequest>,
) -> AppResult<Json<ApiResponse<Attendance>>> {
    let resp = staff_service::mark_attendance(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/attendance",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("user_id" = Option<String>, Query, description = "Admins and managers only"),
        ("from" = Option<String>, Query, description = "First day, YYYY-MM-DD"),
        ("to" = Option<String>, Query, description = "Last day, YYYY-MM-DD")
    ),
    responses((status = 200, description = "List attendance", body = ApiResponse<AttendanceList>)),
    security(("bearer_auth" = [])),
    tag = "Staff"
)]
pub async fn list_attendance(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<AttendanceQuery>,
) -> AppResult<Json<ApiResponse<AttendanceList>>> {
    let resp = staff_service::list_attendance(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/leaves",
    request_body = CreateLeaveRequest,
    responses(
        (status = 200, description = "Request leave", body = ApiResponse<LeaveRequest>),
        (status = 400, description = "Invalid dates or reason")
    ),
    security(("bearer_auth" = [])),
    tag = "Staff"
)]
pub async fn request_leave(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateLeaveRequest>,
) -> AppResult<Json<ApiResponse<LeaveRequest>>> {
    let resp = staff_service::request_leave(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/leaves",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("status" = Option<String>, Query, description = "pending, approved, rejected")
    ),
    responses((status = 200, description = "List leave requests", body = ApiResponse<LeaveList>)),
    security(("bearer_auth" = [])),
    tag = "Staff"
)]
pub async fn list_leaves(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<LeaveQuery>,
) -> AppResult<Json<ApiResponse<LeaveList>>> {
    let resp = staff_service::list_leaves(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/leaves/{id}",
    params(("id" = Uuid, Path, description = "Leave request ID")),
    request_body = DecideLeaveRequest,
    responses(
        (status = 200, description = "Approve or reject leave", body = ApiResponse<LeaveRequest>),
        (status = 400, description = "Already decided"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Staff"
)]
pub async fn decide_leave(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<DecideLeaveRequest>,
) -> AppResult<Json<ApiResponse<LeaveRequest>>> {
    let resp = staff_service::decide_leave(&state, &user, id, payload).await?;
    Ok(Json(resp))
}
