use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::staff::{
        AttendanceList, CreateLeaveRequest, DecideLeaveRequest, LeaveList, MarkAttendanceRequest,
    },
    entity::{
        attendance::{
            ActiveModel as AttendanceActive, Column as AttendanceCol, Entity as AttendanceRecords,
            Model as AttendanceModel,
        },
        leave_requests::{
            ActiveModel as LeaveActive, Column as LeaveCol, Entity as LeaveRequests,
            Model as LeaveModel,
        },
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_any_role, ensure_staff_lead},
    models::{Attendance, LeaveRequest, LeaveStatus, Role},
    response::{ApiResponse, Meta},
    routes::params::{AttendanceQuery, LeaveQuery},
    state::AppState,
};

const STAFF: [Role; 3] = [Role::Admin, Role::Manager, Role::Employee];

pub fn validate_shift(
    check_in: Option<DateTime<Utc>>,
    check_out: Option<DateTime<Utc>>,
) -> AppResult<()> {
    if let (Some(start), Some(end)) = (check_in, check_out) {
        if end < start {
            return Err(AppError::BadRequest("check_out is before check_in".into()));
        }
    }
    Ok(())
}

/// Only pending requests can be decided, and only into a final state.
pub fn decide_leave_status(current: LeaveStatus, next: LeaveStatus) -> AppResult<LeaveStatus> {
    if next == LeaveStatus::Pending {
        return Err(AppError::BadRequest(
            "Decision must be approved or rejected".into(),
        ));
    }
    if current != LeaveStatus::Pending {
        return Err(AppError::BadRequest("Leave request already decided".into()));
    }
    Ok(next)
}

/// Whose records a caller may touch: their own, or anyone's for admins and managers.
fn target_user(user: &AuthUser, requested: Option<Uuid>) -> AppResult<Uuid> {
    match requested {
        Some(id) if id != user.user_id => {
            ensure_staff_lead(user)?;
            Ok(id)
        }
        _ => Ok(user.user_id),
    }
}

pub async fn mark_attendance(
    state: &AppState,
    user: &AuthUser,
    payload: MarkAttendanceRequest,
) -> AppResult<ApiResponse<Attendance>> {
    ensure_any_role(user, &STAFF)?;
    let user_id = target_user(user, payload.user_id)?;
    validate_shift(payload.check_in, payload.check_out)?;
    let work_date = payload.work_date.unwrap_or_else(|| Utc::now().date_naive());

    let txn = state.orm.begin().await?;
    let existing = AttendanceRecords::find()
        .filter(AttendanceCol::UserId.eq(user_id))
        .filter(AttendanceCol::WorkDate.eq(work_date))
        .lock(LockType::Update)
        .one(&txn)
        .await?;

    let record = match existing {
        Some(existing) => {
            let check_in = payload
                .check_in
                .or_else(|| existing.check_in.map(|t| t.with_timezone(&Utc)));
            let check_out = payload
                .check_out
                .or_else(|| existing.check_out.map(|t| t.with_timezone(&Utc)));
            validate_shift(check_in, check_out)?;

            let mut active: AttendanceActive = existing.into();
            active.status = Set(payload.status);
            active.check_in = Set(check_in.map(Into::into));
            active.check_out = Set(check_out.map(Into::into));
            active.update(&txn).await?
        }
        None => {
            AttendanceActive {
                id: Set(Uuid::new_v4()),
                user_id: Set(user_id),
                work_date: Set(work_date),
                status: Set(payload.status),
                check_in: Set(payload.check_in.map(Into::into)),
                check_out: Set(payload.check_out.map(Into::into)),
                created_at: NotSet,
            }
            .insert(&txn)
            .await?
        }
    };
    txn.commit().await?;

    audit::record(
        &state.pool,
        user.user_id,
        "attendance_mark",
        "attendance",
        serde_json::json!({ "attendance_id": record.id, "user_id": user_id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Attendance recorded",
        attendance_from_entity(record),
        Some(Meta::empty()),
    ))
}

pub async fn list_attendance(
    state: &AppState,
    user: &AuthUser,
    query: AttendanceQuery,
) -> AppResult<ApiResponse<AttendanceList>> {
    ensure_any_role(user, &STAFF)?;
    let (page, limit, offset) = query.pagination().normalize();

    let mut condition = Condition::all();
    if user.role.is_staff_lead() {
        if let Some(user_id) = query.user_id {
            condition = condition.add(AttendanceCol::UserId.eq(user_id));
        }
    } else {
        condition = condition.add(AttendanceCol::UserId.eq(user.user_id));
    }
    if let Some(from) = query.from {
        condition = condition.add(AttendanceCol::WorkDate.gte(from));
    }
    if let Some(to) = query.to {
        condition = condition.add(AttendanceCol::WorkDate.lte(to));
    }

    let finder = AttendanceRecords::find()
        .filter(condition)
        .order_by_desc(AttendanceCol::WorkDate);
    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(attendance_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Attendance",
        AttendanceList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn request_leave(
    state: &AppState,
    user: &AuthUser,
    payload: CreateLeaveRequest,
) -> AppResult<ApiResponse<LeaveRequest>> {
    ensure_any_role(user, &STAFF)?;
    if payload.end_date < payload.start_date {
        return Err(AppError::BadRequest("end_date is before start_date".into()));
    }
    let reason = payload.reason.trim().to_string();
    if reason.is_empty() {
        return Err(AppError::BadRequest("A reason is required".into()));
    }

    let leave = LeaveActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        start_date: Set(payload.start_date),
        end_date: Set(payload.end_date),
        reason: Set(reason),
        status: Set(LeaveStatus::Pending),
        decided_by: Set(None),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.pool,
        user.user_id,
        "leave_request",
        "leave_requests",
        serde_json::json!({ "leave_id": leave.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Leave requested",
        leave_from_entity(leave),
        Some(Meta::empty()),
    ))
}

pub async fn list_leaves(
    state: &AppState,
    user: &AuthUser,
    query: LeaveQuery,
) -> AppResult<ApiResponse<LeaveList>> {
    ensure_any_role(user, &STAFF)?;
    let (page, limit, offset) = query.pagination().normalize();

    let mut condition = Condition::all();
    if !user.role.is_staff_lead() {
        condition = condition.add(LeaveCol::UserId.eq(user.user_id));
    }
    if let Some(status) = query.status {
        condition = condition.add(LeaveCol::Status.eq(status));
    }

    let finder = LeaveRequests::find()
        .filter(condition)
        .order_by_desc(LeaveCol::CreatedAt);
    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(leave_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Leave requests",
        LeaveList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn decide_leave(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: DecideLeaveRequest,
) -> AppResult<ApiResponse<LeaveRequest>> {
    ensure_staff_lead(user)?;

    let txn = state.orm.begin().await?;
    let existing = LeaveRequests::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;
    let status = decide_leave_status(existing.status, payload.status)?;

    let mut active: LeaveActive = existing.into();
    active.status = Set(status);
    active.decided_by = Set(Some(user.user_id));
    active.updated_at = Set(Utc::now().into());
    let leave = active.update(&txn).await?;
    txn.commit().await?;

    audit::record(
        &state.pool,
        user.user_id,
        "leave_decide",
        "leave_requests",
        serde_json::json!({ "leave_id": leave.id, "status": leave.status }),
    )
    .await;

    Ok(ApiResponse::success(
        "Leave request updated",
        leave_from_entity(leave),
        Some(Meta::empty()),
    ))
}

fn attendance_from_entity(model: AttendanceModel) -> Attendance {
    Attendance {
        id: model.id,
        user_id: model.user_id,
        work_date: model.work_date,
        status: model.status,
        check_in: model.check_in.map(|t| t.with_timezone(&Utc)),
        check_out: model.check_out.map(|t| t.with_timezone(&Utc)),
        created_at: model.created_at.with_timezone(&Utc),
    }
}

fn leave_from_entity(model: LeaveModel) -> LeaveRequest {
    LeaveRequest {
        id: model.id,
        user_id: model.user_id,
        start_date: model.start_date,
        end_date: model.end_date,
        reason: model.reason,
        status: model.status,
        decided_by: model.decided_by,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn user(role: Role) -> AuthUser {
        AuthUser {
            user_id: Uuid::new_v4(),
            email: "attendant@station.test".into(),
            role,
        }
    }

    #[test]
    fn shift_must_end_after_it_starts() {
        let start = Utc::now();
        assert!(validate_shift(Some(start), Some(start + Duration::hours(8))).is_ok());
        assert!(validate_shift(Some(start), Some(start - Duration::minutes(1))).is_err());
        assert!(validate_shift(None, Some(start)).is_ok());
    }

    #[test]
    fn leave_decisions_are_final() {
        assert_eq!(
            decide_leave_status(LeaveStatus::Pending, LeaveStatus::Approved).unwrap(),
            LeaveStatus::Approved
        );
        assert!(decide_leave_status(LeaveStatus::Approved, LeaveStatus::Rejected).is_err());
        assert!(decide_leave_status(LeaveStatus::Pending, LeaveStatus::Pending).is_err());
    }

    #[test]
    fn only_leads_act_for_others() {
        let employee = user(Role::Employee);
        assert_eq!(target_user(&employee, None).unwrap(), employee.user_id);
        assert_eq!(
            target_user(&employee, Some(employee.user_id)).unwrap(),
            employee.user_id
        );
        assert!(target_user(&employee, Some(Uuid::new_v4())).is_err());

        let manager = user(Role::Manager);
        let other = Uuid::new_v4();
        assert_eq!(target_user(&manager, Some(other)).unwrap(), other);
    }
}
