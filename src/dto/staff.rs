use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Attendance, AttendanceStatus, LeaveRequest, LeaveStatus};

#[derive(Debug, Deserialize, ToSchema)]
pub struct MarkAttendanceRequest {
    /// Only admins and managers may mark attendance for someone else.
    pub user_id: Option<Uuid>,
    /// Defaults to today (UTC).
    pub work_date: Option<NaiveDate>,
    pub status: AttendanceStatus,
    pub check_in: Option<DateTime<Utc>>,
    pub check_out: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateLeaveRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DecideLeaveRequest {
    pub status: LeaveStatus,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct AttendanceList {
    #[schema(value_type = Vec<Attendance>)]
    pub items: Vec<Attendance>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct LeaveList {
    #[schema(value_type = Vec<LeaveRequest>)]
    pub items: Vec<LeaveRequest>,
}
