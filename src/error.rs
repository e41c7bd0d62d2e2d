use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::SqlErr;
use serde::Serialize;
use thiserror::Error;

use crate::response::{ApiResponse, Meta};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not Found")]
    NotFound,

    #[error("Bad Request {0}")]
    BadRequest(String),

    #[error("Unauthorized {0}")]
    Unauthorized(String),

    #[error("Forbidden")]
    Forbidden,

    #[error("Conflict {0}")]
    Conflict(String),

    #[error("Database error")]
    DbError(#[source] sqlx::Error),

    #[error("ORM error")]
    OrmError(#[source] sea_orm::DbErr),

    #[error("Internal Server Error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::DbError(_) | AppError::OrmError(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

// Unique constraints from the migrations, with the message a client sees.
const UNIQUE_CONSTRAINTS: [(&str, &str); 5] = [
    ("inventory_kind_name", "An item with this kind and name already exists"),
    ("attendance_user_day", "Attendance is already recorded for this day"),
    ("users_email_key", "Email is already taken"),
    ("suppliers_email_key", "Supplier email already exists"),
    ("promo_codes_code_key", "Promo code already exists"),
];

fn unique_violation(detail: &str) -> AppError {
    let message = UNIQUE_CONSTRAINTS
        .iter()
        .find(|(constraint, _)| detail.contains(constraint))
        .map_or("Record already exists", |(_, message)| message);
    AppError::Conflict(message.to_string())
}

fn foreign_key_violation() -> AppError {
    AppError::BadRequest("Referenced record does not exist".into())
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            if db.is_unique_violation() {
                return unique_violation(db.constraint().unwrap_or_default());
            }
            if db.is_foreign_key_violation() {
                return foreign_key_violation();
            }
        }
        AppError::DbError(err)
    }
}

impl From<sea_orm::DbErr> for AppError {
    fn from(err: sea_orm::DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => unique_violation(&detail),
            Some(SqlErr::ForeignKeyConstraintViolation(_)) => foreign_key_violation(),
            _ => AppError::OrmError(err),
        }
    }
}

#[derive(Serialize)]
struct ErrorData {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            AppError::DbError(err) => tracing::error!(error = %err, "database error"),
            AppError::OrmError(err) => tracing::error!(error = %err, "orm error"),
            AppError::Internal(err) => tracing::error!(error = %err, "internal error"),
            _ => {}
        }

        let body = ApiResponse {
            message: self.to_string(),
            data: Some(ErrorData {
                error: self.to_string(),
            }),
            meta: Some(Meta::empty()),
        };

        (status, axum::Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_variants_to_status_codes() {
        assert_eq!(AppError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::Unauthorized("Missing Authorization header".into()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AppError::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            AppError::Internal(anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn unique_violations_become_conflicts() {
        let err = unique_violation(
            "duplicate key value violates unique constraint \"inventory_kind_name\"",
        );
        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert_eq!(
            err.to_string(),
            "Conflict An item with this kind and name already exists"
        );

        let err = unique_violation("something_else");
        assert!(matches!(err, AppError::Conflict(m) if m == "Record already exists"));
        assert_eq!(foreign_key_violation().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn other_database_errors_stay_internal() {
        let err = AppError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, AppError::DbError(_)));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let err = AppError::from(sea_orm::DbErr::Custom("broken pipe".into()));
        assert!(matches!(err, AppError::OrmError(_)));
        assert_eq!(err.to_string(), "ORM error");
    }

    #[test]
    fn internal_errors_hide_details() {
        let err = AppError::Internal(anyhow::anyhow!("connection refused at 10.0.0.1"));
        assert_eq!(err.to_string(), "Internal Server Error");
    }
}
