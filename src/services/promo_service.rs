use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::promotions::{
        AppliedPromo, ApplyPromoRequest, CreatePromoRequest, PromoList, UpdatePromoRequest,
    },
    entity::promo_codes::{ActiveModel, Column, Entity as PromoCodes, Model as PromoModel},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_staff_lead},
    models::{PromoCode, PromoKind},
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    state::AppState,
};

pub const INVALID_PROMO: &str = "Invalid or expired promo code";

fn invalid_promo() -> AppError {
    AppError::BadRequest(INVALID_PROMO.into())
}

pub fn is_expired(ends_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now > ends_at
}

/// Discount for `total`, never more than the total itself.
pub fn compute_discount(kind: PromoKind, value: i64, total: i64) -> i64 {
    let discount = match kind {
        PromoKind::Percentage => {
            (i128::from(total) * i128::from(value.clamp(0, 100)) / 100) as i64
        }
        PromoKind::Fixed => value.max(0),
    };
    discount.min(total)
}

pub fn validate_promo(code: &str, kind: PromoKind, value: i64, usage_limit: i64) -> AppResult<()> {
    if code.trim().is_empty() {
        return Err(AppError::BadRequest("Promo code is required".into()));
    }
    match kind {
        PromoKind::Percentage if !(1..=100).contains(&value) => {
            return Err(AppError::BadRequest(
                "Percentage must be between 1 and 100".into(),
            ));
        }
        PromoKind::Fixed if value <= 0 => {
            return Err(AppError::BadRequest("Fixed discount must be positive".into()));
        }
        _ => {}
    }
    if usage_limit <= 0 {
        return Err(AppError::BadRequest("Usage limit must be positive".into()));
    }
    Ok(())
}

/// Price `total` with `promo` without consuming a use.
pub fn quote(promo: &PromoModel, total: i64, now: DateTime<Utc>) -> AppResult<AppliedPromo> {
    if total < 0 {
        return Err(AppError::BadRequest("Total amount cannot be negative".into()));
    }
    if is_expired(promo.ends_at.with_timezone(&Utc), now) || promo.used_count >= promo.usage_limit
    {
        return Err(invalid_promo());
    }
    let discount = compute_discount(promo.kind, promo.value, total);
    Ok(AppliedPromo {
        code: promo.code.clone(),
        original_amount: total,
        discount,
        total_amount: total - discount,
    })
}

/// Price `total` and consume one use of `code`.
///
/// The use is taken with a single conditional UPDATE, so concurrent
/// redemptions can never push `used_count` past `usage_limit`.
pub async fn redeem<C: ConnectionTrait>(
    conn: &C,
    code: &str,
    total: i64,
    now: DateTime<Utc>,
) -> AppResult<AppliedPromo> {
    let promo = PromoCodes::find()
        .filter(Column::Code.eq(code.trim()))
        .one(conn)
        .await?
        .ok_or_else(invalid_promo)?;

    let applied = quote(&promo, total, now)?;

    let result = PromoCodes::update_many()
        .col_expr(Column::UsedCount, Expr::col(Column::UsedCount).add(1))
        .filter(Column::Id.eq(promo.id))
        .filter(Expr::col(Column::UsedCount).lt(Expr::col(Column::UsageLimit)))
        .filter(Column::EndsAt.gte(now))
        .exec(conn)
        .await?;
    if result.rows_affected == 0 {
        return Err(invalid_promo());
    }

    Ok(applied)
}

pub async fn apply_promo(
    state: &AppState,
    user: &AuthUser,
    payload: ApplyPromoRequest,
) -> AppResult<ApiResponse<AppliedPromo>> {
    let applied = redeem(&state.orm, &payload.code, payload.total_amount, Utc::now()).await?;

    audit::record(
        &state.pool,
        user.user_id,
        "promo_apply",
        "promo_codes",
        serde_json::json!({ "code": applied.code, "discount": applied.discount }),
    )
    .await;

    Ok(ApiResponse::success(
        "Promo code applied",
        applied,
        Some(Meta::empty()),
    ))
}

pub async fn list_promos(
    state: &AppState,
    pagination: Pagination,
) -> AppResult<ApiResponse<PromoList>> {
    let (page, limit, offset) = pagination.normalize();
    let finder = PromoCodes::find().order_by_desc(Column::CreatedAt);
    let total = finder.clone().count(&state.orm).await? as i64;
    let now = Utc::now();
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|m| promo_from_entity(m, now))
        .collect();

    Ok(ApiResponse::success(
        "Promo codes",
        PromoList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn get_promo(state: &AppState, id: Uuid) -> AppResult<ApiResponse<PromoCode>> {
    let promo = PromoCodes::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success(
        "Promo code",
        promo_from_entity(promo, Utc::now()),
        Some(Meta::empty()),
    ))
}

pub async fn create_promo(
    state: &AppState,
    user: &AuthUser,
    payload: CreatePromoRequest,
) -> AppResult<ApiResponse<PromoCode>> {
    ensure_staff_lead(user)?;
    validate_promo(&payload.code, payload.kind, payload.value, payload.usage_limit)?;
    let code = payload.code.trim().to_string();
    ensure_code_free(state, &code, None).await?;

    let promo = ActiveModel {
        id: Set(Uuid::new_v4()),
        code: Set(code),
        kind: Set(payload.kind),
        value: Set(payload.value),
        ends_at: Set(payload.ends_at.into()),
        usage_limit: Set(payload.usage_limit),
        used_count: Set(0),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.pool,
        user.user_id,
        "promo_create",
        "promo_codes",
        serde_json::json!({ "promo_id": promo.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Promo code created",
        promo_from_entity(promo, Utc::now()),
        Some(Meta::empty()),
    ))
}

pub async fn update_promo(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdatePromoRequest,
) -> AppResult<ApiResponse<PromoCode>> {
    ensure_staff_lead(user)?;
    let existing = PromoCodes::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let code = payload
        .code
        .map(|c| c.trim().to_string())
        .unwrap_or_else(|| existing.code.clone());
    let kind = payload.kind.unwrap_or(existing.kind);
    let value = payload.value.unwrap_or(existing.value);
    let usage_limit = payload.usage_limit.unwrap_or(existing.usage_limit);
    validate_promo(&code, kind, value, usage_limit)?;
    if code != existing.code {
        ensure_code_free(state, &code, Some(id)).await?;
    }

    let mut active: ActiveModel = existing.into();
    active.code = Set(code);
    active.kind = Set(kind);
    active.value = Set(value);
    active.usage_limit = Set(usage_limit);
    if let Some(ends_at) = payload.ends_at {
        active.ends_at = Set(ends_at.into());
    }
    let promo = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        user.user_id,
        "promo_update",
        "promo_codes",
        serde_json::json!({ "promo_id": promo.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        promo_from_entity(promo, Utc::now()),
        Some(Meta::empty()),
    ))
}

pub async fn delete_promo(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_staff_lead(user)?;
    let result = PromoCodes::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.pool,
        user.user_id,
        "promo_delete",
        "promo_codes",
        serde_json::json!({ "promo_id": id }),
    )
    .await;

    Ok(ApiResponse::deleted())
}

async fn ensure_code_free(state: &AppState, code: &str, except: Option<Uuid>) -> AppResult<()> {
    let mut finder = PromoCodes::find().filter(Column::Code.eq(code));
    if let Some(id) = except {
        finder = finder.filter(Column::Id.ne(id));
    }
    if finder.one(&state.orm).await?.is_some() {
        return Err(AppError::Conflict(format!("Promo code {code} already exists")));
    }
    Ok(())
}

fn promo_from_entity(model: PromoModel, now: DateTime<Utc>) -> PromoCode {
    let ends_at = model.ends_at.with_timezone(&Utc);
    PromoCode {
        id: model.id,
        code: model.code,
        kind: model.kind,
        value: model.value,
        expired: is_expired(ends_at, now),
        ends_at,
        usage_limit: model.usage_limit,
        used_count: model.used_count,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn promo(kind: PromoKind, value: i64, ends_in: Duration, used: i64) -> PromoModel {
        let now = Utc::now();
        PromoModel {
            id: Uuid::new_v4(),
            code: "WASH20".into(),
            kind,
            value,
            ends_at: (now + ends_in).into(),
            usage_limit: 5,
            used_count: used,
            created_at: now.into(),
        }
    }

    #[test]
    fn percentage_and_fixed_discounts() {
        assert_eq!(compute_discount(PromoKind::Percentage, 20, 15000), 3000);
        assert_eq!(compute_discount(PromoKind::Percentage, 100, 15000), 15000);
        assert_eq!(compute_discount(PromoKind::Fixed, 2000, 15000), 2000);
        assert_eq!(compute_discount(PromoKind::Fixed, 20000, 15000), 15000);
    }

    #[test]
    fn quote_applies_active_code() {
        let applied = quote(
            &promo(PromoKind::Percentage, 20, Duration::days(3), 0),
            10000,
            Utc::now(),
        )
        .unwrap();
        assert_eq!(applied.discount, 2000);
        assert_eq!(applied.total_amount, 8000);
        assert_eq!(applied.original_amount, 10000);
    }

    #[test]
    fn expired_code_is_rejected() {
        let err = quote(
            &promo(PromoKind::Percentage, 20, Duration::days(-1), 0),
            10000,
            Utc::now(),
        )
        .unwrap_err();
        assert_eq!(err.to_string(), format!("Bad Request {INVALID_PROMO}"));
    }

    #[test]
    fn exhausted_code_is_rejected() {
        let err = quote(
            &promo(PromoKind::Fixed, 500, Duration::days(3), 5),
            10000,
            Utc::now(),
        )
        .unwrap_err();
        assert!(err.to_string().contains(INVALID_PROMO));
    }

    #[test]
    fn promo_validation() {
        assert!(validate_promo("FUEL5", PromoKind::Percentage, 5, 10).is_ok());
        assert!(validate_promo("FUEL5", PromoKind::Percentage, 0, 10).is_err());
        assert!(validate_promo("FUEL5", PromoKind::Percentage, 101, 10).is_err());
        assert!(validate_promo("FUEL5", PromoKind::Fixed, 0, 10).is_err());
        assert!(validate_promo("FUEL5", PromoKind::Fixed, 100, 0).is_err());
        assert!(validate_promo(" ", PromoKind::Fixed, 100, 1).is_err());
    }
}
