use chrono::Utc;
use sea_orm::{EntityTrait, QueryOrder, QuerySelect};

use crate::{
    dto::dashboard::{ActivityEntry, DashboardSummary},
    entity::audit_logs::{Column as AuditCol, Entity as AuditLogs},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Role,
    response::{ApiResponse, Meta},
    state::AppState,
};

const RECENT_ACTIVITY: u64 = 10;

pub async fn summary(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<DashboardSummary>> {
    let threshold = state.notifier.low_stock_threshold();

    let (inventory_items, low_stock_items): (i64, i64) = sqlx::query_as(
        r#"
        SELECT count(*),
               count(*) FILTER (WHERE total_quantity - sold_quantity < $1)
        FROM inventory_items
        "#,
    )
    .bind(threshold)
    .fetch_one(&state.pool)
    .await?;

    let (pending_orders,): (i64,) = if user.role == Role::Supplier {
        sqlx::query_as(
            "SELECT count(*) FROM orders WHERE status = 'pending' AND supplier_email = $1",
        )
        .bind(user.email.to_lowercase())
        .fetch_one(&state.pool)
        .await?
    } else {
        sqlx::query_as("SELECT count(*) FROM orders WHERE status = 'pending'")
            .fetch_one(&state.pool)
            .await?
    };

    let (sales_count, sales_revenue): (i64, i64) = sqlx::query_as(
        "SELECT count(*), COALESCE(SUM(total_price), 0)::BIGINT FROM sales",
    )
    .fetch_one(&state.pool)
    .await?;

    let (bills_count, billed_total): (i64, i64) = sqlx::query_as(
        "SELECT count(*), COALESCE(SUM(total_amount), 0)::BIGINT FROM bills",
    )
    .fetch_one(&state.pool)
    .await?;

    let recent_activity = if user.role == Role::Admin {
        AuditLogs::find()
            .order_by_desc(AuditCol::CreatedAt)
            .limit(RECENT_ACTIVITY)
            .all(&state.orm)
            .await?
            .into_iter()
            .map(|entry| ActivityEntry {
                user_id: entry.user_id,
                action: entry.action,
                resource: entry.resource,
                created_at: entry.created_at.with_timezone(&Utc),
            })
            .collect()
    } else {
        Vec::new()
    };

    let data = DashboardSummary {
        inventory_items,
        low_stock_items,
        low_stock_threshold: threshold,
        pending_orders,
        sales_count,
        sales_revenue,
        bills_count,
        billed_total,
        recent_activity,
    };
    Ok(ApiResponse::success("Dashboard", data, Some(Meta::empty())))
}
