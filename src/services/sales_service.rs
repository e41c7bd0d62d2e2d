use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::{Alias, LockType};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, FromQueryResult, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::sales::{KindSummary, RecordSaleRequest, SaleList, SalesSummary},
    entity::{
        inventory_items::{ActiveModel as ItemActive, Entity as InventoryItems},
        sales::{ActiveModel as SaleActive, Column as SaleCol, Entity as Sales, Model as SaleModel},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_any_role},
    models::{InventoryItem, ItemKind, Role, SaleRecord},
    response::{ApiResponse, Meta},
    routes::params::SaleListQuery,
    services::inventory_service::broadcast_snapshot,
    state::AppState,
};

const SELLING_ROLES: [Role; 3] = [Role::Admin, Role::Manager, Role::Employee];

/// Price of `quantity` units, rejecting non-positive quantities and overdrawn stock.
pub fn price_sale(unit_price: i64, available: i64, quantity: i64) -> AppResult<i64> {
    if quantity <= 0 {
        return Err(AppError::BadRequest("Sale quantity must be positive".into()));
    }
    if quantity > available {
        return Err(AppError::BadRequest(format!(
            "Insufficient stock: {available} available"
        )));
    }
    unit_price
        .checked_mul(quantity)
        .ok_or_else(|| AppError::BadRequest("Sale total out of range".into()))
}

pub async fn record_sale(
    state: &AppState,
    user: &AuthUser,
    payload: RecordSaleRequest,
) -> AppResult<ApiResponse<SaleRecord>> {
    ensure_any_role(user, &SELLING_ROLES)?;

    let txn = state.orm.begin().await?;
    let item = InventoryItems::find_by_id(payload.item_id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    let available = InventoryItem::available_of(item.total_quantity, item.sold_quantity);
    let total_price = price_sale(item.unit_price, available, payload.quantity)?;

    let sale = SaleActive {
        id: Set(Uuid::new_v4()),
        item_id: Set(item.id),
        item_name: Set(item.name.clone()),
        kind: Set(item.kind),
        quantity: Set(payload.quantity),
        unit_price: Set(item.unit_price),
        total_price: Set(total_price),
        sold_by: Set(Some(user.user_id)),
        created_at: NotSet,
    }
    .insert(&txn)
    .await?;

    let sold = item.sold_quantity + payload.quantity;
    let mut active: ItemActive = item.into();
    active.sold_quantity = Set(sold);
    active.updated_at = Set(Utc::now().into());
    active.update(&txn).await?;

    txn.commit().await?;

    tracing::info!(item_id = %sale.item_id, quantity = sale.quantity, "sale recorded");
    audit::record(
        &state.pool,
        user.user_id,
        "sale_record",
        "sales",
        serde_json::json!({ "sale_id": sale.id, "item_id": sale.item_id }),
    )
    .await;
    broadcast_snapshot(state).await;

    Ok(ApiResponse::success(
        "Sale recorded",
        sale_from_entity(sale),
        Some(Meta::empty()),
    ))
}

pub async fn list_sales(
    state: &AppState,
    query: SaleListQuery,
) -> AppResult<ApiResponse<SaleList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = Condition::all();
    if let Some(kind) = query.kind {
        condition = condition.add(SaleCol::Kind.eq(kind));
    }
    if let Some(item_id) = query.item_id {
        condition = condition.add(SaleCol::ItemId.eq(item_id));
    }

    let finder = Sales::find()
        .filter(condition)
        .order_by_desc(SaleCol::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(sale_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Sales",
        SaleList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

#[derive(Debug, FromQueryResult)]
struct KindTotalsRow {
    kind: ItemKind,
    sales: i64,
    quantity: i64,
    revenue: i64,
}

pub async fn sales_summary(state: &AppState) -> AppResult<ApiResponse<SalesSummary>> {
    let bigint = || Alias::new("bigint");
    let rows = Sales::find()
        .select_only()
        .column(SaleCol::Kind)
        .column_as(SaleCol::Id.count(), "sales")
        .column_as(SaleCol::Quantity.sum().cast_as(bigint()), "quantity")
        .column_as(SaleCol::TotalPrice.sum().cast_as(bigint()), "revenue")
        .group_by(SaleCol::Kind)
        .into_model::<KindTotalsRow>()
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|row| KindSummary {
            kind: row.kind,
            sales: row.sales,
            quantity: row.quantity,
            revenue: row.revenue,
        })
        .collect();

    Ok(ApiResponse::success(
        "Sales summary",
        summarize(rows),
        Some(Meta::empty()),
    ))
}

/// One entry per item kind, zero-filled for kinds with no sales yet.
pub fn summarize(rows: Vec<KindSummary>) -> SalesSummary {
    let by_kind: Vec<KindSummary> = [ItemKind::Fuel, ItemKind::Shop]
        .into_iter()
        .map(|kind| {
            rows.iter()
                .find(|row| row.kind == kind)
                .cloned()
                .unwrap_or(KindSummary {
                    kind,
                    sales: 0,
                    quantity: 0,
                    revenue: 0,
                })
        })
        .collect();
    let total_revenue = by_kind.iter().map(|k| k.revenue).sum();
    SalesSummary {
        by_kind,
        total_revenue,
    }
}

fn sale_from_entity(model: SaleModel) -> SaleRecord {
    SaleRecord {
        id: model.id,
        item_id: model.item_id,
        item_name: model.item_name,
        kind: model.kind,
        quantity: model.quantity,
        unit_price: model.unit_price,
        total_price: model.total_price,
        sold_by: model.sold_by,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sale_price_is_unit_price_times_quantity() {
        assert_eq!(price_sale(36500, 1000, 40).unwrap(), 1_460_000);
    }

    #[test]
    fn cannot_sell_more_than_available() {
        let err = price_sale(100, 3, 4).unwrap_err();
        assert!(err.to_string().contains("3 available"));
        assert!(price_sale(100, 3, 3).is_ok());
        assert!(price_sale(100, 3, 0).is_err());
    }

    #[test]
    fn summary_fills_missing_kinds() {
        let summary = summarize(vec![KindSummary {
            kind: ItemKind::Shop,
            sales: 2,
            quantity: 5,
            revenue: 2500,
        }]);
        assert_eq!(summary.by_kind.len(), 2);
        assert_eq!(summary.by_kind[0].kind, ItemKind::Fuel);
        assert_eq!(summary.by_kind[0].revenue, 0);
        assert_eq!(summary.by_kind[1].quantity, 5);
        assert_eq!(summary.total_revenue, 2500);
    }
}
