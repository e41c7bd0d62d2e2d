use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::sea_query::{Expr, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use sea_orm::sea_query::LockType;
use uuid::Uuid;

use crate::{
    audit,
    dto::inventory::{CreateItemRequest, InventoryList, RestockRequest, UpdateItemRequest},
    entity::inventory_items::{ActiveModel, Column, Entity as InventoryItems, Model as ItemModel},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin, ensure_staff_lead},
    models::{InventoryItem, ItemKind},
    response::{ApiResponse, Meta},
    routes::params::{InventoryQuery, InventorySortBy, LowStockQuery, SortOrder},
    state::AppState,
};

pub fn validate_quantities(total_quantity: i64, sold_quantity: i64) -> AppResult<()> {
    if total_quantity < 0 || sold_quantity < 0 {
        return Err(AppError::BadRequest("Quantities cannot be negative".into()));
    }
    if sold_quantity > total_quantity {
        return Err(AppError::BadRequest(
            "Sold quantity cannot exceed total quantity".into(),
        ));
    }
    Ok(())
}

fn validate_price(price: i64) -> AppResult<()> {
    if price < 0 {
        return Err(AppError::BadRequest("Price cannot be negative".into()));
    }
    Ok(())
}

pub fn validate_new_item(payload: &CreateItemRequest) -> AppResult<()> {
    if payload.name.trim().is_empty() {
        return Err(AppError::BadRequest("Item name is required".into()));
    }
    validate_quantities(payload.total_quantity, payload.sold_quantity.unwrap_or(0))?;
    validate_price(payload.unit_price)?;
    if let Some(wholesale) = payload.wholesale_price {
        validate_price(wholesale)?;
    }
    Ok(())
}

/// `(kind, name)` is unique; `except` skips the item being renamed.
async fn ensure_name_free<C: ConnectionTrait>(
    conn: &C,
    kind: ItemKind,
    name: &str,
    except: Option<Uuid>,
) -> AppResult<()> {
    let mut finder = InventoryItems::find()
        .filter(Column::Kind.eq(kind))
        .filter(Column::Name.eq(name));
    if let Some(id) = except {
        finder = finder.filter(Column::Id.ne(id));
    }
    if finder.one(conn).await?.is_some() {
        return Err(AppError::Conflict(format!("Item {name} already exists")));
    }
    Ok(())
}

fn available_expr() -> SimpleExpr {
    Expr::col(Column::TotalQuantity).sub(Expr::col(Column::SoldQuantity))
}

pub async fn list_items(
    state: &AppState,
    query: InventoryQuery,
) -> AppResult<ApiResponse<InventoryList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = Condition::all();

    if let Some(kind) = query.kind {
        condition = condition.add(Column::Kind.eq(kind));
    }
    if let Some(search) = query.q.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(Expr::col(Column::Name).ilike(format!("%{}%", search)));
    }

    let sort_col = match query.sort_by.unwrap_or(InventorySortBy::Name) {
        InventorySortBy::CreatedAt => Column::CreatedAt,
        InventorySortBy::Name => Column::Name,
        InventorySortBy::UnitPrice => Column::UnitPrice,
    };

    let mut finder = InventoryItems::find().filter(condition);
    finder = match query.sort_order.unwrap_or(SortOrder::Asc) {
        SortOrder::Asc => finder.order_by_asc(sort_col),
        SortOrder::Desc => finder.order_by_desc(sort_col),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(item_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Inventory",
        InventoryList { items },
        Some(meta),
    ))
}

pub async fn get_item(state: &AppState, id: Uuid) -> AppResult<ApiResponse<InventoryItem>> {
    let item = InventoryItems::find_by_id(id)
        .one(&state.orm)
        .await?
        .map(item_from_entity)
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success(
        "Inventory item",
        item,
        Some(Meta::empty()),
    ))
}

pub async fn create_item(
    state: &AppState,
    user: &AuthUser,
    payload: CreateItemRequest,
) -> AppResult<ApiResponse<InventoryItem>> {
    ensure_staff_lead(user)?;
    validate_new_item(&payload)?;
    let name = payload.name.trim().to_string();

    ensure_name_free(&state.orm, payload.kind, &name, None).await?;

    let item = ActiveModel {
        id: Set(Uuid::new_v4()),
        kind: Set(payload.kind),
        name: Set(name),
        total_quantity: Set(payload.total_quantity),
        sold_quantity: Set(payload.sold_quantity.unwrap_or(0)),
        unit_price: Set(payload.unit_price),
        wholesale_price: Set(payload.wholesale_price),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.pool,
        user.user_id,
        "inventory_create",
        "inventory_items",
        serde_json::json!({ "item_id": item.id }),
    )
    .await;
    broadcast_snapshot(state).await;

    Ok(ApiResponse::success(
        "Inventory item created",
        item_from_entity(item),
        Some(Meta::empty()),
    ))
}

pub async fn update_item(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateItemRequest,
) -> AppResult<ApiResponse<InventoryItem>> {
    ensure_staff_lead(user)?;
    let txn = state.orm.begin().await?;
    let existing = InventoryItems::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    let total = payload.total_quantity.unwrap_or(existing.total_quantity);
    let sold = payload.sold_quantity.unwrap_or(existing.sold_quantity);
    validate_quantities(total, sold)?;

    let kind = existing.kind;
    let mut active: ActiveModel = existing.into();
    if let Some(name) = payload.name {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::BadRequest("Item name is required".into()));
        }
        ensure_name_free(&txn, kind, &name, Some(id)).await?;
        active.name = Set(name);
    }
    if let Some(price) = payload.unit_price {
        validate_price(price)?;
        active.unit_price = Set(price);
    }
    if let Some(wholesale) = payload.wholesale_price {
        validate_price(wholesale)?;
        active.wholesale_price = Set(Some(wholesale));
    }
    active.total_quantity = Set(total);
    active.sold_quantity = Set(sold);
    active.updated_at = Set(Utc::now().into());
    let item = active.update(&txn).await?;
    txn.commit().await?;

    audit::record(
        &state.pool,
        user.user_id,
        "inventory_update",
        "inventory_items",
        serde_json::json!({ "item_id": item.id }),
    )
    .await;
    broadcast_snapshot(state).await;

    Ok(ApiResponse::success(
        "Updated",
        item_from_entity(item),
        Some(Meta::empty()),
    ))
}

pub async fn restock_item(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: RestockRequest,
) -> AppResult<ApiResponse<InventoryItem>> {
    ensure_staff_lead(user)?;
    if payload.quantity <= 0 {
        return Err(AppError::BadRequest("Restock quantity must be positive".into()));
    }

    let txn = state.orm.begin().await?;
    let existing = InventoryItems::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;
    let item = add_stock(&txn, existing, payload.quantity, DeliveryPrices::default()).await?;
    txn.commit().await?;

    audit::record(
        &state.pool,
        user.user_id,
        "inventory_restock",
        "inventory_items",
        serde_json::json!({ "item_id": item.id, "quantity": payload.quantity }),
    )
    .await;
    broadcast_snapshot(state).await;

    Ok(ApiResponse::success(
        "Inventory restocked",
        item_from_entity(item),
        Some(Meta::empty()),
    ))
}

/// Price changes that come with a delivery. `None` keeps the stored price.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct DeliveryPrices {
    pub wholesale_price: Option<i64>,
    pub unit_price: Option<i64>,
}

/// Increase `total_quantity` of an already locked row.
pub(crate) async fn add_stock<C: ConnectionTrait>(
    conn: &C,
    existing: ItemModel,
    quantity: i64,
    prices: DeliveryPrices,
) -> AppResult<ItemModel> {
    let total = existing
        .total_quantity
        .checked_add(quantity)
        .ok_or_else(|| AppError::BadRequest("Quantity out of range".into()))?;
    let mut active: ActiveModel = existing.into();
    active.total_quantity = Set(total);
    if prices.wholesale_price.is_some() {
        active.wholesale_price = Set(prices.wholesale_price);
    }
    if let Some(unit_price) = prices.unit_price {
        active.unit_price = Set(unit_price);
    }
    active.updated_at = Set(Utc::now().into());
    Ok(active.update(conn).await?)
}

pub async fn delete_item(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let result = InventoryItems::delete_by_id(id).exec(&state.orm).await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.pool,
        user.user_id,
        "inventory_delete",
        "inventory_items",
        serde_json::json!({ "item_id": id }),
    )
    .await;
    broadcast_snapshot(state).await;

    Ok(ApiResponse::deleted())
}

pub async fn list_low_stock(
    state: &AppState,
    query: LowStockQuery,
) -> AppResult<ApiResponse<InventoryList>> {
    let threshold = query
        .threshold
        .unwrap_or_else(|| state.notifier.low_stock_threshold());
    let (page, limit, offset) = query.pagination().normalize();

    let mut finder = InventoryItems::find().filter(Expr::expr(available_expr()).lt(threshold));
    if let Some(kind) = query.kind {
        finder = finder.filter(Column::Kind.eq(kind));
    }
    finder = finder
        .order_by_asc(available_expr())
        .order_by_asc(Column::Name);

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(item_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Low stock",
        InventoryList { items },
        Some(meta),
    ))
}

/// Every inventory item, fuel first, then by name.
pub async fn snapshot<C: ConnectionTrait>(conn: &C) -> AppResult<Vec<InventoryItem>> {
    let items = InventoryItems::find()
        .order_by_asc(Column::Kind)
        .order_by_asc(Column::Name)
        .all(conn)
        .await?
        .into_iter()
        .map(item_from_entity)
        .collect();
    Ok(items)
}

/// Push the current inventory to every connected dashboard. Never fails the caller.
pub async fn broadcast_snapshot(state: &AppState) {
    match snapshot(&state.orm).await {
        Ok(items) => {
            state.notifier.publish_inventory(items);
        }
        Err(err) => tracing::warn!(error = %err, "inventory broadcast skipped"),
    }
}

pub(crate) fn item_from_entity(model: ItemModel) -> InventoryItem {
    InventoryItem {
        id: model.id,
        kind: model.kind,
        name: model.name,
        available: InventoryItem::available_of(model.total_quantity, model.sold_quantity),
        total_quantity: model.total_quantity,
        sold_quantity: model.sold_quantity,
        unit_price: model.unit_price,
        wholesale_price: model.wholesale_price,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(total: i64, sold: Option<i64>) -> CreateItemRequest {
        CreateItemRequest {
            kind: ItemKind::Fuel,
            name: "Petrol 92".into(),
            total_quantity: total,
            sold_quantity: sold,
            unit_price: 36500,
            wholesale_price: Some(33000),
        }
    }

    #[test]
    fn entity_conversion_derives_available() {
        let now = Utc::now();
        let item = item_from_entity(ItemModel {
            id: Uuid::new_v4(),
            kind: ItemKind::Fuel,
            name: "Petrol 92".into(),
            total_quantity: 100,
            sold_quantity: 0,
            unit_price: 36500,
            wholesale_price: None,
            created_at: now.into(),
            updated_at: now.into(),
        });
        assert_eq!(item.available, 100);
        assert_eq!(item.created_at, now);
    }

    #[test]
    fn new_item_validation() {
        assert!(validate_new_item(&request(100, None)).is_ok());
        assert!(validate_new_item(&request(100, Some(100))).is_ok());
        assert!(validate_new_item(&request(100, Some(101))).is_err());
        assert!(validate_new_item(&request(-1, None)).is_err());

        let mut blank = request(10, None);
        blank.name = "   ".into();
        assert!(validate_new_item(&blank).is_err());

        let mut negative_price = request(10, None);
        negative_price.unit_price = -5;
        assert!(validate_new_item(&negative_price).is_err());
    }
}
