use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::orders::{OrderList, PlaceOrderRequest, ReceiveOrderRequest, ReceivedOrder},
    entity::{
        inventory_items::{
            ActiveModel as ItemActive, Column as ItemCol, Entity as InventoryItems,
        },
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin, ensure_any_role, ensure_staff_lead},
    models::{Order, OrderStatus, Role},
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    services::inventory_service::{DeliveryPrices, add_stock, broadcast_snapshot, item_from_entity},
    state::AppState,
};

#[derive(Debug, PartialEq)]
pub struct ValidOrder {
    pub item_name: String,
    pub quantity: i64,
    pub supplier_email: String,
}

/// Presence checks for a new order; each missing field is named in the error.
pub fn validate_place_order(payload: &PlaceOrderRequest) -> AppResult<ValidOrder> {
    let item_name = payload
        .item_name
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::BadRequest("item_name is required".into()))?;
    let quantity = payload
        .quantity
        .ok_or_else(|| AppError::BadRequest("quantity is required".into()))?;
    if quantity <= 0 {
        return Err(AppError::BadRequest("quantity must be positive".into()));
    }
    let supplier_email = payload
        .supplier_email
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::BadRequest("supplier_email is required".into()))?;
    if !supplier_email.contains('@') {
        return Err(AppError::BadRequest("supplier_email is invalid".into()));
    }

    Ok(ValidOrder {
        item_name: item_name.to_string(),
        quantity,
        supplier_email: supplier_email.to_lowercase(),
    })
}

fn addressed_to(order: &OrderModel, user: &AuthUser) -> bool {
    order.supplier_email.eq_ignore_ascii_case(&user.email)
}

pub async fn place_order(
    state: &AppState,
    user: &AuthUser,
    payload: PlaceOrderRequest,
) -> AppResult<ApiResponse<Order>> {
    ensure_staff_lead(user)?;
    let valid = validate_place_order(&payload)?;

    let order = OrderActive {
        id: Set(Uuid::new_v4()),
        item_name: Set(valid.item_name),
        quantity: Set(valid.quantity),
        supplier_email: Set(valid.supplier_email),
        status: Set(OrderStatus::Pending),
        ordered_by: Set(Some(user.user_id)),
        inventory_item_id: Set(None),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.pool,
        user.user_id,
        "order_place",
        "orders",
        serde_json::json!({ "order_id": order.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Order placed",
        order_from_entity(order),
        Some(Meta::empty()),
    ))
}

pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = Condition::all();
    if user.role == Role::Supplier {
        condition = condition.add(OrderCol::SupplierEmail.eq(user.email.to_lowercase()));
    } else {
        ensure_any_role(user, &[Role::Admin, Role::Manager, Role::Employee])?;
    }
    if let Some(status) = query.status {
        condition = condition.add(OrderCol::Status.eq(status));
    }

    let mut finder = Orders::find().filter(condition);
    finder = match query.sort_order.unwrap_or(SortOrder::Desc) {
        SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(OrderCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Orders",
        OrderList { items: orders },
        Some(meta),
    ))
}

pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Order>> {
    let order = Orders::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    // suppliers never learn about orders addressed to someone else
    if user.role == Role::Supplier && !addressed_to(&order, user) {
        return Err(AppError::NotFound);
    }

    Ok(ApiResponse::success(
        "Order found",
        order_from_entity(order),
        Some(Meta::empty()),
    ))
}

/// Move a pending order to accepted. Calling it again is harmless and never
/// moves an accepted or processed order backwards.
pub async fn accept_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Order>> {
    ensure_any_role(user, &[Role::Supplier, Role::Admin])?;

    let txn = state.orm.begin().await?;
    let order = Orders::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;
    if user.role == Role::Supplier && !addressed_to(&order, user) {
        return Err(AppError::Forbidden);
    }

    let next = order.status.accept();
    let order = if next != order.status {
        let mut active: OrderActive = order.into();
        active.status = Set(next);
        active.updated_at = Set(Utc::now().into());
        active.update(&txn).await?
    } else {
        order
    };
    txn.commit().await?;

    audit::record(
        &state.pool,
        user.user_id,
        "order_accept",
        "orders",
        serde_json::json!({ "order_id": order.id, "status": order.status }),
    )
    .await;

    Ok(ApiResponse::success(
        "Order accepted",
        order_from_entity(order),
        Some(Meta::empty()),
    ))
}

/// Book the goods of an accepted order into inventory.
///
/// The stock change and the status change commit together. A processed order
/// is returned as-is with its linked item, so retries never add stock twice.
pub async fn receive_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: ReceiveOrderRequest,
) -> AppResult<ApiResponse<ReceivedOrder>> {
    ensure_staff_lead(user)?;
    if payload.wholesale_price < 0 || payload.unit_price.is_some_and(|p| p < 0) {
        return Err(AppError::BadRequest("Price cannot be negative".into()));
    }

    let txn = state.orm.begin().await?;
    let order = Orders::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    match order.status {
        OrderStatus::Pending => {
            return Err(AppError::BadRequest(
                "Order must be accepted before it is added to inventory".into(),
            ));
        }
        OrderStatus::Processed => {
            let item = match order.inventory_item_id {
                Some(item_id) => InventoryItems::find_by_id(item_id).one(&txn).await?,
                None => None,
            }
            .ok_or(AppError::NotFound)?;
            txn.commit().await?;
            return Ok(ApiResponse::success(
                "Order already added to inventory",
                ReceivedOrder {
                    order: order_from_entity(order),
                    item: item_from_entity(item),
                },
                Some(Meta::empty()),
            ));
        }
        OrderStatus::Accepted => {}
    }

    let existing = InventoryItems::find()
        .filter(ItemCol::Kind.eq(payload.kind))
        .filter(ItemCol::Name.eq(order.item_name.clone()))
        .lock(LockType::Update)
        .one(&txn)
        .await?;

    let item = match existing {
        Some(item) => {
            let prices = DeliveryPrices {
                wholesale_price: Some(payload.wholesale_price),
                unit_price: payload.unit_price,
            };
            add_stock(&txn, item, order.quantity, prices).await?
        }
        None => {
            ItemActive {
                id: Set(Uuid::new_v4()),
                kind: Set(payload.kind),
                name: Set(order.item_name.clone()),
                total_quantity: Set(order.quantity),
                sold_quantity: Set(0),
                unit_price: Set(payload.unit_price.unwrap_or(payload.wholesale_price)),
                wholesale_price: Set(Some(payload.wholesale_price)),
                created_at: NotSet,
                updated_at: NotSet,
            }
            .insert(&txn)
            .await?
        }
    };

    let mut active: OrderActive = order.into();
    active.status = Set(OrderStatus::Processed);
    active.inventory_item_id = Set(Some(item.id));
    active.updated_at = Set(Utc::now().into());
    let order = active.update(&txn).await?;

    txn.commit().await?;

    tracing::info!(order_id = %order.id, item_id = %item.id, quantity = order.quantity, "order added to inventory");
    audit::record(
        &state.pool,
        user.user_id,
        "order_receive",
        "orders",
        serde_json::json!({ "order_id": order.id, "item_id": item.id }),
    )
    .await;
    broadcast_snapshot(state).await;

    Ok(ApiResponse::success(
        "Order added to inventory",
        ReceivedOrder {
            order: order_from_entity(order),
            item: item_from_entity(item),
        },
        Some(Meta::empty()),
    ))
}

pub async fn delete_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let result = Orders::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.pool,
        user.user_id,
        "order_delete",
        "orders",
        serde_json::json!({ "order_id": id }),
    )
    .await;

    Ok(ApiResponse::deleted())
}

fn order_from_entity(model: OrderModel) -> Order {
    Order {
        id: model.id,
        item_name: model.item_name,
        quantity: model.quantity,
        supplier_email: model.supplier_email,
        status: model.status,
        ordered_by: model.ordered_by,
        inventory_item_id: model.inventory_item_id,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(item: Option<&str>, qty: Option<i64>, email: Option<&str>) -> PlaceOrderRequest {
        PlaceOrderRequest {
            item_name: item.map(Into::into),
            quantity: qty,
            supplier_email: email.map(Into::into),
        }
    }

    #[test]
    fn missing_supplier_email_is_rejected() {
        let err = validate_place_order(&request(Some("Diesel"), Some(5000), None)).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(ref m) if m.contains("supplier_email")));

        let err = validate_place_order(&request(Some("Diesel"), Some(5000), Some("  ")))
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn other_missing_fields_are_rejected() {
        assert!(validate_place_order(&request(None, Some(1), Some("a@b.co"))).is_err());
        assert!(validate_place_order(&request(Some("Oil"), None, Some("a@b.co"))).is_err());
        assert!(validate_place_order(&request(Some("Oil"), Some(0), Some("a@b.co"))).is_err());
        assert!(validate_place_order(&request(Some("Oil"), Some(1), Some("nobody"))).is_err());
    }

    #[test]
    fn valid_order_is_normalized() {
        let valid =
            validate_place_order(&request(Some(" Diesel "), Some(5000), Some("Fuel@Supply.co")))
                .unwrap();
        assert_eq!(
            valid,
            ValidOrder {
                item_name: "Diesel".into(),
                quantity: 5000,
                supplier_email: "fuel@supply.co".into(),
            }
        );
    }
}
