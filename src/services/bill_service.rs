use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::sea_query::{Expr, LockType};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::bills::{BillLineRequest, BillList, BillWithItems, CreateBillRequest, UpdateBillRequest},
    entity::{
        bill_items::{
            ActiveModel as BillItemActive, Column as BillItemCol, Entity as BillItems,
            Model as BillItemModel,
        },
        bills::{ActiveModel as BillActive, Column as BillCol, Entity as Bills, Model as BillModel},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin, ensure_any_role, ensure_staff_lead},
    models::{Bill, BillItem, Role},
    response::{ApiResponse, Meta},
    routes::params::{BillListQuery, SortOrder},
    services::promo_service,
    state::AppState,
};

fn line_total(line: &BillLineRequest) -> AppResult<i64> {
    if line.name.trim().is_empty() {
        return Err(AppError::BadRequest("Bill line name is required".into()));
    }
    if line.quantity <= 0 {
        return Err(AppError::BadRequest("Bill line quantity must be positive".into()));
    }
    if line.unit_price < 0 {
        return Err(AppError::BadRequest("Bill line price cannot be negative".into()));
    }
    line.unit_price
        .checked_mul(line.quantity)
        .ok_or_else(|| AppError::BadRequest("Bill total out of range".into()))
}

/// Sum of `unit_price * quantity` over every line. A bill needs at least one line.
pub fn compute_subtotal(lines: &[BillLineRequest]) -> AppResult<i64> {
    if lines.is_empty() {
        return Err(AppError::BadRequest("A bill needs at least one item".into()));
    }
    lines.iter().try_fold(0_i64, |acc, line| {
        acc.checked_add(line_total(line)?)
            .ok_or_else(|| AppError::BadRequest("Bill total out of range".into()))
    })
}

pub async fn create_bill(
    state: &AppState,
    user: &AuthUser,
    payload: CreateBillRequest,
) -> AppResult<ApiResponse<BillWithItems>> {
    ensure_any_role(user, &[Role::Admin, Role::Manager, Role::Employee])?;
    let customer_name = payload.customer_name.trim().to_string();
    if customer_name.is_empty() {
        return Err(AppError::BadRequest("Customer name is required".into()));
    }
    let subtotal = compute_subtotal(&payload.items)?;

    let txn = state.orm.begin().await?;

    let (discount, promo_code) = match payload.promo_code.as_deref().map(str::trim) {
        Some(code) if !code.is_empty() => {
            let applied = promo_service::redeem(&txn, code, subtotal, Utc::now()).await?;
            (applied.discount, Some(applied.code))
        }
        _ => (0, None),
    };

    let bill = BillActive {
        id: Set(Uuid::new_v4()),
        customer_name: Set(customer_name),
        customer_contact: Set(payload.customer_contact),
        subtotal: Set(subtotal),
        discount: Set(discount),
        total_amount: Set(subtotal - discount),
        promo_code: Set(promo_code),
        created_by: Set(Some(user.user_id)),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;

    let items = insert_lines(&txn, bill.id, &payload.items).await?;
    txn.commit().await?;

    audit::record(
        &state.pool,
        user.user_id,
        "bill_create",
        "bills",
        serde_json::json!({ "bill_id": bill.id, "total_amount": bill.total_amount }),
    )
    .await;

    Ok(ApiResponse::success(
        "Bill created",
        BillWithItems {
            bill: bill_from_entity(bill),
            items,
        },
        Some(Meta::empty()),
    ))
}

pub async fn list_bills(
    state: &AppState,
    query: BillListQuery,
) -> AppResult<ApiResponse<BillList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut finder = Bills::find();
    if let Some(search) = query.q.as_ref().filter(|s| !s.is_empty()) {
        finder = finder.filter(Expr::col(BillCol::CustomerName).ilike(format!("%{}%", search)));
    }
    finder = match query.sort_order.unwrap_or(SortOrder::Desc) {
        SortOrder::Asc => finder.order_by_asc(BillCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(BillCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(bill_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Bills",
        BillList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn get_bill(state: &AppState, id: Uuid) -> AppResult<ApiResponse<BillWithItems>> {
    let bill = Bills::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    let items = load_lines(&state.orm, bill.id).await?;

    Ok(ApiResponse::success(
        "Bill",
        BillWithItems {
            bill: bill_from_entity(bill),
            items,
        },
        Some(Meta::empty()),
    ))
}

pub async fn update_bill(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateBillRequest,
) -> AppResult<ApiResponse<BillWithItems>> {
    ensure_staff_lead(user)?;

    let txn = state.orm.begin().await?;
    let existing = Bills::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: BillActive = existing.clone().into();
    if let Some(name) = payload.customer_name {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::BadRequest("Customer name is required".into()));
        }
        active.customer_name = Set(name);
    }
    if let Some(contact) = payload.customer_contact {
        active.customer_contact = Set(Some(contact));
    }

    let items = match payload.items {
        Some(lines) => {
            let subtotal = compute_subtotal(&lines)?;
            // keep the redeemed discount, but never more than the new subtotal
            let discount = existing.discount.min(subtotal);
            active.subtotal = Set(subtotal);
            active.discount = Set(discount);
            active.total_amount = Set(subtotal - discount);

            BillItems::delete_many()
                .filter(BillItemCol::BillId.eq(id))
                .exec(&txn)
                .await?;
            insert_lines(&txn, id, &lines).await?
        }
        None => load_lines(&txn, id).await?,
    };

    active.updated_at = Set(Utc::now().into());
    let bill = active.update(&txn).await?;
    txn.commit().await?;

    audit::record(
        &state.pool,
        user.user_id,
        "bill_update",
        "bills",
        serde_json::json!({ "bill_id": bill.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        BillWithItems {
            bill: bill_from_entity(bill),
            items,
        },
        Some(Meta::empty()),
    ))
}

pub async fn delete_bill(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    // bill_items rows go with it through ON DELETE CASCADE
    let result = Bills::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.pool,
        user.user_id,
        "bill_delete",
        "bills",
        serde_json::json!({ "bill_id": id }),
    )
    .await;

    Ok(ApiResponse::deleted())
}

async fn insert_lines<C: ConnectionTrait>(
    conn: &C,
    bill_id: Uuid,
    lines: &[BillLineRequest],
) -> AppResult<Vec<BillItem>> {
    let mut items = Vec::with_capacity(lines.len());
    for line in lines {
        let item = BillItemActive {
            id: Set(Uuid::new_v4()),
            bill_id: Set(bill_id),
            item_id: Set(line.item_id),
            name: Set(line.name.trim().to_string()),
            unit_price: Set(line.unit_price),
            quantity: Set(line.quantity),
            created_at: NotSet,
        }
        .insert(conn)
        .await?;
        items.push(bill_item_from_entity(item));
    }
    Ok(items)
}

async fn load_lines<C: ConnectionTrait>(conn: &C, bill_id: Uuid) -> AppResult<Vec<BillItem>> {
    let items = BillItems::find()
        .filter(BillItemCol::BillId.eq(bill_id))
        .order_by_asc(BillItemCol::CreatedAt)
        .all(conn)
        .await?
        .into_iter()
        .map(bill_item_from_entity)
        .collect();
    Ok(items)
}

fn bill_from_entity(model: BillModel) -> Bill {
    Bill {
        id: model.id,
        customer_name: model.customer_name,
        customer_contact: model.customer_contact,
        subtotal: model.subtotal,
        discount: model.discount,
        total_amount: model.total_amount,
        promo_code: model.promo_code,
        created_by: model.created_by,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

fn bill_item_from_entity(model: BillItemModel) -> BillItem {
    BillItem {
        id: model.id,
        bill_id: model.bill_id,
        item_id: model.item_id,
        line_total: model.unit_price * model.quantity,
        name: model.name,
        unit_price: model.unit_price,
        quantity: model.quantity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(name: &str, unit_price: i64, quantity: i64) -> BillLineRequest {
        BillLineRequest {
            item_id: None,
            name: name.into(),
            unit_price,
            quantity,
        }
    }

    #[test]
    fn subtotal_sums_every_line() {
        let lines = vec![line("Full wash", 15000, 1), line("Air freshener", 2500, 2)];
        assert_eq!(compute_subtotal(&lines).unwrap(), 20000);
    }

    #[test]
    fn rejects_empty_and_malformed_lines() {
        assert!(compute_subtotal(&[]).is_err());
        assert!(compute_subtotal(&[line("Wax", 500, 0)]).is_err());
        assert!(compute_subtotal(&[line("Wax", -1, 1)]).is_err());
        assert!(compute_subtotal(&[line("  ", 500, 1)]).is_err());
    }

    #[test]
    fn overflowing_totals_are_rejected() {
        assert!(compute_subtotal(&[line("Tanker", i64::MAX, 2)]).is_err());
        assert!(compute_subtotal(&[line("A", i64::MAX, 1), line("B", 1, 1)]).is_err());
    }
}
