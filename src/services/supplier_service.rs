use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::suppliers::{CreateSupplierRequest, SupplierList, UpdateSupplierRequest},
    entity::suppliers::{ActiveModel, Column, Entity as Suppliers, Model as SupplierModel},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_staff_lead},
    models::Supplier,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    state::AppState,
};

fn normalize_email(email: &str) -> AppResult<String> {
    let email = email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::BadRequest("A valid supplier email is required".into()));
    }
    Ok(email)
}

async fn ensure_email_free(state: &AppState, email: &str, except: Option<Uuid>) -> AppResult<()> {
    let mut finder = Suppliers::find().filter(Column::Email.eq(email));
    if let Some(id) = except {
        finder = finder.filter(Column::Id.ne(id));
    }
    if finder.one(&state.orm).await?.is_some() {
        return Err(AppError::Conflict(format!("Supplier {email} already exists")));
    }
    Ok(())
}

pub async fn list_suppliers(
    state: &AppState,
    pagination: Pagination,
) -> AppResult<ApiResponse<SupplierList>> {
    let (page, limit, offset) = pagination.normalize();
    let finder = Suppliers::find().order_by_asc(Column::Name);
    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(supplier_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Suppliers",
        SupplierList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn get_supplier(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Supplier>> {
    let supplier = Suppliers::find_by_id(id)
        .one(&state.orm)
        .await?
        .map(supplier_from_entity)
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("Supplier", supplier, None))
}

pub async fn create_supplier(
    state: &AppState,
    user: &AuthUser,
    payload: CreateSupplierRequest,
) -> AppResult<ApiResponse<Supplier>> {
    ensure_staff_lead(user)?;
    let name = payload.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::BadRequest("Supplier name is required".into()));
    }
    let email = normalize_email(&payload.email)?;
    ensure_email_free(state, &email, None).await?;

    let supplier = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        email: Set(email),
        phone: Set(payload.phone),
        supplies: Set(payload.supplies),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.pool,
        user.user_id,
        "supplier_create",
        "suppliers",
        serde_json::json!({ "supplier_id": supplier.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Supplier created",
        supplier_from_entity(supplier),
        Some(Meta::empty()),
    ))
}

pub async fn update_supplier(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateSupplierRequest,
) -> AppResult<ApiResponse<Supplier>> {
    ensure_staff_lead(user)?;
    let existing = Suppliers::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: ActiveModel = existing.into();
    if let Some(name) = payload.name {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::BadRequest("Supplier name is required".into()));
        }
        active.name = Set(name);
    }
    if let Some(email) = payload.email {
        let email = normalize_email(&email)?;
        ensure_email_free(state, &email, Some(id)).await?;
        active.email = Set(email);
    }
    if let Some(phone) = payload.phone {
        active.phone = Set(Some(phone));
    }
    if let Some(supplies) = payload.supplies {
        active.supplies = Set(Some(supplies));
    }
    let supplier = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        user.user_id,
        "supplier_update",
        "suppliers",
        serde_json::json!({ "supplier_id": supplier.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        supplier_from_entity(supplier),
        Some(Meta::empty()),
    ))
}

pub async fn delete_supplier(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_staff_lead(user)?;
    let result = Suppliers::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.pool,
        user.user_id,
        "supplier_delete",
        "suppliers",
        serde_json::json!({ "supplier_id": id }),
    )
    .await;

    Ok(ApiResponse::deleted())
}

fn supplier_from_entity(model: SupplierModel) -> Supplier {
    Supplier {
        id: model.id,
        name: model.name,
        email: model.email,
        phone: model.phone,
        supplies: model.supplies,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn supplier_email_is_normalized() {
        assert_eq!(normalize_email(" Sales@Lubes.CO ").unwrap(), "sales@lubes.co");
        assert!(normalize_email("lubes").is_err());
        assert!(normalize_email("").is_err());
    }
}
