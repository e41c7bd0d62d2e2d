use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::AppError;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[sea_orm(string_value = "admin")]
    Admin,
    #[sea_orm(string_value = "manager")]
    Manager,
    #[sea_orm(string_value = "supplier")]
    Supplier,
    #[sea_orm(string_value = "employee")]
    Employee,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Supplier => "supplier",
            Role::Employee => "employee",
        }
    }

    /// Admins and managers run the station; everyone else only sees their own records.
    pub fn is_staff_lead(&self) -> bool {
        matches!(self, Role::Admin | Role::Manager)
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "manager" => Ok(Role::Manager),
            "supplier" => Ok(Role::Supplier),
            "employee" => Ok(Role::Employee),
            other => Err(AppError::BadRequest(format!("Unknown role {other}"))),
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    #[sea_orm(string_value = "fuel")]
    Fuel,
    #[sea_orm(string_value = "shop")]
    Shop,
}

/// Supplier order lifecycle. Transitions only move forward.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "accepted")]
    Accepted,
    /// Delivered goods have been booked into inventory.
    #[sea_orm(string_value = "processed")]
    Processed,
}

impl OrderStatus {
    fn rank(self) -> u8 {
        match self {
            OrderStatus::Pending => 0,
            OrderStatus::Accepted => 1,
            OrderStatus::Processed => 2,
        }
    }

    /// Status after a supplier accepts. Never moves an order backwards.
    pub fn accept(self) -> Self {
        self.advance_to(OrderStatus::Accepted)
    }

    pub fn advance_to(self, next: OrderStatus) -> Self {
        if next.rank() > self.rank() { next } else { self }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum PromoKind {
    #[sea_orm(string_value = "percentage")]
    Percentage,
    #[sea_orm(string_value = "fixed")]
    Fixed,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    #[sea_orm(string_value = "present")]
    Present,
    #[sea_orm(string_value = "absent")]
    Absent,
    #[sea_orm(string_value = "late")]
    Late,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum LeaveStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct InventoryItem {
    pub id: Uuid,
    pub kind: ItemKind,
    pub name: String,
    pub total_quantity: i64,
    pub sold_quantity: i64,
    /// Always `total_quantity - sold_quantity`.
    pub available: i64,
    pub unit_price: i64,
    pub wholesale_price: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InventoryItem {
    pub fn available_of(total_quantity: i64, sold_quantity: i64) -> i64 {
        total_quantity - sold_quantity
    }

    pub fn is_low_stock(&self, threshold: i64) -> bool {
        self.available < threshold
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SaleRecord {
    pub id: Uuid,
    pub item_id: Uuid,
    pub item_name: String,
    pub kind: ItemKind,
    pub quantity: i64,
    pub unit_price: i64,
    pub total_price: i64,
    pub sold_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Bill {
    pub id: Uuid,
    pub customer_name: String,
    pub customer_contact: Option<String>,
    pub subtotal: i64,
    pub discount: i64,
    pub total_amount: i64,
    pub promo_code: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BillItem {
    pub id: Uuid,
    pub bill_id: Uuid,
    pub item_id: Option<Uuid>,
    pub name: String,
    pub unit_price: i64,
    pub quantity: i64,
    pub line_total: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: Uuid,
    pub item_name: String,
    pub quantity: i64,
    pub supplier_email: String,
    pub status: OrderStatus,
    pub ordered_by: Option<Uuid>,
    pub inventory_item_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PromoCode {
    pub id: Uuid,
    pub code: String,
    pub kind: PromoKind,
    pub value: i64,
    pub ends_at: DateTime<Utc>,
    pub usage_limit: i64,
    pub used_count: i64,
    pub expired: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Supplier {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub supplies: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Attendance {
    pub id: Uuid,
    pub user_id: Uuid,
    pub work_date: NaiveDate,
    pub status: AttendanceStatus,
    pub check_in: Option<DateTime<Utc>>,
    pub check_out: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LeaveRequest {
    pub id: Uuid,
    pub user_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: String,
    pub status: LeaveStatus,
    pub decided_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(total: i64, sold: i64) -> InventoryItem {
        InventoryItem {
            id: Uuid::new_v4(),
            kind: ItemKind::Shop,
            name: "Engine Oil 1L".into(),
            total_quantity: total,
            sold_quantity: sold,
            available: InventoryItem::available_of(total, sold),
            unit_price: 4500,
            wholesale_price: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn fresh_item_is_fully_available() {
        assert_eq!(item(100, 0).available, 100);
        assert_eq!(item(100, 35).available, 65);
    }

    #[test]
    fn low_stock_is_strictly_below_threshold() {
        assert!(item(12, 3).is_low_stock(10));
        assert!(!item(20, 10).is_low_stock(10));
    }

    #[test]
    fn order_status_never_moves_backwards() {
        assert_eq!(OrderStatus::Pending.accept(), OrderStatus::Accepted);
        assert_eq!(OrderStatus::Accepted.accept(), OrderStatus::Accepted);
        assert_eq!(OrderStatus::Processed.accept(), OrderStatus::Processed);
        assert_eq!(
            OrderStatus::Processed.advance_to(OrderStatus::Pending),
            OrderStatus::Processed
        );
    }

    #[test]
    fn roles_parse_from_wire_names() {
        assert_eq!("supplier".parse::<Role>().unwrap(), Role::Supplier);
        assert!("root".parse::<Role>().is_err());
        assert!(Role::Manager.is_staff_lead());
        assert!(!Role::Employee.is_staff_lead());
    }
}
