use sea_orm::entity::prelude::*;

use crate::models::ItemKind;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "inventory_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub kind: ItemKind,
    pub name: String,
    pub total_quantity: i64,
    pub sold_quantity: i64,
    pub unit_price: i64,
    pub wholesale_price: Option<i64>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

// Sales and bill lines copy the item name instead of holding a foreign key.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
