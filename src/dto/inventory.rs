use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{InventoryItem, ItemKind};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateItemRequest {
    pub kind: ItemKind,
    pub name: String,
    pub total_quantity: i64,
    pub sold_quantity: Option<i64>,
    pub unit_price: i64,
    pub wholesale_price: Option<i64>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateItemRequest {
    pub name: Option<String>,
    pub total_quantity: Option<i64>,
    pub sold_quantity: Option<i64>,
    pub unit_price: Option<i64>,
    pub wholesale_price: Option<i64>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RestockRequest {
    pub quantity: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct InventoryList {
    #[schema(value_type = Vec<InventoryItem>)]
    pub items: Vec<InventoryItem>,
}
