use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{InventoryItem, ItemKind, Order};

/// Every field is optional on the wire so a missing one is reported as a 400
/// naming the field rather than a generic body rejection.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct PlaceOrderRequest {
    pub item_name: Option<String>,
    pub quantity: Option<i64>,
    pub supplier_email: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReceiveOrderRequest {
    pub kind: ItemKind,
    pub wholesale_price: i64,
    /// New selling price. An existing item keeps its price when omitted; a new
    /// item defaults to the wholesale price.
    pub unit_price: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReceivedOrder {
    pub order: Order,
    pub item: InventoryItem,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<Order>,
}
