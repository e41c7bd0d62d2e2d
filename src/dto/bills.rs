use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Bill, BillItem};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct BillLineRequest {
    pub item_id: Option<Uuid>,
    pub name: String,
    pub unit_price: i64,
    pub quantity: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateBillRequest {
    pub customer_name: String,
    pub customer_contact: Option<String>,
    pub items: Vec<BillLineRequest>,
    pub promo_code: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateBillRequest {
    pub customer_name: Option<String>,
    pub customer_contact: Option<String>,
    /// Replaces every line of the bill when present.
    pub items: Option<Vec<BillLineRequest>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BillWithItems {
    pub bill: Bill,
    pub items: Vec<BillItem>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct BillList {
    #[schema(value_type = Vec<Bill>)]
    pub items: Vec<Bill>,
}
