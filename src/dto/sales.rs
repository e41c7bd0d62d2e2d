use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{ItemKind, SaleRecord};

#[derive(Debug, Deserialize, ToSchema)]
pub struct RecordSaleRequest {
    pub item_id: Uuid,
    pub quantity: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct SaleList {
    #[schema(value_type = Vec<SaleRecord>)]
    pub items: Vec<SaleRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct KindSummary {
    pub kind: ItemKind,
    pub sales: i64,
    pub quantity: i64,
    pub revenue: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SalesSummary {
    pub by_kind: Vec<KindSummary>,
    pub total_revenue: i64,
}
