use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{PromoCode, PromoKind};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePromoRequest {
    pub code: String,
    pub kind: PromoKind,
    pub value: i64,
    pub ends_at: DateTime<Utc>,
    pub usage_limit: i64,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdatePromoRequest {
    pub code: Option<String>,
    pub kind: Option<PromoKind>,
    pub value: Option<i64>,
    pub ends_at: Option<DateTime<Utc>>,
    pub usage_limit: Option<i64>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ApplyPromoRequest {
    pub code: String,
    pub total_amount: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct AppliedPromo {
    pub code: String,
    pub original_amount: i64,
    pub discount: i64,
    pub total_amount: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct PromoList {
    #[schema(value_type = Vec<PromoCode>)]
    pub items: Vec<PromoCode>,
}
