use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, ToSchema)]
pub struct ActivityEntry {
    pub user_id: Option<Uuid>,
    pub action: String,
    pub resource: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Counters shared by every role dashboard. Suppliers only count their own
/// pending orders; `recent_activity` is filled for admins only.
#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardSummary {
    pub inventory_items: i64,
    pub low_stock_items: i64,
    pub low_stock_threshold: i64,
    pub pending_orders: i64,
    pub sales_count: i64,
    pub sales_revenue: i64,
    pub bills_count: i64,
    pub billed_total: i64,
    pub recent_activity: Vec<ActivityEntry>,
}
