use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{ItemKind, LeaveStatus, OrderStatus};

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct Pagination {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

const MAX_PAGE: i64 = 1_000_000;
const MAX_PER_PAGE: i64 = 100;

impl Pagination {
    /// `(page, per_page, offset)` with page in `1..=MAX_PAGE` and per_page in `1..=MAX_PER_PAGE`.
    pub fn normalize(&self) -> (i64, i64, i64) {
        let page = self.page.unwrap_or(1).clamp(1, MAX_PAGE);
        let per_page = self.per_page.unwrap_or(20).clamp(1, MAX_PER_PAGE);
        let offset = (page - 1) * per_page;
        (page, per_page, offset)
    }
}

// `#[serde(flatten)]` breaks numeric fields in query strings, so every list
// query carries its own page fields and exposes them through `pagination()`.
macro_rules! paginated {
    ($($query:ty),* $(,)?) => {
        $(
            impl $query {
                pub fn pagination(&self) -> Pagination {
                    Pagination {
                        page: self.page,
                        per_page: self.per_page,
                    }
                }
            }
        )*
    };
}

#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum InventorySortBy {
    CreatedAt,
    Name,
    UnitPrice,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct InventoryQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub kind: Option<ItemKind>,
    pub q: Option<String>,
    pub sort_by: Option<InventorySortBy>,
    pub sort_order: Option<SortOrder>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct LowStockQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub threshold: Option<i64>,
    pub kind: Option<ItemKind>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct SaleListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub kind: Option<ItemKind>,
    pub item_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct BillListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub q: Option<String>,
    pub sort_order: Option<SortOrder>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct OrderListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub status: Option<OrderStatus>,
    pub sort_order: Option<SortOrder>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct AttendanceQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub user_id: Option<Uuid>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct LeaveQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub status: Option<LeaveStatus>,
}

paginated!(
    InventoryQuery,
    LowStockQuery,
    SaleListQuery,
    BillListQuery,
    OrderListQuery,
    AttendanceQuery,
    LeaveQuery,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_defaults_and_clamps() {
        assert_eq!(Pagination::default().normalize(), (1, 20, 0));
        let p = Pagination {
            page: Some(3),
            per_page: Some(500),
        };
        assert_eq!(p.normalize(), (3, 100, 200));
        let p = Pagination {
            page: Some(-4),
            per_page: Some(0),
        };
        assert_eq!(p.normalize(), (1, 1, 0));
    }

    #[test]
    fn huge_page_numbers_do_not_overflow() {
        let p = Pagination {
            page: Some(i64::MAX),
            per_page: Some(100),
        };
        let (page, per_page, offset) = p.normalize();
        assert_eq!(page, MAX_PAGE);
        assert_eq!(per_page, 100);
        assert_eq!(offset, (MAX_PAGE - 1) * 100);
        assert!(offset > 0);

        let query = SaleListQuery {
            page: Some(i64::MAX),
            per_page: Some(i64::MAX),
            ..Default::default()
        };
        assert_eq!(query.pagination().normalize(), (MAX_PAGE, 100, (MAX_PAGE - 1) * 100));
    }

    #[test]
    fn list_queries_expose_their_page_fields() {
        let q = LowStockQuery {
            page: Some(2),
            per_page: Some(5),
            ..Default::default()
        };
        assert_eq!(q.pagination().normalize(), (2, 5, 5));
    }
}
