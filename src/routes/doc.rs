use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{LoginRequest, LoginResponse, RegisterRequest, UpdateRoleRequest, UserList},
        bills::{BillLineRequest, BillList, BillWithItems, CreateBillRequest, UpdateBillRequest},
        dashboard::{ActivityEntry, DashboardSummary},
        inventory::{CreateItemRequest, InventoryList, RestockRequest, UpdateItemRequest},
        orders::{OrderList, PlaceOrderRequest, ReceiveOrderRequest, ReceivedOrder},
        promotions::{
            AppliedPromo, ApplyPromoRequest, CreatePromoRequest, PromoList, UpdatePromoRequest,
        },
        sales::{KindSummary, RecordSaleRequest, SaleList, SalesSummary},
        staff::{
            AttendanceList, CreateLeaveRequest, DecideLeaveRequest, LeaveList,
            MarkAttendanceRequest,
        },
        suppliers::{CreateSupplierRequest, SupplierList, UpdateSupplierRequest},
    },
    models::{
        Attendance, AttendanceStatus, Bill, BillItem, InventoryItem, ItemKind, LeaveRequest,
        LeaveStatus, Order, OrderStatus, PromoCode, PromoKind, Role, SaleRecord, Supplier, User,
    },
    notifier::LowStockAlert,
    response::Meta,
    routes::{
        admin, auth, bills, dashboard, health, inventory, orders, params, promotions, realtime,
        sales, staff, suppliers,
    },
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        realtime::inventory_socket,
        auth::register,
        auth::login,
        auth::me,
        admin::list_users,
        admin::update_user_role,
        inventory::list_items,
        inventory::get_item,
        inventory::create_item,
        inventory::update_item,
        inventory::restock_item,
        inventory::delete_item,
        inventory::list_low_stock,
        sales::record_sale,
        sales::list_sales,
        sales::sales_summary,
        bills::create_bill,
        bills::list_bills,
        bills::get_bill,
        bills::update_bill,
        bills::delete_bill,
        orders::place_order,
        orders::list_orders,
        orders::get_order,
        orders::accept_order,
        orders::receive_order,
        orders::delete_order,
        promotions::apply_promo,
        promotions::list_promos,
        promotions::get_promo,
        promotions::create_promo,
        promotions::update_promo,
        promotions::delete_promo,
        suppliers::list_suppliers,
        suppliers::get_supplier,
        suppliers::create_supplier,
        suppliers::update_supplier,
        suppliers::delete_supplier,
        staff::mark_attendance,
        staff::list_attendance,
        staff::request_leave,
        staff::list_leaves,
        staff::decide_leave,
        dashboard::dashboard
    ),
    components(
        schemas(
            Role,
            ItemKind,
            OrderStatus,
            PromoKind,
            AttendanceStatus,
            LeaveStatus,
            User,
            InventoryItem,
            SaleRecord,
            Bill,
            BillItem,
            Order,
            PromoCode,
            Supplier,
            Attendance,
            LeaveRequest,
            LowStockAlert,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            UpdateRoleRequest,
            UserList,
            CreateItemRequest,
            UpdateItemRequest,
            RestockRequest,
            InventoryList,
            RecordSaleRequest,
            SaleList,
            KindSummary,
            SalesSummary,
            BillLineRequest,
            CreateBillRequest,
            UpdateBillRequest,
            BillWithItems,
            BillList,
            PlaceOrderRequest,
            ReceiveOrderRequest,
            ReceivedOrder,
            OrderList,
            CreatePromoRequest,
            UpdatePromoRequest,
            ApplyPromoRequest,
            AppliedPromo,
            PromoList,
            CreateSupplierRequest,
            UpdateSupplierRequest,
            SupplierList,
            MarkAttendanceRequest,
            CreateLeaveRequest,
            DecideLeaveRequest,
            AttendanceList,
            LeaveList,
            ActivityEntry,
            DashboardSummary,
            health::HealthData,
            params::Pagination,
            params::SortOrder,
            params::InventorySortBy,
            params::InventoryQuery,
            params::LowStockQuery,
            params::SaleListQuery,
            params::BillListQuery,
            params::OrderListQuery,
            params::AttendanceQuery,
            params::LeaveQuery,
            Meta
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Registration, login and the current user"),
        (name = "Admin", description = "User and role management"),
        (name = "Inventory", description = "Fuel and shop stock"),
        (name = "Sales", description = "Point-of-sale records"),
        (name = "Bills", description = "Customer bills"),
        (name = "Orders", description = "Supplier orders"),
        (name = "Promotions", description = "Promo codes"),
        (name = "Suppliers", description = "Supplier directory"),
        (name = "Staff", description = "Attendance and leave"),
        (name = "Dashboard", description = "Role dashboards"),
        (name = "Realtime", description = "Inventory WebSocket"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_every_api_group() {
        let doc = ApiDoc::openapi();
        for path in [
            "/health",
            "/ws",
            "/api/inventory/{id}/restock",
            "/api/orders/{id}/inventory",
            "/api/promotions/apply",
            "/api/leaves/{id}",
            "/api/dashboard",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
