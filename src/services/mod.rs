pub mod admin_service;
pub mod auth_service;
pub mod bill_service;
pub mod dashboard_service;
pub mod inventory_service;
pub mod order_service;
pub mod promo_service;
pub mod sales_service;
pub mod staff_service;
pub mod supplier_service;
