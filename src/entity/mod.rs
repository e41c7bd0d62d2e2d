pub mod attendance;
pub mod audit_logs;
pub mod bill_items;
pub mod bills;
pub mod inventory_items;
pub mod leave_requests;
pub mod orders;
pub mod promo_codes;
pub mod sales;
pub mod suppliers;
pub mod users;

pub use attendance::Entity as Attendance;
pub use audit_logs::Entity as AuditLogs;
pub use bill_items::Entity as BillItems;
pub use bills::Entity as Bills;
pub use inventory_items::Entity as InventoryItems;
pub use leave_requests::Entity as LeaveRequests;
pub use orders::Entity as Orders;
pub use promo_codes::Entity as PromoCodes;
pub use sales::Entity as Sales;
pub use suppliers::Entity as Suppliers;
pub use users::Entity as Users;
