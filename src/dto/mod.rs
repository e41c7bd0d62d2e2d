pub mod auth;
pub mod bills;
pub mod dashboard;
pub mod inventory;
pub mod orders;
pub mod promotions;
pub mod sales;
pub mod staff;
pub mod suppliers;
