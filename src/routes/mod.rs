use axum::{Router, routing::get};

use crate::state::AppState;

pub mod admin;
pub mod auth;
pub mod bills;
pub mod dashboard;
pub mod doc;
pub mod health;
pub mod inventory;
pub mod orders;
pub mod params;
pub mod promotions;
pub mod realtime;
pub mod sales;
pub mod staff;
pub mod suppliers;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/inventory", inventory::router())
        .nest("/sales", sales::router())
        .nest("/bills", bills::router())
        .nest("/orders", orders::router())
        .nest("/promotions", promotions::router())
        .nest("/suppliers", suppliers::router())
        .nest("/attendance", staff::attendance_router())
        .nest("/leaves", staff::leave_router())
        .nest("/users", admin::router())
        .route("/dashboard", get(dashboard::dashboard))
}
