use std::time::Duration as StdDuration;

use chrono::{Duration, NaiveDate, Utc};
use futures::StreamExt;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use uuid::Uuid;

use station_manager_api::{
    app::build_app,
    config::AppConfig,
    db::{create_pool, run_migrations},
    dto::{
        bills::{BillLineRequest, CreateBillRequest, UpdateBillRequest},
        inventory::{CreateItemRequest, RestockRequest, UpdateItemRequest},
        orders::{PlaceOrderRequest, ReceiveOrderRequest},
        promotions::{ApplyPromoRequest, CreatePromoRequest},
        sales::RecordSaleRequest,
        staff::{CreateLeaveRequest, DecideLeaveRequest, MarkAttendanceRequest},
        suppliers::{CreateSupplierRequest, UpdateSupplierRequest},
    },
    error::AppError,
    middleware::auth::AuthUser,
    models::{AttendanceStatus, ItemKind, LeaveStatus, OrderStatus, PromoKind, Role},
    notifier::InventoryEvent,
    routes::params::{AttendanceQuery, BillListQuery, LeaveQuery, LowStockQuery, OrderListQuery},
    services::{
        bill_service, dashboard_service, inventory_service, order_service, promo_service,
        sales_service, staff_service, supplier_service,
    },
    state::AppState,
};

type Socket = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

// One function so the truncate at the start cannot race another test in this binary.
#[tokio::test]
async fn station_workflow() -> anyhow::Result<()> {
    // Allow skipping when no DB is configured in the environment.
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!("Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run workflow tests.");
            return Ok(());
        }
    };

    let state = setup_state(&database_url).await?;
    let admin = create_user(&state.pool, "admin@station.test", Role::Admin).await?;
    let manager = create_user(&state.pool, "manager@station.test", Role::Manager).await?;
    let supplier = create_user(&state.pool, "supplier@station.test", Role::Supplier).await?;
    let other_supplier = create_user(&state.pool, "other@station.test", Role::Supplier).await?;
    let employee = create_user(&state.pool, "employee@station.test", Role::Employee).await?;

    // Inventory: available is derived from total and sold.
    let petrol = inventory_service::create_item(
        &state,
        &manager,
        CreateItemRequest {
            kind: ItemKind::Fuel,
            name: "Petrol".into(),
            total_quantity: 100,
            sold_quantity: None,
            unit_price: 36_500,
            wholesale_price: Some(32_000),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(petrol.available, 100);

    let duplicate = inventory_service::create_item(
        &state,
        &manager,
        CreateItemRequest {
            kind: ItemKind::Fuel,
            name: "Petrol".into(),
            total_quantity: 1,
            sold_quantity: None,
            unit_price: 1,
            wholesale_price: None,
        },
    )
    .await;
    assert!(matches!(duplicate, Err(AppError::Conflict(_))));

    // Sales: selling into the low-stock band alerts subscribers.
    let oil = inventory_service::create_item(
        &state,
        &manager,
        CreateItemRequest {
            kind: ItemKind::Shop,
            name: "Engine Oil 1L".into(),
            total_quantity: 12,
            sold_quantity: None,
            unit_price: 45_000,
            wholesale_price: None,
        },
    )
    .await?
    .data
    .unwrap();

    let mut rx = state.notifier.subscribe();
    let sale = sales_service::record_sale(
        &state,
        &employee,
        RecordSaleRequest {
            item_id: oil.id,
            quantity: 3,
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(sale.total_price, 135_000);

    match rx.recv().await? {
        InventoryEvent::InventoryUpdate(items) => {
            let oil_now = items.iter().find(|i| i.id == oil.id).unwrap();
            assert_eq!(oil_now.available, 9);
        }
        other => panic!("expected inventoryUpdate first, got {other:?}"),
    }
    match rx.recv().await? {
        InventoryEvent::LowStockAlert(alert) => {
            assert_eq!(alert.item_id, oil.id);
            assert_eq!(alert.available, 9);
            assert_eq!(alert.threshold, 10);
        }
        other => panic!("expected lowStockAlert, got {other:?}"),
    }

    let oversell = sales_service::record_sale(
        &state,
        &employee,
        RecordSaleRequest {
            item_id: oil.id,
            quantity: 10,
        },
    )
    .await;
    assert!(matches!(oversell, Err(AppError::BadRequest(_))));

    let low = inventory_service::list_low_stock(&state, LowStockQuery::default())
        .await?
        .data
        .unwrap();
    assert!(low.items.iter().any(|i| i.id == oil.id));
    assert!(!low.items.iter().any(|i| i.id == petrol.id));

    // Orders: validation, supplier visibility, idempotent accept and receive.
    let missing_email = order_service::place_order(
        &state,
        &manager,
        PlaceOrderRequest {
            item_name: Some("Diesel".into()),
            quantity: Some(500),
            supplier_email: None,
        },
    )
    .await;
    assert!(matches!(missing_email, Err(AppError::BadRequest(_))));

    let order = order_service::place_order(
        &state,
        &manager,
        PlaceOrderRequest {
            item_name: Some("Diesel".into()),
            quantity: Some(500),
            supplier_email: Some("Supplier@Station.test".into()),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(order.status, OrderStatus::Pending);

    let visible = order_service::list_orders(&state, &supplier, OrderListQuery::default())
        .await?
        .data
        .unwrap();
    assert_eq!(visible.items.len(), 1);
    let hidden = order_service::list_orders(&state, &other_supplier, OrderListQuery::default())
        .await?
        .data
        .unwrap();
    assert!(hidden.items.is_empty());

    let early = order_service::receive_order(&state, &manager, order.id, diesel_delivery()).await;
    assert!(matches!(early, Err(AppError::BadRequest(_))));

    let forbidden = order_service::accept_order(&state, &other_supplier, order.id).await;
    assert!(matches!(forbidden, Err(AppError::Forbidden)));

    for _ in 0..2 {
        let accepted = order_service::accept_order(&state, &supplier, order.id)
            .await?
            .data
            .unwrap();
        assert_eq!(accepted.status, OrderStatus::Accepted);
    }

    let received = order_service::receive_order(&state, &manager, order.id, diesel_delivery())
        .await?
        .data
        .unwrap();
    assert_eq!(received.order.status, OrderStatus::Processed);
    assert_eq!(received.item.total_quantity, 500);

    let again = order_service::receive_order(&state, &manager, order.id, diesel_delivery())
        .await?
        .data
        .unwrap();
    assert_eq!(again.item.id, received.item.id);
    assert_eq!(again.item.total_quantity, 500);

    let still_processed = order_service::accept_order(&state, &admin, order.id)
        .await?
        .data
        .unwrap();
    assert_eq!(still_processed.status, OrderStatus::Processed);

    // Promotions: expired codes are rejected, live ones are consumed.
    let summer = promo_service::create_promo(
        &state,
        &admin,
        CreatePromoRequest {
            code: "SUMMER".into(),
            kind: PromoKind::Percentage,
            value: 10,
            ends_at: Utc::now() - Duration::days(1),
            usage_limit: 5,
        },
    )
    .await?
    .data
    .unwrap();
    let expired = promo_service::apply_promo(
        &state,
        &employee,
        ApplyPromoRequest {
            code: "SUMMER".into(),
            total_amount: 10_000,
        },
    )
    .await;
    match expired {
        Err(AppError::BadRequest(message)) => {
            assert!(message.contains("Invalid or expired promo code"))
        }
        other => panic!("expected expired promo to be rejected, got {other:?}"),
    }
    let redeemed = promo_service::redeem(&state.orm, "SUMMER", 10_000, Utc::now()).await;
    assert!(matches!(redeemed, Err(AppError::BadRequest(_))));
    let summer = promo_service::get_promo(&state, summer.id)
        .await?
        .data
        .unwrap();
    assert_eq!(summer.used_count, 0);
    assert!(summer.expired);

    promo_service::create_promo(
        &state,
        &admin,
        CreatePromoRequest {
            code: "ONCE".into(),
            kind: PromoKind::Fixed,
            value: 2_500,
            ends_at: Utc::now() + Duration::days(1),
            usage_limit: 1,
        },
    )
    .await?;

    // Bills: the promo is redeemed inside the bill and only once.
    let bill = bill_service::create_bill(
        &state,
        &employee,
        CreateBillRequest {
            customer_name: "Walk-in".into(),
            customer_contact: None,
            items: vec![BillLineRequest {
                item_id: Some(petrol.id),
                name: "Petrol".into(),
                unit_price: 36_500,
                quantity: 2,
            }],
            promo_code: Some("ONCE".into()),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(bill.bill.subtotal, 73_000);
    assert_eq!(bill.bill.discount, 2_500);
    assert_eq!(bill.bill.total_amount, 70_500);
    assert_eq!(bill.items.len(), 1);

    let used_up = promo_service::apply_promo(
        &state,
        &employee,
        ApplyPromoRequest {
            code: "ONCE".into(),
            total_amount: 10_000,
        },
    )
    .await;
    assert!(matches!(used_up, Err(AppError::BadRequest(_))));

    let forbidden_delete = bill_service::delete_bill(&state, &manager, bill.bill.id).await;
    assert!(matches!(forbidden_delete, Err(AppError::Forbidden)));
    bill_service::delete_bill(&state, &admin, bill.bill.id).await?;
    let bills = bill_service::list_bills(&state, BillListQuery::default())
        .await?
        .data
        .unwrap();
    assert!(!bills.items.iter().any(|b| b.id == bill.bill.id));

    // Bills: replacing the lines recomputes totals and caps the kept discount.
    promo_service::create_promo(
        &state,
        &admin,
        CreatePromoRequest {
            code: "BIG".into(),
            kind: PromoKind::Fixed,
            value: 5_000,
            ends_at: Utc::now() + Duration::days(1),
            usage_limit: 1,
        },
    )
    .await?;
    let bill = bill_service::create_bill(
        &state,
        &employee,
        CreateBillRequest {
            customer_name: "Fleet".into(),
            customer_contact: Some("fleet@example.test".into()),
            items: vec![BillLineRequest {
                item_id: Some(petrol.id),
                name: "Petrol".into(),
                unit_price: 36_500,
                quantity: 2,
            }],
            promo_code: Some("BIG".into()),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(bill.bill.discount, 5_000);

    let cheap_line = BillLineRequest {
        item_id: None,
        name: "Air".into(),
        unit_price: 3_000,
        quantity: 1,
    };
    let forbidden_update = bill_service::update_bill(
        &state,
        &employee,
        bill.bill.id,
        UpdateBillRequest {
            items: Some(vec![cheap_line.clone()]),
            ..Default::default()
        },
    )
    .await;
    assert!(matches!(forbidden_update, Err(AppError::Forbidden)));

    bill_service::update_bill(
        &state,
        &manager,
        bill.bill.id,
        UpdateBillRequest {
            items: Some(vec![cheap_line]),
            ..Default::default()
        },
    )
    .await?;
    let stored = bill_service::get_bill(&state, bill.bill.id)
        .await?
        .data
        .unwrap();
    assert_eq!(stored.bill.subtotal, 3_000);
    assert_eq!(stored.bill.discount, 3_000);
    assert_eq!(stored.bill.total_amount, 0);
    assert_eq!(stored.items.len(), 1);
    assert_eq!(stored.items[0].name, "Air");

    // Inventory: renaming onto an existing (kind, name) is a conflict, not a 500.
    let wax = create_shop_item(&state, &manager, "Wax", 40).await?;
    let coolant = create_shop_item(&state, &manager, "Coolant", 40).await?;
    let renamed = inventory_service::update_item(
        &state,
        &manager,
        coolant.id,
        UpdateItemRequest {
            name: Some(" Wax ".into()),
            ..Default::default()
        },
    )
    .await;
    assert!(matches!(renamed, Err(AppError::Conflict(_))));

    // Inventory: deletes are broadcast as a fresh snapshot.
    let mut deletes = state.notifier.subscribe();
    inventory_service::delete_item(&state, &admin, coolant.id).await?;
    match deletes.recv().await? {
        InventoryEvent::InventoryUpdate(items) => {
            assert!(!items.iter().any(|i| i.id == coolant.id));
            assert!(items.iter().any(|i| i.id == wax.id));
        }
        other => panic!("expected inventoryUpdate after delete, got {other:?}"),
    }
    drop(deletes);

    // Realtime: a new socket gets the current snapshot, then restocks as they happen.
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let app = build_app(state.clone());
    tokio::spawn(async move { axum::serve(listener, app).await });

    let (mut socket, _) = connect_async(format!("ws://{addr}/ws")).await?;
    match next_event(&mut socket).await? {
        InventoryEvent::InventoryUpdate(items) => {
            let oil_now = items.iter().find(|i| i.id == oil.id).unwrap();
            assert_eq!(oil_now.available, 9);
            assert!(items.iter().any(|i| i.id == wax.id));
            assert!(!items.iter().any(|i| i.id == coolant.id));
        }
        other => panic!("expected snapshot on connect, got {other:?}"),
    }
    match next_event(&mut socket).await? {
        InventoryEvent::LowStockAlert(alert) => assert_eq!(alert.item_id, oil.id),
        other => panic!("expected lowStockAlert for the snapshot, got {other:?}"),
    }

    let restocked = inventory_service::restock_item(
        &state,
        &manager,
        oil.id,
        RestockRequest { quantity: 20 },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(restocked.available, 29);
    match next_event(&mut socket).await? {
        InventoryEvent::InventoryUpdate(items) => {
            let oil_now = items.iter().find(|i| i.id == oil.id).unwrap();
            assert_eq!(oil_now.total_quantity, 32);
            assert_eq!(oil_now.available, 29);
        }
        other => panic!("expected inventoryUpdate after restock, got {other:?}"),
    }
    drop(socket);

    // Orders: receiving into an existing item also applies the new prices.
    let reorder = order_service::place_order(
        &state,
        &manager,
        PlaceOrderRequest {
            item_name: Some("Diesel".into()),
            quantity: Some(500),
            supplier_email: Some("supplier@station.test".into()),
        },
    )
    .await?
    .data
    .unwrap();
    order_service::accept_order(&state, &supplier, reorder.id).await?;
    let topped_up = order_service::receive_order(
        &state,
        &manager,
        reorder.id,
        ReceiveOrderRequest {
            kind: ItemKind::Fuel,
            wholesale_price: 31_000,
            unit_price: Some(35_500),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(topped_up.item.id, received.item.id);
    assert_eq!(topped_up.item.total_quantity, 1_000);
    assert_eq!(topped_up.item.unit_price, 35_500);
    assert_eq!(topped_up.item.wholesale_price, Some(31_000));

    // Staff: one attendance row per user per day, updated in place.
    let day = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
    let first = staff_service::mark_attendance(
        &state,
        &employee,
        attendance(None, day, AttendanceStatus::Present),
    )
    .await?
    .data
    .unwrap();
    let second = staff_service::mark_attendance(
        &state,
        &employee,
        attendance(None, day, AttendanceStatus::Late),
    )
    .await?
    .data
    .unwrap();
    assert_eq!(first.id, second.id);
    assert_eq!(second.status, AttendanceStatus::Late);

    let marked = staff_service::list_attendance(&state, &employee, AttendanceQuery::default())
        .await?;
    assert_eq!(marked.meta.as_ref().and_then(|m| m.total), Some(1));
    assert_eq!(marked.data.unwrap().items[0].status, AttendanceStatus::Late);

    let ghost = staff_service::mark_attendance(
        &state,
        &admin,
        attendance(Some(Uuid::new_v4()), day, AttendanceStatus::Present),
    )
    .await;
    assert!(matches!(ghost, Err(AppError::BadRequest(_))));

    // Staff: a leave decision is stored once and cannot be changed.
    let leave = staff_service::request_leave(
        &state,
        &employee,
        CreateLeaveRequest {
            start_date: day,
            end_date: day + Duration::days(2),
            reason: "Family visit".into(),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(leave.status, LeaveStatus::Pending);

    let self_approval = staff_service::decide_leave(
        &state,
        &employee,
        leave.id,
        DecideLeaveRequest {
            status: LeaveStatus::Approved,
        },
    )
    .await;
    assert!(matches!(self_approval, Err(AppError::Forbidden)));

    staff_service::decide_leave(
        &state,
        &manager,
        leave.id,
        DecideLeaveRequest {
            status: LeaveStatus::Approved,
        },
    )
    .await?;
    let approved = staff_service::list_leaves(
        &state,
        &employee,
        LeaveQuery {
            status: Some(LeaveStatus::Approved),
            ..Default::default()
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(approved.items.len(), 1);
    assert_eq!(approved.items[0].id, leave.id);
    assert_eq!(approved.items[0].decided_by, Some(manager.user_id));

    let redecided = staff_service::decide_leave(
        &state,
        &admin,
        leave.id,
        DecideLeaveRequest {
            status: LeaveStatus::Rejected,
        },
    )
    .await;
    match redecided {
        Err(AppError::BadRequest(message)) => assert!(message.contains("already decided")),
        other => panic!("expected a second decision to be rejected, got {other:?}"),
    }

    // Suppliers: CRUD with case-insensitive unique emails.
    let fuel_co = supplier_service::create_supplier(
        &state,
        &manager,
        CreateSupplierRequest {
            name: "Fuel Co".into(),
            email: "Sales@FuelCo.test".into(),
            phone: None,
            supplies: Some("Diesel, Petrol".into()),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(fuel_co.email, "sales@fuelco.test");

    let same_email = supplier_service::create_supplier(
        &state,
        &manager,
        CreateSupplierRequest {
            name: "Copycat".into(),
            email: "sales@fuelco.test".into(),
            phone: None,
            supplies: None,
        },
    )
    .await;
    assert!(matches!(same_email, Err(AppError::Conflict(_))));

    let updated = supplier_service::update_supplier(
        &state,
        &manager,
        fuel_co.id,
        UpdateSupplierRequest {
            phone: Some("+1 555 0100".into()),
            ..Default::default()
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(updated.phone.as_deref(), Some("+1 555 0100"));
    let fetched = supplier_service::get_supplier(&state, fuel_co.id)
        .await?
        .data
        .unwrap();
    assert_eq!(fetched.name, "Fuel Co");
    assert_eq!(fetched.phone.as_deref(), Some("+1 555 0100"));

    supplier_service::delete_supplier(&state, &manager, fuel_co.id).await?;
    let gone = supplier_service::get_supplier(&state, fuel_co.id).await;
    assert!(matches!(gone, Err(AppError::NotFound)));

    // Dashboard reports the configured threshold.
    let dashboard = dashboard_service::summary(&state, &admin)
        .await?
        .data
        .unwrap();
    assert_eq!(dashboard.low_stock_threshold, 10);
    assert_eq!(dashboard.low_stock_items, 0);
    assert!(!dashboard.recent_activity.is_empty());

    Ok(())
}

async fn next_event(socket: &mut Socket) -> anyhow::Result<InventoryEvent> {
    let message = tokio::time::timeout(StdDuration::from_secs(5), socket.next())
        .await?
        .ok_or_else(|| anyhow::anyhow!("socket closed"))??;
    Ok(serde_json::from_str(message.to_text()?)?)
}

async fn create_shop_item(
    state: &AppState,
    user: &AuthUser,
    name: &str,
    quantity: i64,
) -> anyhow::Result<station_manager_api::models::InventoryItem> {
    let item = inventory_service::create_item(
        state,
        user,
        CreateItemRequest {
            kind: ItemKind::Shop,
            name: name.into(),
            total_quantity: quantity,
            sold_quantity: None,
            unit_price: 12_000,
            wholesale_price: None,
        },
    )
    .await?
    .data
    .unwrap();
    Ok(item)
}

fn attendance(user_id: Option<Uuid>, day: NaiveDate, status: AttendanceStatus) -> MarkAttendanceRequest {
    MarkAttendanceRequest {
        user_id,
        work_date: Some(day),
        status,
        check_in: None,
        check_out: None,
    }
}

fn diesel_delivery() -> ReceiveOrderRequest {
    ReceiveOrderRequest {
        kind: ItemKind::Fuel,
        wholesale_price: 30_500,
        unit_price: Some(34_000),
    }
}

async fn setup_state(database_url: &str) -> anyhow::Result<AppState> {
    let pool = create_pool(database_url).await?;
    run_migrations(&pool).await?;

    // Clean tables between runs
    sqlx::query(
        "TRUNCATE TABLE bill_items, bills, sales, orders, promo_codes, suppliers, attendance, \
         leave_requests, inventory_items, audit_logs, users RESTART IDENTITY CASCADE",
    )
    .execute(&pool)
    .await?;

    let config = AppConfig {
        database_url: database_url.to_string(),
        host: "127.0.0.1".into(),
        port: 0,
        jwt_secret: "workflow-secret".into(),
        low_stock_threshold: 10,
        notifier_capacity: 64,
    };
    Ok(AppState::new(pool, &config))
}

async fn create_user(pool: &PgPool, email: &str, role: Role) -> anyhow::Result<AuthUser> {
    let user_id = Uuid::new_v4();
    sqlx::query("INSERT INTO users (id, email, password_hash, role) VALUES ($1, $2, $3, $4)")
        .bind(user_id)
        .bind(email)
        .bind("not-a-real-hash")
        .bind(role.as_str())
        .execute(pool)
        .await?;

    Ok(AuthUser {
        user_id,
        email: email.to_string(),
        role,
    })
}
