use chrono::{Duration, Utc};
use station_manager_api::{
    config::AppConfig,
    db::{create_pool, run_migrations},
    models::Role,
    services::auth_service::hash_password,
};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    run_migrations(&pool).await?;

    let users = [
        ("admin@station.local", "admin123", "Station Admin", Role::Admin),
        ("manager@station.local", "manager123", "Shift Manager", Role::Manager),
        ("supplier@station.local", "supplier123", "Fuel Supplier", Role::Supplier),
        ("employee@station.local", "employee123", "Pump Attendant", Role::Employee),
    ];
    let mut admin_id = None;
    for (email, password, name, role) in users {
        let id = ensure_user(&pool, email, password, name, role).await?;
        if role == Role::Admin {
            admin_id = Some(id);
        }
    }
    seed_inventory(&pool).await?;
    seed_supplier(&pool).await?;
    seed_promo(&pool).await?;

    if let Some(admin_id) = admin_id {
        println!("Seed completed. Admin ID: {admin_id}");
    }
    Ok(())
}

async fn ensure_user(
    pool: &sqlx::PgPool,
    email: &str,
    password: &str,
    name: &str,
    role: Role,
) -> anyhow::Result<Uuid> {
    let password_hash = hash_password(password)?;

    let (user_id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO users (id, email, name, password_hash, role)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(name)
    .bind(password_hash)
    .bind(role.as_str())
    .fetch_one(pool)
    .await?;

    println!("Ensured user {email} (role={})", role.as_str());
    Ok(user_id)
}

async fn seed_inventory(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    // prices in minor units; fuel quantities in litres
    let items = [
        ("fuel", "Petrol", 20_000_i64, 36_500_i64, 32_000_i64),
        ("fuel", "Diesel", 15_000, 34_000, 30_500),
        ("shop", "Engine Oil 1L", 60, 45_000, 38_000),
        ("shop", "Coolant 500ml", 8, 18_000, 14_500),
    ];

    for (kind, name, total, unit_price, wholesale_price) in items {
        sqlx::query(
            r#"
            INSERT INTO inventory_items (id, kind, name, total_quantity, unit_price, wholesale_price)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (kind, name) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(kind)
        .bind(name)
        .bind(total)
        .bind(unit_price)
        .bind(wholesale_price)
        .execute(pool)
        .await?;
    }

    println!("Seeded inventory");
    Ok(())
}

async fn seed_supplier(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO suppliers (id, name, email, phone, supplies)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (email) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .bind("Fuel Supplier")
    .bind("supplier@station.local")
    .bind("+1 555 0100")
    .bind("Petrol, Diesel")
    .execute(pool)
    .await?;

    println!("Seeded supplier");
    Ok(())
}

async fn seed_promo(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO promo_codes (id, code, kind, value, ends_at, usage_limit)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (code) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .bind("WELCOME10")
    .bind("percentage")
    .bind(10_i64)
    .bind(Utc::now() + Duration::days(30))
    .bind(100_i64)
    .execute(pool)
    .await?;

    println!("Seeded promo code WELCOME10");
    Ok(())
}
