use crate::{
    config::AppConfig,
    db::{DbPool, OrmConn, create_orm_conn},
    notifier::Notifier,
};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
    pub notifier: Notifier,
    pub jwt_secret: String,
}

impl AppState {
    pub fn new(pool: DbPool, config: &AppConfig) -> Self {
        let orm = create_orm_conn(&pool);
        Self {
            pool,
            orm,
            notifier: Notifier::new(config.notifier_capacity, config.low_stock_threshold),
            jwt_secret: config.jwt_secret.clone(),
        }
    }
}
