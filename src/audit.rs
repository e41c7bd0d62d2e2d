use serde_json::Value;
use uuid::Uuid;

use crate::{db::DbPool, error::AppResult};

async fn insert_entry(
    pool: &DbPool,
    user_id: Uuid,
    action: &str,
    resource: &str,
    metadata: &Value,
) -> AppResult<()> {
    sqlx::query(
        r#"
        INSERT INTO audit_logs (id, user_id, action, resource, metadata)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(action)
    .bind(resource)
    .bind(metadata)
    .execute(pool)
    .await?;

    Ok(())
}

/// Record who changed what. Runs after the change has committed, so a failed
/// insert is logged and never turns a successful request into an error.
pub async fn record(pool: &DbPool, user_id: Uuid, action: &str, resource: &str, metadata: Value) {
    match insert_entry(pool, user_id, action, resource, &metadata).await {
        Ok(()) => tracing::debug!(%user_id, action, resource, "audit entry written"),
        Err(err) => tracing::warn!(error = %err, %user_id, action, "audit log failed"),
    }
}
