//! Best-effort admin activity log.

use serde_json::Value;
use sqlx::PgPool;

use hans_institute_core::UserId;

use crate::db::ActivityRepository;

/// Record an admin write. A failure is logged and otherwise ignored; the
/// write being audited has already succeeded.
pub async fn record_activity(pool: &PgPool, user_id: UserId, action: &str, details: Option<Value>) {
    if let Err(e) = ActivityRepository::new(pool)
        .record(user_id, action, details.as_ref())
        .await
    {
        tracing::warn!(user_id = %user_id, action, error = %e, "Failed to record activity");
    }
}
