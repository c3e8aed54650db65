//! Append-only run telemetry. Insert failures are logged and swallowed so
//! telemetry can never fail a request.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::warn;

use veridose_common::RunLogEntry;
use veridose_pipeline::traits::RunLog;

pub struct PgRunLog {
    pool: PgPool,
}

impl PgRunLog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RunLog for PgRunLog {
    async fn log(&self, entry: RunLogEntry) {
        let result = sqlx::query(
            r#"
            INSERT INTO run_log (user_id, product_id, elapsed_ms, tokens_used, cache_hit, error)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(&entry.user_id)
        .bind(&entry.product_id)
        .bind(entry.elapsed_ms)
        .bind(entry.tokens_used)
        .bind(entry.cache_hit)
        .bind(&entry.error)
        .execute(&self.pool)
        .await;

        if let Err(e) = result {
            warn!(user_id = %entry.user_id, error = %e, "Run log insert failed");
        }
    }
}
