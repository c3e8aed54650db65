//! 7-day per-(user, product) verdict cache.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{PgPool, Row};

use veridose_common::{ProductVerdict, VERDICT_CACHE_TTL_DAYS};
use veridose_pipeline::traits::VerdictCache;

pub struct PgVerdictCache {
    pool: PgPool,
}

impl PgVerdictCache {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VerdictCache for PgVerdictCache {
    async fn get(&self, user_id: &str, product_key: &str) -> Result<Option<ProductVerdict>> {
        let row = sqlx::query(
            r#"
            SELECT verdict
            FROM verdict_cache
            WHERE user_id = $1 AND product_key = $2
              AND updated_at > NOW() - make_interval(days => $3)
            "#,
        )
        .bind(user_id)
        .bind(product_key)
        .bind(VERDICT_CACHE_TTL_DAYS as i32)
        .fetch_optional(&self.pool)
        .await?;

        Ok(match row {
            Some(row) => {
                let Json(verdict): Json<ProductVerdict> = row.try_get("verdict")?;
                Some(verdict)
            }
            None => None,
        })
    }

    async fn put(&self, user_id: &str, product_key: &str, verdict: &ProductVerdict) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO verdict_cache (user_id, product_key, verdict, updated_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (user_id, product_key) DO UPDATE SET
                verdict = EXCLUDED.verdict,
                updated_at = NOW()
            "#,
        )
        .bind(user_id)
        .bind(product_key)
        .bind(Json(verdict))
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
