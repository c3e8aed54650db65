//! Idempotent schema bootstrap, run once at startup.

use anyhow::Result;
use sqlx::PgPool;
use tracing::info;

pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS claim_cache (
            claim_key     TEXT PRIMARY KEY,
            claim         TEXT NOT NULL,
            verdict       TEXT NOT NULL,
            pmid          TEXT,
            title         TEXT,
            abstract_text TEXT,
            blurb         TEXT,
            updated_at    TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS verdict_cache (
            user_id     TEXT NOT NULL,
            product_key TEXT NOT NULL,
            verdict     JSONB NOT NULL,
            updated_at  TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            PRIMARY KEY (user_id, product_key)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS run_log (
            id          BIGSERIAL PRIMARY KEY,
            user_id     TEXT NOT NULL,
            product_id  TEXT NOT NULL,
            elapsed_ms  BIGINT NOT NULL,
            tokens_used BIGINT NOT NULL,
            cache_hit   BOOLEAN NOT NULL,
            error       TEXT,
            created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    info!("Schema ensured");
    Ok(())
}
