//! 30-day claim verdict cache shared across users and products.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use sqlx::{PgPool, Row};

use veridose_common::{ClaimVerdict, SupportLevel, CLAIM_CACHE_TTL_DAYS};
use veridose_pipeline::traits::ClaimCache;

pub struct PgClaimCache {
    pool: PgPool,
}

impl PgClaimCache {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClaimCache for PgClaimCache {
    async fn get(&self, claim_key: &str) -> Result<Option<ClaimVerdict>> {
        let row = sqlx::query(
            r#"
            SELECT claim, verdict, pmid, title, abstract_text, blurb
            FROM claim_cache
            WHERE claim_key = $1
              AND updated_at > NOW() - make_interval(days => $2)
            "#,
        )
        .bind(claim_key)
        .bind(CLAIM_CACHE_TTL_DAYS as i32)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let raw: String = row.try_get("verdict")?;
        let verdict = SupportLevel::parse(&raw)
            .ok_or_else(|| anyhow!("Unknown support level in claim_cache: {raw}"))?;

        // The key is normalized; the claim column keeps the text as submitted.
        Ok(Some(ClaimVerdict {
            claim: row.try_get("claim")?,
            verdict,
            pmid: row.try_get("pmid")?,
            title: row.try_get("title")?,
            abstract_text: row.try_get("abstract_text")?,
            blurb: row.try_get("blurb")?,
        }))
    }

    async fn put(&self, claim_key: &str, verdict: &ClaimVerdict) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO claim_cache (claim_key, claim, verdict, pmid, title, abstract_text, blurb, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, NOW())
            ON CONFLICT (claim_key) DO UPDATE SET
                claim = EXCLUDED.claim,
                verdict = EXCLUDED.verdict,
                pmid = EXCLUDED.pmid,
                title = EXCLUDED.title,
                abstract_text = EXCLUDED.abstract_text,
                blurb = EXCLUDED.blurb,
                updated_at = NOW()
            "#,
        )
        .bind(claim_key)
        .bind(&verdict.claim)
        .bind(verdict.verdict.as_str())
        .bind(&verdict.pmid)
        .bind(&verdict.title)
        .bind(&verdict.abstract_text)
        .bind(&verdict.blurb)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
