//! Pipeline orchestration: validate → resolve → cache check → extract →
//! score (science ∥ personal) → combine → persist → respond.
//!
//! Every terminal state, success or failure, writes exactly one run-log
//! row. The whole run is bounded by a single request deadline so a hung
//! provider cannot pin a request open.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use veridose_common::{
    CheckRequest, ProductRef, ProductVerdict, RunLogEntry, VeridoseError,
};

use crate::claims;
use crate::combine::{combine, emoji_for};
use crate::evidence::EvidenceScorer;
use crate::ingredients::IngredientExtractor;
use crate::personalization::PersonalizationEngine;
use crate::resolver::{self, ResolveInput, Resolver};
use crate::traits::{RunLog, VerdictCache};

#[derive(Default)]
struct RunTrace {
    product_id: String,
    cache_hit: bool,
    tokens_used: i64,
}

pub struct Orchestrator {
    resolver: Resolver,
    ingredients: IngredientExtractor,
    evidence: EvidenceScorer,
    personalization: PersonalizationEngine,
    verdict_cache: Arc<dyn VerdictCache>,
    run_log: Arc<dyn RunLog>,
    deadline: Duration,
}

impl Orchestrator {
    pub fn new(
        resolver: Resolver,
        ingredients: IngredientExtractor,
        evidence: EvidenceScorer,
        personalization: PersonalizationEngine,
        verdict_cache: Arc<dyn VerdictCache>,
        run_log: Arc<dyn RunLog>,
        deadline: Duration,
    ) -> Self {
        Self {
            resolver,
            ingredients,
            evidence,
            personalization,
            verdict_cache,
            run_log,
            deadline,
        }
    }

    /// Run the full pipeline for one request.
    pub async fn check(&self, req: &CheckRequest) -> Result<ProductVerdict, VeridoseError> {
        let started = Instant::now();
        let mut trace = RunTrace::default();

        let result = match ResolveInput::from_payload(req) {
            Ok(input) => {
                match tokio::time::timeout(self.deadline, self.execute(req, &input, &mut trace))
                    .await
                {
                    Ok(result) => result,
                    Err(_) => Err(VeridoseError::Provider(format!(
                        "request deadline of {}s exceeded",
                        self.deadline.as_secs()
                    ))),
                }
            }
            Err(e) => Err(e),
        };

        self.run_log
            .log(RunLogEntry {
                user_id: req.user_id.clone(),
                product_id: trace.product_id.clone(),
                elapsed_ms: started.elapsed().as_millis() as i64,
                tokens_used: trace.tokens_used,
                cache_hit: trace.cache_hit,
                error: result.as_ref().err().map(|e| e.to_string()),
            })
            .await;

        result
    }

    async fn execute(
        &self,
        req: &CheckRequest,
        input: &ResolveInput,
        trace: &mut RunTrace,
    ) -> Result<ProductVerdict, VeridoseError> {
        let product = self.resolver.resolve(input).await?;
        trace.product_id = product.id.clone();
        trace.tokens_used += product.tokens_used as i64;

        let product_key = resolver::cache_key(input, &product);

        // A cache read failure is recoverable — recompute instead of abort.
        match self.verdict_cache.get(&req.user_id, &product_key).await {
            Ok(Some(cached)) => {
                info!(user_id = %req.user_id, product_key, "Verdict cache hit");
                trace.cache_hit = true;
                return Ok(cached);
            }
            Ok(None) => {}
            Err(e) => warn!(product_key, error = %e, "Verdict cache read failed"),
        }

        let ingredients = self.ingredients.extract(&product).await;
        let claims = claims::extract_claims(&product);

        // Independent scorers run concurrently; both are total.
        let (science, personal) = tokio::join!(
            self.evidence.score_science(&claims),
            self.personalization.score_personal(&req.user_id, &ingredients),
        );
        trace.tokens_used += (science.tokens_used + personal.tokens_used) as i64;

        let overall = combine(science.score, personal.score);
        let verdict = ProductVerdict {
            product: ProductRef::from(&product),
            score: overall,
            emoji: emoji_for(overall).to_string(),
            summary: personal.summary.clone(),
            science,
            personal,
            ingredients,
            claims,
        };

        // Final persistence is the one post-resolve step allowed to abort.
        self.verdict_cache
            .put(&req.user_id, &product_key, &verdict)
            .await
            .map_err(|e| VeridoseError::Database(e.to_string()))?;

        info!(
            user_id = %req.user_id,
            product_key,
            score = verdict.score,
            science = verdict.science.score,
            personal = verdict.personal.score,
            "Verdict computed"
        );

        Ok(verdict)
    }
}
