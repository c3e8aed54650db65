//! Personalization engine — ingredient fit against a user's lab and
//! genetic profile.

mod llm;
mod rules;
pub mod tables;

pub use llm::LlmStrategy;
pub use rules::{score_rules, RulesStrategy};

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use veridose_common::{Ingredient, PersonalScore, UserHealthContext};

use crate::traits::ContextProvider;

/// One of the two scoring modes. Strategies are total: they always produce
/// a score, degrading internally rather than erroring.
#[async_trait]
pub trait PersonalizationStrategy: Send + Sync {
    async fn score(&self, ctx: &UserHealthContext, ingredients: &[Ingredient]) -> PersonalScore;
}

/// Loads the user's health context and applies the configured strategy.
pub struct PersonalizationEngine {
    context: Arc<dyn ContextProvider>,
    strategy: Arc<dyn PersonalizationStrategy>,
}

impl PersonalizationEngine {
    pub fn new(
        context: Arc<dyn ContextProvider>,
        strategy: Arc<dyn PersonalizationStrategy>,
    ) -> Self {
        Self { context, strategy }
    }

    /// Never fails. A context-service outage scores the user as having an
    /// empty profile rather than aborting the verdict.
    pub async fn score_personal(
        &self,
        user_id: &str,
        ingredients: &[Ingredient],
    ) -> PersonalScore {
        let ctx = match self.context.full_context(user_id).await {
            Ok(ctx) => ctx,
            Err(e) => {
                warn!(user_id, error = %e, "Context service unavailable, scoring without profile");
                UserHealthContext::default()
            }
        };
        self.strategy.score(&ctx, ingredients).await
    }
}
