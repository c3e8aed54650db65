//! LLM holistic personalization — optional upgrade over rules mode.

use ai_client::Claude;
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use tracing::warn;

use veridose_common::{Ingredient, PersonalScore, UserHealthContext};

use super::rules::score_rules;
use super::PersonalizationStrategy;

const HOLISTIC_SYSTEM_PROMPT: &str = "You are a supplement personalization analyst. Given a \
user's health context (allergies, goals, lab biomarkers, genetic variants) and a product's \
ingredient list, score how well the product fits this specific user from 0 (harmful or \
useless for them) to 100 (directly addresses their measured needs). Return a short summary \
and 2-5 plain-language bullets, each tied to a concrete ingredient and a concrete part of \
their context. Never invent lab values or genotypes not present in the context.";

#[derive(Debug, Deserialize, JsonSchema)]
struct HolisticAssessment {
    /// 0-100 personal fit score.
    score: i64,
    summary: String,
    bullets: Vec<String>,
}

/// Decorator over [`RulesStrategy`]: asks the model for a narrative
/// assessment, and silently falls back to the deterministic rules score on
/// any provider failure.
pub struct LlmStrategy {
    claude: Claude,
}

impl LlmStrategy {
    pub fn new(claude: Claude) -> Self {
        Self { claude }
    }

    fn build_prompt(ctx: &UserHealthContext, ingredients: &[Ingredient]) -> String {
        let context_json =
            serde_json::to_string_pretty(ctx).unwrap_or_else(|_| "{}".to_string());
        let ingredient_lines: Vec<String> = ingredients
            .iter()
            .map(|i| match &i.amount {
                Some(amount) => format!("- {} ({})", i.name, amount),
                None => format!("- {}", i.name),
            })
            .collect();
        format!(
            "User health context:\n{}\n\nProduct ingredients:\n{}",
            context_json,
            ingredient_lines.join("\n")
        )
    }
}

#[async_trait]
impl PersonalizationStrategy for LlmStrategy {
    async fn score(&self, ctx: &UserHealthContext, ingredients: &[Ingredient]) -> PersonalScore {
        let prompt = Self::build_prompt(ctx, ingredients);

        match self
            .claude
            .extract_metered::<HolisticAssessment>(HOLISTIC_SYSTEM_PROMPT, prompt)
            .await
        {
            Ok((assessment, tokens)) => {
                let mut bullets = assessment.bullets;
                if bullets.is_empty() {
                    bullets.push(
                        "No specific personalization factors detected for your profile."
                            .to_string(),
                    );
                }
                PersonalScore {
                    score: assessment.score.clamp(0, 100) as u8,
                    bullets,
                    summary: Some(assessment.summary),
                    tokens_used: tokens,
                }
            }
            Err(e) => {
                warn!(error = %e, "Holistic personalization failed, falling back to rules");
                score_rules(ctx, ingredients)
            }
        }
    }
}
