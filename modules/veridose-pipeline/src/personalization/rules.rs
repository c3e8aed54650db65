//! Deterministic rules-mode personalization.

use async_trait::async_trait;

use veridose_common::{
    Ingredient, IngredientQuality, PersonalScore, UserHealthContext, ALLERGY_CONFLICT_PENALTY,
    PERSONAL_BASE_SCORE, QUALITY_BONUS_MAX,
};

use super::tables::{first_matching_compound, Direction, BIOMARKER_RULES, GENOTYPE_RULES};
use super::PersonalizationStrategy;

/// Threshold-and-table scoring. Pure: same context and ingredients always
/// produce the same score and bullets.
pub struct RulesStrategy;

#[async_trait]
impl PersonalizationStrategy for RulesStrategy {
    async fn score(&self, ctx: &UserHealthContext, ingredients: &[Ingredient]) -> PersonalScore {
        score_rules(ctx, ingredients)
    }
}

pub fn score_rules(ctx: &UserHealthContext, ingredients: &[Ingredient]) -> PersonalScore {
    let mut score: i32 = PERSONAL_BASE_SCORE;
    let mut bullets: Vec<String> = Vec::new();

    let names: Vec<String> = ingredients.iter().map(|i| i.name.to_lowercase()).collect();

    // Allergy conflicts: one flat penalty, one bullet naming everything hit.
    let conflicts: Vec<&str> = ctx
        .allergies
        .iter()
        .map(|a| a.trim())
        .filter(|a| !a.is_empty())
        .filter(|a| {
            let needle = a.to_lowercase();
            names.iter().any(|n| n.contains(&needle))
        })
        .collect();
    if !conflicts.is_empty() {
        score -= ALLERGY_CONFLICT_PENALTY;
        bullets.push(format!(
            "Contains ingredients matching your declared allergies: {}",
            conflicts.join(", ")
        ));
    }

    // Ingredient quality bonus. The extractor guarantees a non-empty list.
    let good = ingredients
        .iter()
        .filter(|i| i.quality == IngredientQuality::Good)
        .count();
    let good_ratio = good as f64 / ingredients.len() as f64;
    score += (QUALITY_BONUS_MAX * good_ratio).round() as i32;

    // Lab biomarkers against the threshold table.
    for rule in BIOMARKER_RULES {
        let value = match rule.aliases.iter().find_map(|alias| ctx.biomarker(alias)) {
            Some(v) => v,
            None => continue,
        };
        if !rule.direction.triggered(value, rule.threshold) {
            continue;
        }
        if let Some(compound) = first_matching_compound(&names, rule.compounds) {
            score += rule.delta;
            bullets.push(biomarker_bullet(rule.label, value, rule.threshold, rule.unit, rule.direction, rule.delta, compound));
        }
    }

    // Genetic variants against the genotype table.
    for rule in GENOTYPE_RULES {
        let genotype = match ctx.genotype(rule.rsid) {
            Some(g) => g,
            None => continue,
        };
        if !rule.genotypes.contains(&genotype.as_str()) {
            continue;
        }
        if let Some(compound) = first_matching_compound(&names, rule.indicated) {
            score += rule.indicated_delta;
            bullets.push(format!(
                "{} {} ({}): this product's {} is a good match — {}.",
                rule.gene,
                rule.variant,
                genotype,
                compound,
                rule.indicated_why
            ));
        }
        if let Some(compound) = first_matching_compound(&names, rule.contraindicated) {
            score += rule.contraindicated_delta;
            bullets.push(format!(
                "{} {} ({}): caution with {} — {}.",
                rule.gene,
                rule.variant,
                genotype,
                compound,
                rule.contraindicated_why
            ));
        }
    }

    if bullets.is_empty() {
        bullets.push("No specific personalization factors detected for your profile.".to_string());
    }

    PersonalScore {
        score: score.clamp(0, 100) as u8,
        bullets,
        summary: None,
        tokens_used: 0,
    }
}

fn biomarker_bullet(
    label: &str,
    value: f64,
    threshold: f64,
    unit: &str,
    direction: Direction,
    delta: i32,
    compound: &str,
) -> String {
    match direction {
        Direction::Below => format!(
            "Your {label} is low ({value} {unit}; optimal ≥ {threshold}) — the {compound} in this product addresses that."
        ),
        Direction::Above if delta < 0 => format!(
            "Your {label} is high ({value} {unit}; optimal ≤ {threshold}) — {compound} is not advised at that level."
        ),
        Direction::Above => format!(
            "Your {label} is high ({value} {unit}; optimal ≤ {threshold}) — the {compound} in this product may help bring it down."
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn good(name: &str) -> Ingredient {
        Ingredient {
            name: name.to_string(),
            amount: None,
            quality: IngredientQuality::Good,
        }
    }

    fn questionable(name: &str) -> Ingredient {
        Ingredient {
            name: name.to_string(),
            amount: None,
            quality: IngredientQuality::Questionable,
        }
    }

    #[test]
    fn base_score_with_clean_ingredients() {
        let ctx = UserHealthContext::default();
        let score = score_rules(&ctx, &[good("Vitamin C")]);
        // base 80 + full quality bonus 10
        assert_eq!(score.score, 90);
        assert_eq!(score.bullets.len(), 1);
        assert!(score.bullets[0].contains("No specific personalization factors"));
    }

    #[test]
    fn quality_bonus_scales_with_good_ratio() {
        let ctx = UserHealthContext::default();
        let score = score_rules(&ctx, &[good("Vitamin C"), questionable("Talc")]);
        // base 80 + round(10 * 0.5)
        assert_eq!(score.score, 85);
    }

    #[test]
    fn allergy_conflict_penalizes_and_explains() {
        let mut ctx = UserHealthContext::default();
        ctx.allergies.push("soy".to_string());
        let score = score_rules(&ctx, &[good("Soy Lecithin")]);
        // base 80 - 30 + 10
        assert_eq!(score.score, 60);
        assert!(score.bullets.iter().any(|b| b.contains("soy")));
    }

    #[test]
    fn low_vitamin_d_plus_d3_product_scores_up() {
        let mut ctx = UserHealthContext::default();
        ctx.biomarkers.insert("vitamin_d".to_string(), 20.0);
        let without = score_rules(&ctx, &[good("Calcium Carbonate")]);
        let with = score_rules(&ctx, &[good("Vitamin D3 (Cholecalciferol)")]);
        assert_eq!(with.score, without.score + 10);
        assert!(with.bullets.iter().any(|b| b.contains("vitamin D")));
    }

    #[test]
    fn hemochromatosis_genotype_flags_iron_sharply() {
        let mut ctx = UserHealthContext::default();
        ctx.genotypes
            .insert("rs1800562".to_string(), "AA".to_string());
        let score = score_rules(&ctx, &[good("Iron (as Ferrous Bisglycinate)")]);
        // base 80 + 10 quality - 20 contraindicated
        assert_eq!(score.score, 70);
        assert!(score
            .bullets
            .iter()
            .any(|b| b.contains("HFE") && b.to_lowercase().contains("iron")));
    }

    #[test]
    fn mthfr_heterozygote_rewards_methylfolate() {
        let mut ctx = UserHealthContext::default();
        ctx.genotypes
            .insert("rs1801133".to_string(), "T/C".to_string());
        let score = score_rules(&ctx, &[good("L-Methylfolate")]);
        assert_eq!(score.score, 100); // 80 + 10 quality + 10 indicated
        assert!(score.bullets.iter().any(|b| b.contains("MTHFR")));
    }

    #[test]
    fn mthfr_penalizes_plain_folic_acid() {
        let mut ctx = UserHealthContext::default();
        ctx.genotypes
            .insert("rs1801133".to_string(), "TT".to_string());
        let score = score_rules(&ctx, &[good("Folic Acid")]);
        // 80 + 10 quality - 8 contraindicated
        assert_eq!(score.score, 82);
        assert!(score.bullets.iter().any(|b| b.contains("caution")));
    }

    #[test]
    fn score_is_clamped_to_bounds() {
        let mut ctx = UserHealthContext::default();
        ctx.allergies.push("iron".to_string());
        ctx.genotypes
            .insert("rs1800562".to_string(), "AA".to_string());
        ctx.biomarkers.insert("ferritin".to_string(), 500.0);
        let score = score_rules(
            &ctx,
            &[questionable("Iron Oxide with Talc")],
        );
        // 80 - 30 + 0 - 15 - 20 = 15, still within bounds but verify no underflow path
        assert_eq!(score.score, 15);

        let mut ctx = UserHealthContext::default();
        ctx.biomarkers.insert("vitamin_d".to_string(), 10.0);
        ctx.biomarkers.insert("magnesium".to_string(), 1.2);
        ctx.biomarkers.insert("b12".to_string(), 200.0);
        ctx.genotypes
            .insert("rs1801133".to_string(), "TT".to_string());
        let score = score_rules(
            &ctx,
            &[
                good("Vitamin D3"),
                good("Magnesium Glycinate"),
                good("Methylcobalamin (B12)"),
                good("L-Methylfolate"),
            ],
        );
        // 80 + 10 + 10 + 10 + 10 + 10 = 130 → clamped
        assert_eq!(score.score, 100);
    }

    #[test]
    fn elevated_ferritin_penalizes_iron_product() {
        let mut ctx = UserHealthContext::default();
        ctx.biomarkers.insert("Ferritin".to_string(), 450.0);
        let score = score_rules(&ctx, &[good("Ferrous Sulfate")]);
        // 80 + 10 - 15
        assert_eq!(score.score, 75);
        assert!(score.bullets.iter().any(|b| b.contains("not advised")));
    }
}
