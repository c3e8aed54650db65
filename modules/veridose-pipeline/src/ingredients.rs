//! Ingredient extraction and quality classification.
//!
//! Total over its input: any failure collapses to a single sentinel
//! ingredient so downstream quality-ratio math never divides by zero.

use std::sync::Arc;

use tracing::warn;

use veridose_common::{
    Ingredient, IngredientQuality, ResolvedProduct, FILLER_BLOCKLIST, UNAVAILABLE_INGREDIENT,
};

use crate::traits::ProductCatalog;

pub struct IngredientExtractor {
    catalog: Arc<dyn ProductCatalog>,
}

impl IngredientExtractor {
    pub fn new(catalog: Arc<dyn ProductCatalog>) -> Self {
        Self { catalog }
    }

    /// Never fails and never returns an empty list.
    pub async fn extract(&self, product: &ResolvedProduct) -> Vec<Ingredient> {
        if product.has_catalog_id() {
            match self.catalog.ingredients(&product.id).await {
                Ok(rows) if !rows.is_empty() => {
                    return rows
                        .into_iter()
                        .map(|row| classify(&row.name, row.amount))
                        .collect();
                }
                Ok(_) => warn!(product_id = %product.id, "Catalog returned no ingredients"),
                Err(e) => {
                    warn!(product_id = %product.id, error = %e, "Ingredient lookup failed")
                }
            }
        }

        vec![Ingredient {
            name: UNAVAILABLE_INGREDIENT.to_string(),
            amount: None,
            quality: IngredientQuality::Questionable,
        }]
    }
}

/// An ingredient is questionable iff its name contains a blocklisted
/// filler/additive, case-insensitively.
pub fn classify(name: &str, amount: Option<String>) -> Ingredient {
    let lower = name.to_lowercase();
    let quality = if FILLER_BLOCKLIST.iter().any(|f| lower.contains(f)) {
        IngredientQuality::Questionable
    } else {
        IngredientQuality::Good
    };
    Ingredient {
        name: name.to_string(),
        amount,
        quality,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocklisted_fillers_are_questionable() {
        assert_eq!(
            classify("Magnesium Stearate", None).quality,
            IngredientQuality::Questionable
        );
        assert_eq!(
            classify("TITANIUM DIOXIDE (color)", None).quality,
            IngredientQuality::Questionable
        );
        assert_eq!(
            classify("FD&C Red 40 Lake", None).quality,
            IngredientQuality::Questionable
        );
    }

    #[test]
    fn active_ingredients_are_good() {
        assert_eq!(
            classify("Magnesium (as Magnesium Glycinate)", Some("400 mg".to_string())).quality,
            IngredientQuality::Good
        );
        assert_eq!(classify("Vitamin D3", None).quality, IngredientQuality::Good);
    }
}
