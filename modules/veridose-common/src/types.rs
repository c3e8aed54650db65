use std::collections::HashMap;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Request payload
// ---------------------------------------------------------------------------

/// Body of `POST /product_checker`. Exactly one of `text`, `url`,
/// `image_base64` must be present; validation happens in the pipeline so
/// the HTTP layer stays a thin adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckRequest {
    pub user_id: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub image_base64: Option<String>,
    /// Accepted for wire compatibility; streaming delivery is not implemented.
    #[serde(default)]
    pub stream: bool,
}

// ---------------------------------------------------------------------------
// Product
// ---------------------------------------------------------------------------

/// A product after entity resolution. `id` is a stable catalog key when the
/// catalog matched, otherwise a freshly generated UUID for a synthesized
/// product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedProduct {
    pub id: String,
    pub name: String,
    pub brand: Option<String>,
    /// Raw page HTML when the product was resolved by scraping a URL.
    pub html: Option<String>,
    /// LLM tokens spent resolving (vision path only). Not serialized.
    #[serde(skip)]
    pub tokens_used: u32,
}

impl ResolvedProduct {
    /// Whether the id is a native catalog key (all digits) as opposed to a
    /// synthesized UUID.
    pub fn has_catalog_id(&self) -> bool {
        !self.id.is_empty() && self.id.chars().all(|c| c.is_ascii_digit())
    }
}

/// The `product` object in the verdict response — no HTML payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductRef {
    pub id: String,
    pub name: String,
    pub brand: Option<String>,
}

impl From<&ResolvedProduct> for ProductRef {
    fn from(p: &ResolvedProduct) -> Self {
        Self {
            id: p.id.clone(),
            name: p.name.clone(),
            brand: p.brand.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Ingredients and claims
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IngredientQuality {
    Good,
    Questionable,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    pub amount: Option<String>,
    pub quality: IngredientQuality,
}

/// A single marketing/health assertion pulled from product copy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claim {
    pub text: String,
}

// ---------------------------------------------------------------------------
// Evidence
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SupportLevel {
    Supported,
    Weak,
    Contradicted,
}

impl SupportLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SupportLevel::Supported => "supported",
            SupportLevel::Weak => "weak",
            SupportLevel::Contradicted => "contradicted",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "supported" => Some(SupportLevel::Supported),
            "weak" => Some(SupportLevel::Weak),
            "contradicted" => Some(SupportLevel::Contradicted),
            _ => None,
        }
    }
}

/// Per-claim evidence verdict. Cached keyed by lowercased claim text,
/// shared across products and users.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimVerdict {
    pub claim: String,
    pub verdict: SupportLevel,
    pub pmid: Option<String>,
    pub title: Option<String>,
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
    pub blurb: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScienceScore {
    pub score: u8,
    pub evidence: Vec<ClaimVerdict>,
    /// LLM tokens spent judging (LLM judge only). Not serialized.
    #[serde(skip)]
    pub tokens_used: u32,
}

// ---------------------------------------------------------------------------
// Personalization
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonalScore {
    pub score: u8,
    pub bullets: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// LLM tokens spent (holistic mode only). Not serialized.
    #[serde(skip)]
    pub tokens_used: u32,
}

/// Read-only snapshot of a user's health data, assembled by the external
/// context service. Immutable for the duration of one pipeline run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserHealthContext {
    /// Declared allergens, free text (e.g. "shellfish", "soy").
    #[serde(default)]
    pub allergies: Vec<String>,
    /// Declared health goals (e.g. "sleep", "energy").
    #[serde(default)]
    pub goals: Vec<String>,
    /// Most recent lab panel, flattened biomarker name → numeric value.
    #[serde(default)]
    pub biomarkers: HashMap<String, f64>,
    /// Most recent genetic panel, SNP rsID → genotype (e.g. "CT").
    #[serde(default)]
    pub genotypes: HashMap<String, String>,
}

impl UserHealthContext {
    /// Look up a biomarker under a normalized key so that lab panels with
    /// different naming conventions ("Vitamin D", "vitamin_d", "25-OH
    /// Vitamin D") all resolve.
    pub fn biomarker(&self, key: &str) -> Option<f64> {
        let want = normalize_marker_key(key);
        self.biomarkers
            .iter()
            .find(|(k, _)| normalize_marker_key(k) == want)
            .map(|(_, v)| *v)
    }

    /// Look up a genotype by rsID, normalized so "C/T", "ct" and "TC" all
    /// compare equal as "CT".
    pub fn genotype(&self, rsid: &str) -> Option<String> {
        self.genotypes
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(rsid))
            .map(|(_, v)| normalize_genotype(v))
    }
}

/// Lowercase, collapse every run of non-alphanumerics to a single `_`.
pub fn normalize_marker_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut last_sep = true;
    for c in key.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
            last_sep = false;
        } else if !last_sep {
            out.push('_');
            last_sep = true;
        }
    }
    while out.ends_with('_') {
        out.pop();
    }
    out
}

/// Uppercase, drop separators, sort alleles so heterozygous calls compare
/// equal regardless of reported order.
pub fn normalize_genotype(genotype: &str) -> String {
    let mut alleles: Vec<char> = genotype
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_uppercase())
        .collect();
    alleles.sort_unstable();
    alleles.into_iter().collect()
}

// ---------------------------------------------------------------------------
// Verdict response
// ---------------------------------------------------------------------------

/// The full verdict returned to the caller and stored in the verdict cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductVerdict {
    pub product: ProductRef,
    pub score: u8,
    pub emoji: String,
    pub science: ScienceScore,
    pub personal: PersonalScore,
    pub ingredients: Vec<Ingredient>,
    pub claims: Vec<Claim>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

// ---------------------------------------------------------------------------
// Run log
// ---------------------------------------------------------------------------

/// One append-only telemetry row per pipeline run. Write-only: the
/// pipeline never reads these back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunLogEntry {
    pub user_id: String,
    pub product_id: String,
    pub elapsed_ms: i64,
    pub tokens_used: i64,
    pub cache_hit: bool,
    pub error: Option<String>,
}
