use chrono::{DateTime, Duration, Utc};

/// Weight of the evidence (science) score in the combined verdict.
pub const SCIENCE_WEIGHT: f64 = 0.7;
/// Weight of the personal-fit score in the combined verdict.
pub const PERSONAL_WEIGHT: f64 = 0.3;

/// Combined score at or above this gets the happy band.
pub const BAND_GOOD_MIN: u8 = 80;
/// Combined score at or above this (but below good) gets the neutral band.
pub const BAND_OK_MIN: u8 = 60;

pub const EMOJI_GOOD: &str = "😊";
pub const EMOJI_OK: &str = "🙂";
pub const EMOJI_POOR: &str = "😟";

/// Claim verdicts older than this are recomputed.
pub const CLAIM_CACHE_TTL_DAYS: i64 = 30;
/// Per-(user, product) verdicts older than this are recomputed.
pub const VERDICT_CACHE_TTL_DAYS: i64 = 7;

/// Marketing claims kept per product.
pub const MAX_CLAIMS: usize = 5;
pub const CLAIM_MIN_CHARS: usize = 6;
pub const CLAIM_MAX_CHARS: usize = 159;

/// Aggregate science score when a product somehow has zero claims.
pub const NEUTRAL_SCIENCE_SCORE: u8 = 50;

/// PMIDs fetched per claim on a cache miss.
pub const MAX_EVIDENCE_IDS: u32 = 3;
/// Leading whitespace-delimited tokens of a claim used as the literature search term.
pub const SEARCH_TERM_TOKENS: usize = 4;

/// Rules-mode personalization starts here before any adjustment.
pub const PERSONAL_BASE_SCORE: i32 = 80;
/// Flat penalty when any ingredient matches a declared allergen.
pub const ALLERGY_CONFLICT_PENALTY: i32 = 30;
/// Quality bonus is this times the good-ingredient ratio, rounded.
pub const QUALITY_BONUS_MAX: f64 = 10.0;

/// Fillers and additives that mark an ingredient `questionable`.
/// Matched case-insensitively as substrings of the ingredient name.
pub const FILLER_BLOCKLIST: &[&str] = &[
    "titanium dioxide",
    "red 40",
    "blue 1",
    "yellow 6",
    "magnesium stearate",
    "propylene glycol",
    "talc",
    "bht",
];

/// Sentinel ingredient name emitted when extraction fails entirely.
pub const UNAVAILABLE_INGREDIENT: &str = "Ingredient data unavailable";

/// TTL check shared by both caches. An entry is fresh while strictly
/// younger than `ttl_days`.
pub fn is_fresh(updated_at: DateTime<Utc>, ttl_days: i64, now: DateTime<Utc>) -> bool {
    now - updated_at < Duration::days(ttl_days)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_entry_within_ttl() {
        let now = Utc::now();
        assert!(is_fresh(now - Duration::days(6), 7, now));
        assert!(is_fresh(now, 7, now));
    }

    #[test]
    fn stale_entry_past_ttl() {
        let now = Utc::now();
        assert!(!is_fresh(now - Duration::days(7), 7, now));
        assert!(!is_fresh(now - Duration::days(31), 30, now));
    }
}
