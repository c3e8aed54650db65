//! Evidence scoring — claims checked against literature abstracts.
//!
//! Total over its input: provider failures degrade individual claims to a
//! `weak` verdict instead of failing the pipeline. Verdicts are cached by
//! normalized claim text with a 30-day TTL, shared across products.

use std::sync::Arc;

use ai_client::util::truncate_to_char_boundary;
use ai_client::Claude;
use schemars::JsonSchema;
use serde::Deserialize;
use tracing::{debug, warn};

use veridose_common::config::JudgeMode;
use veridose_common::{
    Claim, ClaimVerdict, ScienceScore, SupportLevel, MAX_EVIDENCE_IDS, NEUTRAL_SCIENCE_SCORE,
    SEARCH_TERM_TOKENS,
};

use crate::traits::{AbstractRecord, ClaimCache, LiteratureIndex};

/// Abstract text stored on a verdict is capped so cache rows stay small.
const MAX_STORED_ABSTRACT_BYTES: usize = 600;

/// Phrases whose presence in an abstract reads as a null result.
const NEGATION_PHRASES: &[&str] = &[
    "no significant effect",
    "no significant difference",
    "did not significantly",
    "failed to improve",
    "no effect on",
];

/// Phrases that read as a positive finding...
const POSITIVE_PHRASES: &[&str] = &[
    "significant increase",
    "significant improvement",
    "significant reduction",
    "significantly improved",
    "significantly reduced",
    "significantly increased",
];

/// ...which only count as support alongside a trial-design marker.
const TRIAL_MARKERS: &[&str] = &["randomized", "double-blind", "placebo-controlled"];

const LLM_JUDGE_SYSTEM_PROMPT: &str = "You are a scientific claim judge. Given a supplement \
marketing claim and up to three PubMed abstracts, decide whether the literature supports the \
claim. Return verdict as exactly one of: supported, weak, contradicted. Base your verdict only \
on the abstracts provided; when they are absent or off-topic, return weak.";

#[derive(Debug, Deserialize, JsonSchema)]
struct JudgedClaim {
    /// "supported", "weak", or "contradicted"
    verdict: String,
    /// One-sentence justification, shown to the user verbatim.
    reasoning: String,
}

pub struct EvidenceScorer {
    literature: Arc<dyn LiteratureIndex>,
    cache: Arc<dyn ClaimCache>,
    mode: JudgeMode,
    llm: Option<Claude>,
}

impl EvidenceScorer {
    pub fn new(literature: Arc<dyn LiteratureIndex>, cache: Arc<dyn ClaimCache>) -> Self {
        Self {
            literature,
            cache,
            mode: JudgeMode::Heuristic,
            llm: None,
        }
    }

    /// Switch to the LLM judge. Falls back to the heuristic per-claim when
    /// the provider errors.
    pub fn with_llm_judge(mut self, claude: Claude) -> Self {
        self.mode = JudgeMode::Llm;
        self.llm = Some(claude);
        self
    }

    /// Aggregate science score over all claims. Never fails.
    pub async fn score_science(&self, claims: &[Claim]) -> ScienceScore {
        if claims.is_empty() {
            return ScienceScore {
                score: NEUTRAL_SCIENCE_SCORE,
                evidence: Vec::new(),
                tokens_used: 0,
            };
        }

        let mut evidence = Vec::with_capacity(claims.len());
        let mut tokens_used = 0u32;
        for claim in claims {
            let (verdict, tokens) = self.verdict_for(claim).await;
            tokens_used += tokens;
            evidence.push(verdict);
        }

        let supported = evidence
            .iter()
            .filter(|v| v.verdict == SupportLevel::Supported)
            .count();
        let score = ((100.0 * supported as f64) / claims.len() as f64).round() as u8;

        ScienceScore {
            score,
            evidence,
            tokens_used,
        }
    }

    async fn verdict_for(&self, claim: &Claim) -> (ClaimVerdict, u32) {
        let key = claim_key(&claim.text);

        match self.cache.get(&key).await {
            Ok(Some(cached)) => {
                debug!(claim = %claim.text, "Claim cache hit");
                return (cached, 0);
            }
            Ok(None) => {}
            Err(e) => warn!(claim = %claim.text, error = %e, "Claim cache read failed"),
        }

        let term = search_term(&claim.text);
        let records = match self.literature.search_ids(&term, MAX_EVIDENCE_IDS).await {
            Ok(ids) if !ids.is_empty() => match self.literature.fetch(&ids).await {
                Ok(records) => records,
                Err(e) => {
                    warn!(term, error = %e, "Literature fetch failed");
                    Vec::new()
                }
            },
            Ok(_) => Vec::new(),
            Err(e) => {
                warn!(term, error = %e, "Literature search failed");
                Vec::new()
            }
        };

        let (verdict, tokens) = self.judge(claim, &records).await;

        if let Err(e) = self.cache.put(&key, &verdict).await {
            warn!(claim = %claim.text, error = %e, "Claim cache write failed");
        }

        (verdict, tokens)
    }

    async fn judge(&self, claim: &Claim, records: &[AbstractRecord]) -> (ClaimVerdict, u32) {
        if self.mode == JudgeMode::Llm {
            if let Some(ref claude) = self.llm {
                match self.judge_llm(claude, claim, records).await {
                    Ok(result) => return result,
                    Err(e) => {
                        warn!(claim = %claim.text, error = %e, "LLM judge failed, using heuristic")
                    }
                }
            }
        }
        (judge_heuristic(claim, records), 0)
    }

    async fn judge_llm(
        &self,
        claude: &Claude,
        claim: &Claim,
        records: &[AbstractRecord],
    ) -> anyhow::Result<(ClaimVerdict, u32)> {
        let mut prompt = format!("Claim: {}\n\n", claim.text);
        if records.is_empty() {
            prompt.push_str("No abstracts were found for this claim.");
        } else {
            for record in records {
                prompt.push_str(&format!(
                    "PMID {}: {}\n{}\n\n",
                    record.pmid,
                    record.title,
                    truncate_to_char_boundary(&record.abstract_text, 2000)
                ));
            }
        }

        let (judged, tokens): (JudgedClaim, u32) = claude
            .extract_metered(LLM_JUDGE_SYSTEM_PROMPT, prompt)
            .await?;

        let verdict = SupportLevel::parse(judged.verdict.trim()).unwrap_or(SupportLevel::Weak);
        let primary = records.first();
        Ok((
            ClaimVerdict {
                claim: claim.text.clone(),
                verdict,
                pmid: primary.map(|r| r.pmid.clone()),
                title: primary.map(|r| r.title.clone()),
                abstract_text: primary
                    .map(|r| truncate_to_char_boundary(&r.abstract_text, MAX_STORED_ABSTRACT_BYTES).to_string()),
                blurb: Some(judged.reasoning),
            },
            tokens,
        ))
    }
}

/// Cache key: lowercased, trimmed claim text. Two products sharing a claim
/// string share the cached verdict.
pub fn claim_key(claim_text: &str) -> String {
    claim_text.trim().to_lowercase()
}

/// Leading tokens of the claim as a literature search term.
pub fn search_term(claim_text: &str) -> String {
    claim_text
        .split_whitespace()
        .take(SEARCH_TERM_TOKENS)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Deterministic phrase-table judge.
pub fn judge_heuristic(claim: &Claim, records: &[AbstractRecord]) -> ClaimVerdict {
    if records.is_empty() {
        return ClaimVerdict {
            claim: claim.text.clone(),
            verdict: SupportLevel::Weak,
            pmid: None,
            title: None,
            abstract_text: None,
            blurb: Some("No published literature found for this claim.".to_string()),
        };
    }

    // Contradiction wins over support: one null result flags the claim.
    for record in records {
        let lower = record.abstract_text.to_lowercase();
        if NEGATION_PHRASES.iter().any(|p| lower.contains(p)) {
            return verdict_from_record(
                claim,
                record,
                SupportLevel::Contradicted,
                "Published research reports no significant effect for this claim.",
            );
        }
    }

    for record in records {
        let lower = record.abstract_text.to_lowercase();
        let positive = POSITIVE_PHRASES.iter().any(|p| lower.contains(p));
        let trial = TRIAL_MARKERS.iter().any(|p| lower.contains(p));
        if positive && trial {
            return verdict_from_record(
                claim,
                record,
                SupportLevel::Supported,
                "Supported by randomized controlled trial evidence.",
            );
        }
    }

    verdict_from_record(
        claim,
        &records[0],
        SupportLevel::Weak,
        "Some literature exists but support is inconclusive.",
    )
}

fn verdict_from_record(
    claim: &Claim,
    record: &AbstractRecord,
    verdict: SupportLevel,
    blurb: &str,
) -> ClaimVerdict {
    ClaimVerdict {
        claim: claim.text.clone(),
        verdict,
        pmid: Some(record.pmid.clone()),
        title: Some(record.title.clone()),
        abstract_text: Some(
            truncate_to_char_boundary(&record.abstract_text, MAX_STORED_ABSTRACT_BYTES).to_string(),
        ),
        blurb: Some(blurb.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claim(text: &str) -> Claim {
        Claim {
            text: text.to_string(),
        }
    }

    fn record(abstract_text: &str) -> AbstractRecord {
        AbstractRecord {
            pmid: "123".to_string(),
            title: "A trial".to_string(),
            abstract_text: abstract_text.to_string(),
        }
    }

    #[test]
    fn search_term_takes_leading_tokens() {
        assert_eq!(
            search_term("Supports restful sleep and relaxation every night"),
            "Supports restful sleep and"
        );
        assert_eq!(search_term("magnesium"), "magnesium");
    }

    #[test]
    fn claim_key_is_normalized() {
        assert_eq!(claim_key("  Supports SLEEP "), "supports sleep");
    }

    #[test]
    fn heuristic_contradicted_on_negation() {
        let v = judge_heuristic(
            &claim("improves sleep"),
            &[record("In this randomized trial we found no significant effect on sleep.")],
        );
        assert_eq!(v.verdict, SupportLevel::Contradicted);
        assert_eq!(v.pmid.as_deref(), Some("123"));
    }

    #[test]
    fn heuristic_supported_needs_positive_and_trial_marker() {
        let v = judge_heuristic(
            &claim("improves sleep"),
            &[record("A double-blind study showed a significant improvement in sleep quality.")],
        );
        assert_eq!(v.verdict, SupportLevel::Supported);

        // positive phrase without a trial marker stays weak
        let v = judge_heuristic(
            &claim("improves sleep"),
            &[record("An observational survey noted a significant improvement in sleep.")],
        );
        assert_eq!(v.verdict, SupportLevel::Weak);
    }

    #[test]
    fn heuristic_weak_when_no_records() {
        let v = judge_heuristic(&claim("improves sleep"), &[]);
        assert_eq!(v.verdict, SupportLevel::Weak);
        assert!(v.pmid.is_none());
    }

    #[test]
    fn contradiction_beats_support_across_records() {
        let v = judge_heuristic(
            &claim("improves sleep"),
            &[
                record("randomized trial with significant improvement in sleep"),
                record("a second trial found no significant effect"),
            ],
        );
        assert_eq!(v.verdict, SupportLevel::Contradicted);
    }
}
