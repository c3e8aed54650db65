//! Marketing-claim extraction from scraped product pages.
//!
//! Best-effort regex scrape over `<li>` items, kept behind this stable
//! function so the extraction can move to a real HTML parser without
//! touching callers. Total: always returns at least one claim.

use std::sync::LazyLock;

use regex::Regex;

use veridose_common::{Claim, ResolvedProduct, CLAIM_MAX_CHARS, CLAIM_MIN_CHARS, MAX_CLAIMS};

static LI_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<li[^>]*>(.*?)</li>").expect("valid regex"));
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));

/// Navigation chrome that list-scraping inevitably picks up.
const JUNK_MARKERS: &[&str] = &["cookie", "privacy", "©", "login", "sign in", "terms of"];

pub fn extract_claims(product: &ResolvedProduct) -> Vec<Claim> {
    if let Some(ref html) = product.html {
        let claims: Vec<Claim> = LI_RE
            .captures_iter(html)
            .filter_map(|caps| caps.get(1).map(|m| clean_text(m.as_str())))
            .filter(|text| !is_junk(text))
            .filter(|text| (CLAIM_MIN_CHARS..=CLAIM_MAX_CHARS).contains(&text.chars().count()))
            .take(MAX_CLAIMS)
            .map(|text| Claim { text })
            .collect();

        if !claims.is_empty() {
            return claims;
        }
    }

    vec![generic_claim(&product.name)]
}

/// Downstream stages never see an empty claim set; a product with no
/// extractable copy gets one generic wellness claim built from its name.
fn generic_claim(product_name: &str) -> Claim {
    let first_word = product_name.split_whitespace().next().unwrap_or("product");
    Claim {
        text: format!("Helps support overall wellness of {first_word}"),
    }
}

fn clean_text(raw: &str) -> String {
    let stripped = TAG_RE.replace_all(raw, "");
    stripped
        .replace("&amp;", "&")
        .replace("&nbsp;", " ")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_junk(text: &str) -> bool {
    let lower = text.to_lowercase();
    JUNK_MARKERS.iter().any(|m| lower.contains(m))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(html: Option<&str>) -> ResolvedProduct {
        ResolvedProduct {
            id: "1".to_string(),
            name: "Magnesium Glycinate 400mg".to_string(),
            brand: None,
            html: html.map(String::from),
            tokens_used: 0,
        }
    }

    #[test]
    fn extracts_list_items_and_strips_markup() {
        let html = r#"<ul>
            <li>Supports <b>restful sleep</b> &amp; relaxation</li>
            <li>Promotes healthy muscle function</li>
        </ul>"#;
        let claims = extract_claims(&product(Some(html)));
        assert_eq!(claims.len(), 2);
        assert_eq!(claims[0].text, "Supports restful sleep & relaxation");
    }

    #[test]
    fn filters_junk_length_and_caps_at_five() {
        let html = r#"
            <li>ok</li>
            <li>Accept our cookie policy</li>
            <li>Login</li>
            <li>Claim one is about sleep</li>
            <li>Claim two is about stress</li>
            <li>Claim three is about muscles</li>
            <li>Claim four is about bones</li>
            <li>Claim five is about energy</li>
            <li>Claim six is about mood</li>
        "#;
        let claims = extract_claims(&product(Some(html)));
        assert_eq!(claims.len(), 5);
        assert!(claims.iter().all(|c| !c.text.to_lowercase().contains("cookie")));
        assert!(claims.iter().all(|c| c.text.chars().count() >= CLAIM_MIN_CHARS));
    }

    #[test]
    fn no_html_yields_generic_claim() {
        let claims = extract_claims(&product(None));
        assert_eq!(claims.len(), 1);
        assert_eq!(
            claims[0].text,
            "Helps support overall wellness of Magnesium"
        );
    }

    #[test]
    fn html_without_usable_items_yields_generic_claim() {
        let claims = extract_claims(&product(Some("<p>no lists here</p>")));
        assert_eq!(claims.len(), 1);
        assert!(claims[0].text.starts_with("Helps support overall wellness"));
    }
}
