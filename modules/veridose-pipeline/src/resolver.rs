//! Entity resolution — raw text / URL / photo into a canonical product.
//!
//! Each input kind walks an ordered fallback chain; the first success wins.
//! Text input can always be resolved (worst case: a synthesized ephemeral
//! product), while URL and image inputs fail with `UnresolvedInput` when
//! every fallback comes up empty.

use std::sync::Arc;
use std::sync::LazyLock;

use regex::Regex;
use sha2::{Digest, Sha256};
use tracing::{info, warn};
use uuid::Uuid;

use veridose_common::{CheckRequest, ResolvedProduct, VeridoseError};

use crate::traits::{CatalogHit, LabelReader, PageFetcher, ProductCatalog, WebSearcher};

static UPC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)UPC(?:-|\s)?(?:Code)?:?\s*(\d{12,14})").expect("valid regex")
});
static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").expect("valid regex"));
/// Numeric label id inside a catalog product URL, e.g. `/label/12345`.
static LABEL_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/(?:label|products?)/(\d+)").expect("valid regex"));

/// Exactly one resolvable input, validated out of the raw request body.
#[derive(Debug, Clone)]
pub enum ResolveInput {
    Text(String),
    Url(String),
    Image(String),
}

impl ResolveInput {
    /// Enforce the exactly-one-of-three contract before any network call.
    pub fn from_payload(req: &CheckRequest) -> Result<Self, VeridoseError> {
        let text = req.text.as_deref().map(str::trim).filter(|s| !s.is_empty());
        let url = req.url.as_deref().map(str::trim).filter(|s| !s.is_empty());
        let image = req
            .image_base64
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());

        match (text, url, image) {
            (Some(t), None, None) => Ok(ResolveInput::Text(t.to_string())),
            (None, Some(u), None) => Ok(ResolveInput::Url(u.to_string())),
            (None, None, Some(i)) => Ok(ResolveInput::Image(i.to_string())),
            _ => Err(VeridoseError::InvalidPayload),
        }
    }
}

pub struct Resolver {
    catalog: Arc<dyn ProductCatalog>,
    searcher: Arc<dyn WebSearcher>,
    fetcher: Arc<dyn PageFetcher>,
    vision: Arc<dyn LabelReader>,
    /// Domain the web-search fallback is scoped to (`site:` operator).
    catalog_domain: String,
}

impl Resolver {
    pub fn new(
        catalog: Arc<dyn ProductCatalog>,
        searcher: Arc<dyn WebSearcher>,
        fetcher: Arc<dyn PageFetcher>,
        vision: Arc<dyn LabelReader>,
        catalog_domain: impl Into<String>,
    ) -> Self {
        Self {
            catalog,
            searcher,
            fetcher,
            vision,
            catalog_domain: catalog_domain.into(),
        }
    }

    pub async fn resolve(&self, input: &ResolveInput) -> Result<ResolvedProduct, VeridoseError> {
        match input {
            ResolveInput::Text(query) => Ok(self.resolve_text(query).await),
            ResolveInput::Url(url) => self.resolve_url(url).await,
            ResolveInput::Image(image_base64) => self.resolve_image(image_base64).await,
        }
    }

    /// Text never fails: catalog search → domain-scoped web search →
    /// synthesized ephemeral product.
    async fn resolve_text(&self, query: &str) -> ResolvedProduct {
        match self.catalog.search(query).await {
            Ok(hits) => {
                if let Some(hit) = hits.into_iter().next() {
                    info!(query, product_id = %hit.id, "Resolved text via catalog search");
                    return product_from_hit(hit, None);
                }
            }
            Err(e) => warn!(query, error = %e, "Catalog search failed, trying web search"),
        }

        let scoped = format!("site:{} {}", self.catalog_domain, query);
        match self.searcher.search(&scoped, 5).await {
            Ok(hits) => {
                for hit in hits {
                    if let Some(caps) = LABEL_ID_RE.captures(&hit.url) {
                        let id = caps[1].to_string();
                        info!(query, product_id = %id, "Resolved text via web search");
                        return ResolvedProduct {
                            id,
                            name: hit.title,
                            brand: None,
                            html: None,
                            tokens_used: 0,
                        };
                    }
                }
            }
            Err(e) => warn!(query, error = %e, "Web search failed, synthesizing product"),
        }

        // Ephemeral product: the id is fresh every time, so the verdict
        // cache is instead keyed by a hash of the text (see `cache_key`).
        info!(query, "Synthesized ephemeral product from text");
        ResolvedProduct {
            id: Uuid::new_v4().to_string(),
            name: query.to_string(),
            brand: None,
            html: None,
            tokens_used: 0,
        }
    }

    /// URL: fetch page → UPC regex → `<title>` → catalog. No synthesized
    /// fallback; a page we cannot match is an unresolved input.
    async fn resolve_url(&self, url: &str) -> Result<ResolvedProduct, VeridoseError> {
        let html = self
            .fetcher
            .fetch(url)
            .await
            .map_err(|e| VeridoseError::UnresolvedInput(format!("failed to fetch {url}: {e}")))?;

        if let Some(caps) = UPC_RE.captures(&html) {
            let upc = caps[1].to_string();
            match self.catalog.lookup_upc(&upc).await {
                Ok(Some(hit)) => {
                    info!(url, upc, product_id = %hit.id, "Resolved URL via UPC");
                    return Ok(product_from_hit(hit, Some(html)));
                }
                Ok(None) => info!(url, upc, "UPC on page but not in catalog"),
                Err(e) => warn!(url, upc, error = %e, "UPC lookup failed"),
            }
        }

        if let Some(title) = page_title(&html) {
            match self.catalog.search(&title).await {
                Ok(hits) => {
                    if let Some(hit) = hits.into_iter().next() {
                        info!(url, title, product_id = %hit.id, "Resolved URL via page title");
                        return Ok(product_from_hit(hit, Some(html)));
                    }
                }
                Err(e) => warn!(url, error = %e, "Title search failed"),
            }
        }

        Err(VeridoseError::UnresolvedInput(format!(
            "no UPC or matching title found at {url}"
        )))
    }

    /// Image: vision model reads `{upc, title}` → UPC lookup → title search.
    async fn resolve_image(&self, image_base64: &str) -> Result<ResolvedProduct, VeridoseError> {
        let read = self.vision.read_label(image_base64).await.map_err(|e| {
            VeridoseError::UnresolvedInput(format!("vision model failed to read image: {e}"))
        })?;

        if let Some(ref upc) = read.upc {
            match self.catalog.lookup_upc(upc).await {
                Ok(Some(hit)) => {
                    info!(upc, product_id = %hit.id, "Resolved image via UPC");
                    let mut product = product_from_hit(hit, None);
                    product.tokens_used = read.tokens_used;
                    return Ok(product);
                }
                Ok(None) => info!(upc, "UPC from image not in catalog"),
                Err(e) => warn!(upc, error = %e, "UPC lookup failed"),
            }
        }

        if let Some(ref title) = read.title {
            match self.catalog.search(title).await {
                Ok(hits) => {
                    if let Some(hit) = hits.into_iter().next() {
                        info!(title, product_id = %hit.id, "Resolved image via title");
                        let mut product = product_from_hit(hit, None);
                        product.tokens_used = read.tokens_used;
                        return Ok(product);
                    }
                }
                Err(e) => warn!(title, error = %e, "Title search failed"),
            }
        }

        Err(VeridoseError::UnresolvedInput(
            "could not identify a product in the image".to_string(),
        ))
    }
}

fn product_from_hit(hit: CatalogHit, html: Option<String>) -> ResolvedProduct {
    ResolvedProduct {
        id: hit.id,
        name: hit.name,
        brand: hit.brand,
        html,
        tokens_used: 0,
    }
}

fn page_title(html: &str) -> Option<String> {
    let raw = TITLE_RE.captures(html)?.get(1)?.as_str();
    let title = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if title.is_empty() {
        None
    } else {
        Some(title)
    }
}

/// Verdict-cache key for a resolved product.
///
/// Catalog products key by their stable catalog id. Synthesized text
/// products would miss the cache on every request (fresh UUID each time),
/// so they key by a hash of the normalized query text instead — identical
/// free-text queries share a cache row.
pub fn cache_key(input: &ResolveInput, product: &ResolvedProduct) -> String {
    if let ResolveInput::Text(query) = input {
        if Uuid::parse_str(&product.id).is_ok() {
            let normalized = query.trim().to_lowercase();
            let normalized = normalized.split_whitespace().collect::<Vec<_>>().join(" ");
            return format!("text:{}", hex::encode(Sha256::digest(normalized.as_bytes())));
        }
    }
    product.id.clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(
        text: Option<&str>,
        url: Option<&str>,
        image: Option<&str>,
    ) -> CheckRequest {
        CheckRequest {
            user_id: "u1".to_string(),
            text: text.map(String::from),
            url: url.map(String::from),
            image_base64: image.map(String::from),
            stream: false,
        }
    }

    #[test]
    fn payload_accepts_exactly_one_field() {
        assert!(matches!(
            ResolveInput::from_payload(&req(Some("magnesium"), None, None)),
            Ok(ResolveInput::Text(_))
        ));
        assert!(matches!(
            ResolveInput::from_payload(&req(None, Some("https://x.test/p"), None)),
            Ok(ResolveInput::Url(_))
        ));
        assert!(matches!(
            ResolveInput::from_payload(&req(None, None, Some("aGVsbG8="))),
            Ok(ResolveInput::Image(_))
        ));
    }

    #[test]
    fn payload_rejects_zero_and_multiple_fields() {
        assert!(matches!(
            ResolveInput::from_payload(&req(None, None, None)),
            Err(VeridoseError::InvalidPayload)
        ));
        assert!(matches!(
            ResolveInput::from_payload(&req(Some("a"), Some("b"), None)),
            Err(VeridoseError::InvalidPayload)
        ));
        // whitespace-only counts as absent
        assert!(matches!(
            ResolveInput::from_payload(&req(Some("   "), None, None)),
            Err(VeridoseError::InvalidPayload)
        ));
    }

    #[test]
    fn upc_regex_variants() {
        for s in [
            "UPC: 012345678905",
            "upc 012345678905",
            "UPC-Code: 012345678905",
            "UPC Code:012345678905",
        ] {
            let caps = UPC_RE.captures(s).unwrap_or_else(|| panic!("no match: {s}"));
            assert_eq!(&caps[1], "012345678905");
        }
        assert!(UPC_RE.captures("UPC: 12345").is_none()); // too short
    }

    #[test]
    fn title_extraction_collapses_whitespace() {
        let html = "<html><head><title>\n  Magnesium \t Glycinate 400mg\n</title></head></html>";
        assert_eq!(page_title(html).as_deref(), Some("Magnesium Glycinate 400mg"));
        assert_eq!(page_title("<html></html>"), None);
    }

    #[test]
    fn label_id_from_search_result_url() {
        let caps = LABEL_ID_RE
            .captures("https://dsld.od.nih.gov/label/12345")
            .unwrap();
        assert_eq!(&caps[1], "12345");
    }

    #[test]
    fn cache_key_hashes_synthesized_text_products() {
        let input = ResolveInput::Text("Magnesium  Glycinate".to_string());
        let synthesized = ResolvedProduct {
            id: Uuid::new_v4().to_string(),
            name: "Magnesium Glycinate".to_string(),
            brand: None,
            html: None,
            tokens_used: 0,
        };
        let key = cache_key(&input, &synthesized);
        assert!(key.starts_with("text:"));

        // same normalized text, different UUID → same key
        let input2 = ResolveInput::Text("  magnesium glycinate ".to_string());
        let synthesized2 = ResolvedProduct {
            id: Uuid::new_v4().to_string(),
            ..synthesized.clone()
        };
        assert_eq!(key, cache_key(&input2, &synthesized2));
    }

    #[test]
    fn cache_key_uses_catalog_id_when_matched() {
        let input = ResolveInput::Text("magnesium".to_string());
        let product = ResolvedProduct {
            id: "12345".to_string(),
            name: "Magnesium".to_string(),
            brand: None,
            html: None,
            tokens_used: 0,
        };
        assert_eq!(cache_key(&input, &product), "12345");
    }
}
