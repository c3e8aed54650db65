//! Seams between the pipeline and the outside world.
//!
//! Every stage talks to providers and storage through these traits so the
//! whole pipeline runs against in-memory fakes in tests. Production
//! implementations live in [`crate::infra`] and `veridose-store`.

use anyhow::Result;
use async_trait::async_trait;

use veridose_common::{ClaimVerdict, ProductVerdict, RunLogEntry, UserHealthContext};

// ---------------------------------------------------------------------------
// Provider DTOs
// ---------------------------------------------------------------------------

/// A product catalog match.
#[derive(Debug, Clone)]
pub struct CatalogHit {
    pub id: String,
    pub name: String,
    pub brand: Option<String>,
}

/// One ingredient row from the catalog's label endpoint, pre-classification.
#[derive(Debug, Clone)]
pub struct CatalogIngredient {
    pub name: String,
    pub amount: Option<String>,
}

/// One organic web search result.
#[derive(Debug, Clone)]
pub struct WebHit {
    pub url: String,
    pub title: String,
}

/// What the vision model read off a product photo.
#[derive(Debug, Clone, Default)]
pub struct LabelRead {
    pub upc: Option<String>,
    pub title: Option<String>,
    pub tokens_used: u32,
}

/// Title and abstract for one literature id.
#[derive(Debug, Clone)]
pub struct AbstractRecord {
    pub pmid: String,
    pub title: String,
    pub abstract_text: String,
}

// ---------------------------------------------------------------------------
// Provider traits
// ---------------------------------------------------------------------------

/// Structured product catalog: search, barcode lookup, label ingredients.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<CatalogHit>>;
    async fn lookup_upc(&self, upc: &str) -> Result<Option<CatalogHit>>;
    async fn ingredients(&self, product_id: &str) -> Result<Vec<CatalogIngredient>>;
}

/// General web search used as the resolver's second text fallback.
#[async_trait]
pub trait WebSearcher: Send + Sync {
    async fn search(&self, query: &str, max_results: u32) -> Result<Vec<WebHit>>;
}

/// Fetches raw HTML for a URL, directly or through a scraping proxy.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String>;
    fn name(&self) -> &str;
}

/// Vision model that reads a UPC and/or title off a product photo.
#[async_trait]
pub trait LabelReader: Send + Sync {
    async fn read_label(&self, image_base64: &str) -> Result<LabelRead>;
}

/// Literature search/fetch (PubMed-shaped).
#[async_trait]
pub trait LiteratureIndex: Send + Sync {
    async fn search_ids(&self, term: &str, max_results: u32) -> Result<Vec<String>>;
    async fn fetch(&self, ids: &[String]) -> Result<Vec<AbstractRecord>>;
}

/// User-context RPC: assembles allergies, labs and genetics for one user.
#[async_trait]
pub trait ContextProvider: Send + Sync {
    async fn full_context(&self, user_id: &str) -> Result<UserHealthContext>;
}

// ---------------------------------------------------------------------------
// Storage traits
// ---------------------------------------------------------------------------

/// Claim-level verdict cache keyed by normalized claim text. Implementations
/// enforce the 30-day TTL: a stale row reads as absent.
#[async_trait]
pub trait ClaimCache: Send + Sync {
    async fn get(&self, claim_key: &str) -> Result<Option<ClaimVerdict>>;
    async fn put(&self, claim_key: &str, verdict: &ClaimVerdict) -> Result<()>;
}

/// Per-(user, product) verdict cache. Implementations enforce the 7-day TTL.
#[async_trait]
pub trait VerdictCache: Send + Sync {
    async fn get(&self, user_id: &str, product_key: &str) -> Result<Option<ProductVerdict>>;
    async fn put(&self, user_id: &str, product_key: &str, verdict: &ProductVerdict) -> Result<()>;
}

/// Append-only run telemetry. `log` must never fail into the caller's error
/// path — implementations swallow and locally log their own errors.
#[async_trait]
pub trait RunLog: Send + Sync {
    async fn log(&self, entry: RunLogEntry);
}
