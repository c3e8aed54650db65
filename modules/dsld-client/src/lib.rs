pub mod error;

pub use error::{DsldError, Result};

use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

/// A catalog hit from label search or UPC lookup.
#[derive(Debug, Clone, Deserialize)]
pub struct DsldProduct {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "fullName")]
    pub full_name: String,
    #[serde(rename = "brandName")]
    pub brand_name: Option<String>,
}

/// One row of a label's ingredient table.
#[derive(Debug, Clone)]
pub struct DsldIngredient {
    pub name: String,
    pub amount: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    hits: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    #[serde(rename = "_id")]
    id: String,
    #[serde(rename = "_source")]
    source: SearchSource,
}

#[derive(Debug, Deserialize)]
struct SearchSource {
    #[serde(rename = "fullName")]
    full_name: String,
    #[serde(rename = "brandName")]
    brand_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LabelResponse {
    #[serde(rename = "ingredientRows", default)]
    ingredient_rows: Vec<IngredientRow>,
}

#[derive(Debug, Deserialize)]
struct IngredientRow {
    name: String,
    #[serde(default)]
    quantity: Vec<Quantity>,
}

#[derive(Debug, Deserialize)]
struct Quantity {
    quantity: f64,
    unit: String,
}

pub struct DsldClient {
    http: reqwest::Client,
    base_url: String,
}

impl DsldClient {
    pub fn new(base_url: &str) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Full-text search over label names and brands.
    pub async fn search_products(&self, query: &str) -> Result<Vec<DsldProduct>> {
        let url = format!("{}/search-filter", self.base_url);
        debug!(query, "DSLD product search");

        let resp = self
            .http
            .get(&url)
            .query(&[("q", query), ("size", "10")])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(DsldError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: SearchResponse = resp.json().await?;
        Ok(body
            .hits
            .into_iter()
            .map(|h| DsldProduct {
                id: h.id,
                full_name: h.source.full_name,
                brand_name: h.source.brand_name,
            })
            .collect())
    }

    /// Exact barcode lookup. The catalog indexes UPCs verbatim, so a search
    /// on the digit string either matches one label or nothing.
    pub async fn search_by_upc(&self, upc: &str) -> Result<Option<DsldProduct>> {
        let mut hits = self.search_products(upc).await?;
        if hits.is_empty() {
            Ok(None)
        } else {
            Ok(Some(hits.remove(0)))
        }
    }

    /// Ingredient rows for a catalog-native label id.
    pub async fn label_ingredients(&self, label_id: &str) -> Result<Vec<DsldIngredient>> {
        let url = format!("{}/label/{}", self.base_url, label_id);
        debug!(label_id, "DSLD label fetch");

        let resp = self.http.get(&url).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(DsldError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: LabelResponse = resp.json().await?;
        Ok(body
            .ingredient_rows
            .into_iter()
            .map(|row| {
                let amount = row
                    .quantity
                    .first()
                    .map(|q| format!("{} {}", q.quantity, q.unit));
                DsldIngredient {
                    name: row.name,
                    amount,
                }
            })
            .collect())
    }
}
