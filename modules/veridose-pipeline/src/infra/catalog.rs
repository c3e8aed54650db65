//! DSLD-backed [`ProductCatalog`].

use anyhow::Result;
use async_trait::async_trait;
use dsld_client::DsldClient;

use crate::traits::{CatalogHit, CatalogIngredient, ProductCatalog};

pub struct DsldCatalog {
    client: DsldClient,
}

impl DsldCatalog {
    pub fn new(client: DsldClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ProductCatalog for DsldCatalog {
    async fn search(&self, query: &str) -> Result<Vec<CatalogHit>> {
        let products = self.client.search_products(query).await?;
        Ok(products
            .into_iter()
            .map(|p| CatalogHit {
                id: p.id,
                name: p.full_name,
                brand: p.brand_name,
            })
            .collect())
    }

    async fn lookup_upc(&self, upc: &str) -> Result<Option<CatalogHit>> {
        Ok(self.client.search_by_upc(upc).await?.map(|p| CatalogHit {
            id: p.id,
            name: p.full_name,
            brand: p.brand_name,
        }))
    }

    async fn ingredients(&self, product_id: &str) -> Result<Vec<CatalogIngredient>> {
        let rows = self.client.label_ingredients(product_id).await?;
        Ok(rows
            .into_iter()
            .map(|r| CatalogIngredient {
                name: r.name,
                amount: r.amount,
            })
            .collect())
    }
}
