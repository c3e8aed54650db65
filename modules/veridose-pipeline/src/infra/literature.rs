//! PubMed-backed [`LiteratureIndex`].

use anyhow::Result;
use async_trait::async_trait;
use pubmed_client::PubMedClient;

use crate::traits::{AbstractRecord, LiteratureIndex};

pub struct PubMedIndex {
    client: PubMedClient,
}

impl PubMedIndex {
    pub fn new(client: PubMedClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl LiteratureIndex for PubMedIndex {
    async fn search_ids(&self, term: &str, max_results: u32) -> Result<Vec<String>> {
        Ok(self.client.search_ids(term, max_results).await?)
    }

    async fn fetch(&self, ids: &[String]) -> Result<Vec<AbstractRecord>> {
        let articles = self.client.fetch_abstracts(ids).await?;
        Ok(articles
            .into_iter()
            .map(|a| AbstractRecord {
                pmid: a.pmid,
                title: a.title,
                abstract_text: a.abstract_text,
            })
            .collect())
    }
}
