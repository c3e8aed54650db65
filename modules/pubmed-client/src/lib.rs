pub mod error;

pub use error::{PubMedError, Result};

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use serde::Deserialize;
use tracing::debug;

const EUTILS_BASE_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils";

/// Title and abstract for one PMID.
#[derive(Debug, Clone)]
pub struct PubMedArticle {
    pub pmid: String,
    pub title: String,
    pub abstract_text: String,
}

#[derive(Debug, Deserialize)]
struct ESearchEnvelope {
    esearchresult: ESearchResult,
}

#[derive(Debug, Deserialize)]
struct ESearchResult {
    #[serde(default)]
    idlist: Vec<String>,
}

static ARTICLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<PubmedArticle>.*?</PubmedArticle>").expect("valid regex")
});
static PMID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<PMID[^>]*>(\d+)</PMID>").expect("valid regex"));
static TITLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<ArticleTitle[^>]*>(.*?)</ArticleTitle>").expect("valid regex")
});
static ABSTRACT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<AbstractText[^>]*>(.*?)</AbstractText>").expect("valid regex")
});
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));

pub struct PubMedClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl PubMedClient {
    pub fn new(api_key: Option<&str>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            http,
            base_url: EUTILS_BASE_URL.to_string(),
            api_key: api_key.map(String::from),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    /// `esearch`: term → PMIDs, most relevant first.
    pub async fn search_ids(&self, term: &str, retmax: u32) -> Result<Vec<String>> {
        let url = format!("{}/esearch.fcgi", self.base_url);
        debug!(term, retmax, "PubMed esearch");

        let retmax = retmax.to_string();
        let mut params = vec![
            ("db", "pubmed"),
            ("retmode", "json"),
            ("sort", "relevance"),
            ("term", term),
            ("retmax", retmax.as_str()),
        ];
        if let Some(ref key) = self.api_key {
            params.push(("api_key", key));
        }

        let resp = self.http.get(&url).query(&params).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(PubMedError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: ESearchEnvelope = resp.json().await?;
        Ok(body.esearchresult.idlist)
    }

    /// `efetch`: PMIDs → title + abstract. The E-utilities only ship
    /// abstracts as XML, which we mine with regexes rather than pulling in a
    /// full XML parser for two fields.
    pub async fn fetch_abstracts(&self, pmids: &[String]) -> Result<Vec<PubMedArticle>> {
        if pmids.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/efetch.fcgi", self.base_url);
        let ids = pmids.join(",");
        debug!(ids = %ids, "PubMed efetch");

        let mut params = vec![
            ("db", "pubmed"),
            ("retmode", "xml"),
            ("rettype", "abstract"),
            ("id", ids.as_str()),
        ];
        if let Some(ref key) = self.api_key {
            params.push(("api_key", key));
        }

        let resp = self.http.get(&url).query(&params).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(PubMedError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let xml = resp.text().await?;
        Ok(parse_efetch(&xml))
    }
}

/// Pull `(pmid, title, abstract)` out of efetch XML. Articles missing a
/// PMID or title are skipped; a missing abstract becomes an empty string.
fn parse_efetch(xml: &str) -> Vec<PubMedArticle> {
    ARTICLE_RE
        .find_iter(xml)
        .filter_map(|m| {
            let chunk = m.as_str();
            let pmid = PMID_RE.captures(chunk)?.get(1)?.as_str().to_string();
            let title = TITLE_RE
                .captures(chunk)
                .and_then(|c| c.get(1))
                .map(|m| clean_xml_text(m.as_str()))?;
            let abstract_text = ABSTRACT_RE
                .captures_iter(chunk)
                .filter_map(|c| c.get(1).map(|m| clean_xml_text(m.as_str())))
                .collect::<Vec<_>>()
                .join(" ");
            Some(PubMedArticle {
                pmid,
                title,
                abstract_text,
            })
        })
        .collect()
}

fn clean_xml_text(raw: &str) -> String {
    let stripped = TAG_RE.replace_all(raw, "");
    stripped
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" ?>
<PubmedArticleSet>
  <PubmedArticle>
    <MedlineCitation><PMID Version="1">31770425</PMID>
      <Article>
        <ArticleTitle>Magnesium supplementation and sleep quality: a <i>randomized</i> trial.</ArticleTitle>
        <Abstract>
          <AbstractText Label="BACKGROUND">Magnesium intake is often inadequate.</AbstractText>
          <AbstractText Label="RESULTS">We observed a significant improvement in sleep scores.</AbstractText>
        </Abstract>
      </Article>
    </MedlineCitation>
  </PubmedArticle>
  <PubmedArticle>
    <MedlineCitation><PMID Version="1">22222222</PMID>
      <Article>
        <ArticleTitle>A study without an abstract.</ArticleTitle>
      </Article>
    </MedlineCitation>
  </PubmedArticle>
</PubmedArticleSet>"#;

    #[test]
    fn parses_articles_with_and_without_abstracts() {
        let articles = parse_efetch(SAMPLE);
        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].pmid, "31770425");
        assert_eq!(
            articles[0].title,
            "Magnesium supplementation and sleep quality: a randomized trial."
        );
        assert!(articles[0]
            .abstract_text
            .contains("significant improvement in sleep scores"));
        assert_eq!(articles[1].pmid, "22222222");
        assert!(articles[1].abstract_text.is_empty());
    }

    #[test]
    fn parses_esearch_json() {
        let raw = r#"{"esearchresult": {"idlist": ["1", "2", "3"]}}"#;
        let body: ESearchEnvelope = serde_json::from_str(raw).unwrap();
        assert_eq!(body.esearchresult.idlist.len(), 3);
    }

    #[test]
    fn clean_text_strips_tags_and_entities() {
        assert_eq!(clean_xml_text("a <b>bold</b> &amp; claim"), "a bold & claim");
    }
}
