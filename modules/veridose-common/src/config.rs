use std::env;

/// Which personalization strategy the orchestrator runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersonalizationMode {
    /// Deterministic threshold-and-table scoring. Always available.
    Rules,
    /// LLM holistic scoring, falling back to rules on provider failure.
    Llm,
}

/// How claim support is judged against abstracts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JudgeMode {
    /// Phrase-table heuristic over abstracts. Always available.
    Heuristic,
    /// LLM judge, falling back to the heuristic on provider failure.
    Llm,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Postgres
    pub database_url: String,

    // AI provider
    pub anthropic_api_key: String,
    pub anthropic_model: String,

    // Product catalog (DSLD-style API)
    pub dsld_base_url: String,

    // Literature search; a key raises NCBI rate limits but is not required
    pub pubmed_api_key: Option<String>,

    // Web search, scoped to the catalog's domain in resolver queries
    pub serpapi_api_key: Option<String>,
    pub catalog_domain: String,

    // Optional outbound scraping proxy (GET ?url=<target>)
    pub scrape_proxy_url: Option<String>,

    // User-context RPC
    pub context_service_url: String,

    // Web server
    pub host: String,
    pub port: u16,

    // Pipeline behavior
    pub personalization_mode: PersonalizationMode,
    pub evidence_judge: JudgeMode,
    /// Whole-request deadline, seconds.
    pub request_timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment variables.
    /// Panics with a clear message if required vars are missing.
    pub fn from_env() -> Self {
        Self {
            database_url: required_env("DATABASE_URL"),
            anthropic_api_key: required_env("ANTHROPIC_API_KEY"),
            anthropic_model: env::var("ANTHROPIC_MODEL")
                .unwrap_or_else(|_| "claude-haiku-4-5-20251001".to_string()),
            dsld_base_url: env::var("DSLD_BASE_URL")
                .unwrap_or_else(|_| "https://api.ods.od.nih.gov/dsld/v9".to_string()),
            pubmed_api_key: env::var("PUBMED_API_KEY").ok().filter(|v| !v.is_empty()),
            serpapi_api_key: env::var("SERPAPI_API_KEY").ok().filter(|v| !v.is_empty()),
            catalog_domain: env::var("CATALOG_DOMAIN")
                .unwrap_or_else(|_| "dsld.od.nih.gov".to_string()),
            scrape_proxy_url: env::var("SCRAPE_PROXY_URL").ok().filter(|v| !v.is_empty()),
            context_service_url: required_env("CONTEXT_SERVICE_URL"),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .expect("PORT must be a number"),
            personalization_mode: match env::var("PERSONALIZATION_MODE").as_deref() {
                Ok("llm") => PersonalizationMode::Llm,
                _ => PersonalizationMode::Rules,
            },
            evidence_judge: match env::var("EVIDENCE_JUDGE").as_deref() {
                Ok("llm") => JudgeMode::Llm,
                _ => JudgeMode::Heuristic,
            },
            request_timeout_secs: env::var("REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .expect("REQUEST_TIMEOUT_SECS must be a number"),
        }
    }
}

fn required_env(key: &str) -> String {
    env::var(key).unwrap_or_else(|_| panic!("{key} environment variable is required"))
}
