use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::{
    http::{header, HeaderValue},
    routing::{get, post},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ai_client::Claude;
use dsld_client::DsldClient;
use pubmed_client::PubMedClient;
use veridose_common::{Config, JudgeMode, PersonalizationMode};
use veridose_pipeline::infra::{
    ClaudeLabelReader, DsldCatalog, HttpContextProvider, HttpFetcher, NoopSearcher, ProxyFetcher,
    PubMedIndex, SerpSearcher,
};
use veridose_pipeline::traits::{PageFetcher, WebSearcher};
use veridose_pipeline::{
    EvidenceScorer, IngredientExtractor, LlmStrategy, Orchestrator, PersonalizationEngine,
    PersonalizationStrategy, Resolver, RulesStrategy,
};
use veridose_store::{ensure_schema, PgClaimCache, PgRunLog, PgVerdictCache};

mod routes;

use routes::{health, preflight, product_checker, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("veridose=info".parse()?))
        .init();

    let config = Config::from_env();

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await?;
    ensure_schema(&pool).await?;

    let claude = Claude::new(
        config.anthropic_api_key.clone(),
        config.anthropic_model.clone(),
    );

    let catalog = Arc::new(DsldCatalog::new(DsldClient::new(&config.dsld_base_url)));
    let literature = Arc::new(PubMedIndex::new(PubMedClient::new(
        config.pubmed_api_key.as_deref(),
    )));
    let context = Arc::new(HttpContextProvider::new(&config.context_service_url));

    let searcher: Arc<dyn WebSearcher> = match config.serpapi_api_key.as_deref() {
        Some(key) => Arc::new(SerpSearcher::new(key)),
        None => Arc::new(NoopSearcher),
    };
    let fetcher: Arc<dyn PageFetcher> = match config.scrape_proxy_url.as_deref() {
        Some(proxy) => Arc::new(ProxyFetcher::new(proxy)),
        None => Arc::new(HttpFetcher::new()),
    };
    let vision = Arc::new(ClaudeLabelReader::new(claude.clone()));

    let resolver = Resolver::new(
        catalog.clone(),
        searcher,
        fetcher,
        vision,
        config.catalog_domain.clone(),
    );
    let ingredients = IngredientExtractor::new(catalog);

    let claim_cache = Arc::new(PgClaimCache::new(pool.clone()));
    let mut evidence = EvidenceScorer::new(literature, claim_cache);
    if config.evidence_judge == JudgeMode::Llm {
        evidence = evidence.with_llm_judge(claude.clone());
    }

    let strategy: Arc<dyn PersonalizationStrategy> = match config.personalization_mode {
        PersonalizationMode::Llm => Arc::new(LlmStrategy::new(claude)),
        PersonalizationMode::Rules => Arc::new(RulesStrategy),
    };
    let personalization = PersonalizationEngine::new(context, strategy);

    let orchestrator = Orchestrator::new(
        resolver,
        ingredients,
        evidence,
        personalization,
        Arc::new(PgVerdictCache::new(pool.clone())),
        Arc::new(PgRunLog::new(pool)),
        Duration::from_secs(config.request_timeout_secs),
    );

    let state = Arc::new(AppState { orchestrator });

    let app = Router::new()
        .route(
            "/product_checker",
            post(product_checker).options(preflight),
        )
        .route("/health", get(health))
        .with_state(state)
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(
            tower_http::trace::TraceLayer::new_for_http().make_span_with(
                |request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                },
            ),
        );

    let addr = format!("{}:{}", config.host, config.port);
    info!("Veridose API starting on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
