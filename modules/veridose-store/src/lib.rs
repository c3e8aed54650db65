//! Postgres implementations of the pipeline's storage traits.

mod claim_cache;
mod run_log;
mod schema;
mod verdict_cache;

pub use claim_cache::PgClaimCache;
pub use run_log::PgRunLog;
pub use schema::ensure_schema;
pub use verdict_cache::PgVerdictCache;
