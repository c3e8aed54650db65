//! Production implementations of the pipeline's provider traits.

pub mod catalog;
pub mod context;
pub mod fetch;
pub mod literature;
pub mod search;
pub mod vision;

pub use catalog::DsldCatalog;
pub use context::HttpContextProvider;
pub use fetch::{HttpFetcher, ProxyFetcher};
pub use literature::PubMedIndex;
pub use search::{NoopSearcher, SerpSearcher};
pub use vision::ClaudeLabelReader;
