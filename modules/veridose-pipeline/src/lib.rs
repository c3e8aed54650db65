pub mod claims;
pub mod combine;
pub mod evidence;
pub mod infra;
pub mod ingredients;
pub mod orchestrator;
pub mod personalization;
pub mod resolver;
pub mod traits;

pub use evidence::EvidenceScorer;
pub use ingredients::IngredientExtractor;
pub use orchestrator::Orchestrator;
pub use personalization::{LlmStrategy, PersonalizationEngine, PersonalizationStrategy, RulesStrategy};
pub use resolver::{ResolveInput, Resolver};
