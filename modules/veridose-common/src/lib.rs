pub mod config;
pub mod error;
pub mod policy;
pub mod types;

pub use config::{Config, JudgeMode, PersonalizationMode};
pub use error::VeridoseError;
pub use policy::*;
pub use types::*;
