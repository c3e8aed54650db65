use thiserror::Error;

pub type Result<T> = std::result::Result<T, PubMedError>;

#[derive(Debug, Error)]
pub enum PubMedError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for PubMedError {
    fn from(err: reqwest::Error) -> Self {
        PubMedError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for PubMedError {
    fn from(err: serde_json::Error) -> Self {
        PubMedError::Parse(err.to_string())
    }
}
