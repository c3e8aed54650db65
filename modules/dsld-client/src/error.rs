use thiserror::Error;

pub type Result<T> = std::result::Result<T, DsldError>;

#[derive(Debug, Error)]
pub enum DsldError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for DsldError {
    fn from(err: reqwest::Error) -> Self {
        DsldError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for DsldError {
    fn from(err: serde_json::Error) -> Self {
        DsldError::Parse(err.to_string())
    }
}
