use thiserror::Error;

#[derive(Error, Debug)]
pub enum VeridoseError {
    /// Caller error: the request body did not carry exactly one input field.
    /// The message doubles as the HTTP 400 body, so keep it stable.
    #[error("Provide exactly one of text, url, image_base64")]
    InvalidPayload,

    #[error("Could not resolve product: {0}")]
    UnresolvedInput(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}
