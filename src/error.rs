use thiserror::Error;

#[derive(Error, Debug)]
pub enum DigestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Cannot read document: {reason}")]
    InputFailure { reason: String },

    #[error("Configuration error: {reason}")]
    Config { reason: String },

    #[error("HTTP status error: {status}")]
    HttpStatus { status: u16 },

    #[error("Summarization failed: {reason}")]
    Summarization { reason: String },

    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, DigestError>;
