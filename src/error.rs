use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unexpected status {status} {status_text} from {url}")]
    Status {
        status: u16,
        status_text: String,
        url: String,
    },

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("Markup extraction failed: {0}")]
    Extraction(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Environment variable error: {0}")]
    Env(#[from] std::env::VarError),
}

pub type Result<T> = std::result::Result<T, FetchError>;
