use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChatError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Ollama request failed with status {status}: {body}{}", service_hint(.status))]
    Service { status: u16, body: String },

    #[error("A conversation title is required")]
    EmptyTitle,

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ChatError>;

/// A 4xx means Ollama answered, so only server-side failures get the hint.
fn service_hint(status: &u16) -> &'static str {
    if (400..500).contains(status) {
        ""
    } else {
        ". Make sure Ollama is running with: ollama serve"
    }
}
