pub mod ollama;

pub use ollama::OllamaClient;

use async_trait::async_trait;

use crate::error::Result;

/// A prompt-in, text-out language model service.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}
