use std::sync::Arc;

use tracing::{debug, warn};

use crate::ai::CompletionBackend;

pub const ERROR_PREFIX: &str = "Error processing response:";

/// Fill the fixed prompt template with the transcript so far and the new question.
pub fn build_prompt(context: &str, question: &str) -> String {
    format!(
        "Answer the question below.\n\nHere is the conversation history: {}\n\nQuestion: {}\n\nAnswer:",
        context, question
    )
}

/// Boundary over the model service. Never fails: errors come back as reply text.
#[derive(Clone)]
pub struct ModelGateway {
    backend: Arc<dyn CompletionBackend>,
}

impl ModelGateway {
    pub fn new(backend: Arc<dyn CompletionBackend>) -> Self {
        Self { backend }
    }

    pub async fn complete(&self, context: &str, question: &str) -> String {
        let prompt = build_prompt(context, question);
        debug!(prompt_len = prompt.len(), "sending prompt to model service");

        match self.backend.generate(&prompt).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "model call failed");
                format!("{} {}", ERROR_PREFIX, e)
            }
        }
    }
}
