pub mod ai;
pub mod config;
pub mod conversation;
pub mod dispatch;
pub mod error;
pub mod gateway;
pub mod persistence;
pub mod session;

// Re-export main types for convenience
pub use ai::{CompletionBackend, OllamaClient};
pub use config::{Config, ThemeMode};
pub use conversation::{Conversation, Turn};
pub use dispatch::Dispatcher;
pub use error::{ChatError, Result};
pub use gateway::{build_prompt, ModelGateway, ERROR_PREFIX};
pub use persistence::{title_to_filename, ConversationStore};
pub use session::{ChatSession, Completion, PendingCall, Phase, Submission};
