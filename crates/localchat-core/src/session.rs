//! UI-agnostic chat session state
//!
//! Owns the conversation, the text shown in the transcript view, and the
//! Ready/Waiting phase. Front ends feed it raw input and completed replies; it
//! never talks to the model service itself.

use crate::conversation::{Conversation, Turn};

pub const NEW_CONVERSATION_BANNER: &str = "New conversation started! How can I help you?\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Ready,
    Waiting,
}

/// A gateway call the front end must dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingCall {
    pub epoch: u64,
    pub context: String,
    pub question: String,
}

/// The result of a dispatched call, handed back to the UI thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub epoch: u64,
    pub question: String,
    pub reply: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Ignored,
    Busy,
    Quit,
    Dispatched(PendingCall),
}

#[derive(Debug, Clone)]
pub struct ChatSession {
    conversation: Conversation,
    display: String,
    phase: Phase,
    epoch: u64,
}

impl ChatSession {
    pub fn new(app_title: &str) -> Self {
        Self {
            conversation: Conversation::new(),
            display: welcome_banner(app_title),
            phase: Phase::Ready,
            epoch: 0,
        }
    }

    pub fn submit(&mut self, raw: &str) -> Submission {
        let message = raw.trim();
        if message.is_empty() {
            return Submission::Ignored;
        }
        if self.phase == Phase::Waiting {
            return Submission::Busy;
        }
        if message.eq_ignore_ascii_case("exit") {
            return Submission::Quit;
        }

        self.append_display(&format!("You: {}\n", message));
        self.phase = Phase::Waiting;

        Submission::Dispatched(PendingCall {
            epoch: self.epoch,
            context: self.conversation.current().to_string(),
            question: message.to_string(),
        })
    }

    /// Apply a finished call. Returns false when the completion belonged to a
    /// conversation that has since been cleared and was dropped.
    pub fn resolve(&mut self, completion: Completion) -> bool {
        self.phase = Phase::Ready;

        if completion.epoch != self.epoch {
            return false;
        }

        self.append_display(&format!("Bot: {}\n", completion.reply));
        self.conversation
            .append(Turn::new(completion.question, completion.reply));
        true
    }

    pub fn needs_save_prompt(&self) -> bool {
        !self.conversation.is_empty()
    }

    pub fn new_conversation(&mut self) {
        self.conversation.reset();
        self.display = NEW_CONVERSATION_BANNER.to_string();
        self.epoch += 1;
    }

    /// Show a file's raw contents. The conversation sent to the model is untouched.
    pub fn replace_display(&mut self, content: String) {
        self.display = content;
    }

    /// Add an informational line, e.g. a save confirmation.
    pub fn note(&mut self, line: &str) {
        self.append_display(line);
    }

    pub fn display(&self) -> &str {
        &self.display
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_waiting(&self) -> bool {
        self.phase == Phase::Waiting
    }

    fn append_display(&mut self, text: &str) {
        self.display.push_str(text);
    }
}

pub fn welcome_banner(app_title: &str) -> String {
    format!("Welcome to {}! How can I help you?\n", app_title)
}
