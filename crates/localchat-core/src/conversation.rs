//! Conversation state shared with the model on every turn.
//!
//! The model only ever sees the flattened transcript. The discrete turns it was
//! built from are kept alongside so callers can count or inspect them without
//! reparsing the string.

/// One user submission and the reply it produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub user: String,
    pub reply: String,
}

impl Turn {
    pub fn new(user: impl Into<String>, reply: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            reply: reply.into(),
        }
    }

    /// The block this turn contributes to the transcript.
    pub fn render(&self) -> String {
        format!("\nUser: {}\nAI: {}", self.user, self.reply)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Conversation {
    turns: Vec<Turn>,
    transcript: String,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, turn: Turn) {
        self.transcript.push_str(&turn.render());
        self.turns.push(turn);
    }

    pub fn reset(&mut self) {
        self.turns.clear();
        self.transcript.clear();
    }

    /// Full transcript, passed verbatim as gateway context.
    pub fn current(&self) -> &str {
        &self.transcript
    }

    pub fn is_empty(&self) -> bool {
        self.transcript.is_empty()
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }
}
