//! Chat session bound to one book record.
//!
//! The entire record is serialized into the session's system instruction,
//! establishing a persona and factual grounding that stay fixed for the
//! session's lifetime. Turn history is owned locally and resent with every
//! call; replacing the record means building a new session.

use crate::core::book::BookRecord;
use crate::core::gemini::{ChatTurn, GeminiClient, Result, TurnRole};

/// A conversational session that role-plays as "the book".
#[derive(Clone)]
pub struct BookChatSession {
    client: GeminiClient,
    system_instruction: String,
    history: Vec<ChatTurn>,
}

impl BookChatSession {
    /// Open a session grounded in `book`.
    pub fn for_book(client: GeminiClient, book: &BookRecord) -> Self {
        Self {
            client,
            system_instruction: build_persona_instruction(book),
            history: Vec::new(),
        }
    }

    pub fn system_instruction(&self) -> &str {
        &self.system_instruction
    }

    pub fn history(&self) -> &[ChatTurn] {
        &self.history
    }

    pub fn push_user(&mut self, text: impl Into<String>) {
        self.history.push(ChatTurn::user(text));
    }

    pub fn push_model(&mut self, text: impl Into<String>) {
        self.history.push(ChatTurn::model(text));
    }

    /// Drop the trailing user turn after a failed send so the history
    /// stays alternating for the next attempt.
    pub fn pop_unanswered_user(&mut self) {
        if self.history.last().is_some_and(|t| t.role == TurnRole::User) {
            self.history.pop();
        }
    }

    /// Send the current history as one turn and return the reply text.
    ///
    /// The caller appends the reply via [`push_model`](Self::push_model)
    /// once it has been accepted; a snapshot of the session can therefore
    /// run on a spawned task without locking.
    pub async fn send(&self) -> Result<String> {
        self.client
            .chat_turn(&self.system_instruction, &self.history)
            .await
    }
}

fn build_persona_instruction(book: &BookRecord) -> String {
    let context = serde_json::to_string(book).unwrap_or_default();
    format!(
        "You are the personification of the book \"{title}\" by {author}.\n\
         Your personality should reflect the tone of the book (e.g., mysterious, \
         dark, intellectual, or thrilling).\n\
         Answer questions about the plot, characters, and themes based on the \
         following context:\n\
         {context}\n\n\
         Keep answers concise (under 100 words) and engaging. Do not spoil major \
         plot twists unless explicitly asked.",
        title = book.title,
        author = book.author,
    )
}
