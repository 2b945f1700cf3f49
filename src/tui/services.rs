use tokio::sync::mpsc;

use crate::core::chat::BookChatSession;
use crate::core::gemini::GeminiClient;

use super::events::AppEvent;

/// Centralized handle to the backend: the Gemini client plus the event
/// channel spawned tasks report back through.
///
/// Created once at startup, then passed (by ref) to views that need to
/// start network work. Tasks never touch app state directly.
pub struct Services {
    pub gemini: GeminiClient,
    pub event_tx: mpsc::UnboundedSender<AppEvent>,
}

impl Services {
    pub fn new(gemini: GeminiClient, event_tx: mpsc::UnboundedSender<AppEvent>) -> Self {
        Self { gemini, event_tx }
    }

    /// Spawn a book fetch. The result comes back as `BookLoaded` or
    /// `BookFailed`, tagged with `generation` so stale completions can be
    /// discarded by the receiver.
    pub fn fetch_book(&self, query: String, generation: u64) {
        let gemini = self.gemini.clone();
        let tx = self.event_tx.clone();

        tokio::spawn(async move {
            log::info!("Fetching book record for {query:?} (generation {generation})");
            match gemini.generate_book(&query).await {
                Ok(book) => {
                    let _ = tx.send(AppEvent::BookLoaded {
                        generation,
                        book: Box::new(book),
                    });
                }
                Err(e) => {
                    log::error!("Book fetch failed: {e}");
                    let _ = tx.send(AppEvent::BookFailed {
                        generation,
                        error: e.to_string(),
                    });
                }
            }
        });
    }

    /// Spawn one chat turn on a session snapshot. The reply comes back as
    /// `ChatReply` or `ChatFailed`, tagged with the session `epoch`.
    pub fn send_chat_turn(&self, session: BookChatSession, epoch: u64) {
        let tx = self.event_tx.clone();

        tokio::spawn(async move {
            match session.send().await {
                Ok(text) => {
                    let _ = tx.send(AppEvent::ChatReply { epoch, text });
                }
                Err(e) => {
                    log::error!("Chat turn failed: {e}");
                    let _ = tx.send(AppEvent::ChatFailed { epoch });
                }
            }
        });
    }
}
