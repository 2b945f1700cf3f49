//! Chat panel — "Talk to the Book".
//!
//! Keeps an append-only transcript and the active chat session. The
//! session is rebuilt (and the transcript reset to a single greeting)
//! whenever the bound book record changes; replies are tagged with a
//! session epoch so a superseded session can never touch the new
//! transcript.

use chrono::{DateTime, Utc};
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use uuid::Uuid;

use crate::core::book::BookRecord;
use crate::core::chat::BookChatSession;
use crate::core::gemini::GeminiClient;
use crate::tui::events::AppEvent;
use crate::tui::services::Services;
use crate::tui::theme;
use crate::tui::widgets::input_buffer::InputBuffer;

/// Fallback shown when the model answers with empty text.
pub const SILENT_FALLBACK: &str = "The pages are silent right now...";
/// Fallback appended in place of a reply when a turn fails.
pub const APOLOGY_FALLBACK: &str = "A shadow clouds my vision. I cannot answer right now.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatInputMode {
    Normal,
    Insert,
}

/// Who authored a transcript message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Model,
}

/// One transcript entry. Entries are never mutated or removed.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub id: Uuid,
    pub role: ChatRole,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    fn new(role: ChatRole, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }
}

pub struct ChatWidgetState {
    messages: Vec<ChatMessage>,
    input: InputBuffer,
    input_mode: ChatInputMode,
    session: Option<BookChatSession>,
    /// Bumped on every rebind; replies carrying an older epoch are stale.
    epoch: u64,
    is_typing: bool,
    scroll_offset: usize,
    auto_scroll: bool,
    book_title: String,
    /// Animation counter for the typing indicator.
    tick: u64,
}

impl ChatWidgetState {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            input: InputBuffer::new(),
            input_mode: ChatInputMode::Normal,
            session: None,
            epoch: 0,
            is_typing: false,
            scroll_offset: 0,
            auto_scroll: true,
            book_title: String::new(),
            tick: 0,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn input_mode(&self) -> ChatInputMode {
        self.input_mode
    }

    pub fn is_typing(&self) -> bool {
        self.is_typing
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn session(&self) -> Option<&BookChatSession> {
        self.session.as_ref()
    }

    /// Bind a new book record: open a fresh session and reset the
    /// transcript to one greeting referencing the new title.
    pub fn bind_book(&mut self, client: GeminiClient, book: &BookRecord) {
        self.epoch += 1;
        self.session = Some(BookChatSession::for_book(client, book));
        self.book_title = book.title.clone();
        self.is_typing = false;
        self.scroll_offset = 0;
        self.auto_scroll = true;
        self.messages = vec![ChatMessage::new(ChatRole::Model, greeting_for(&book.title))];
    }

    pub fn on_tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);
    }

    // ── Input handling (two-phase, like the rest of the app) ─────────

    /// Returns true if the event was consumed.
    pub fn handle_input(&mut self, event: &Event, services: &Services) -> bool {
        let Event::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            ..
        }) = event
        else {
            return false;
        };

        match self.input_mode {
            ChatInputMode::Insert => self.handle_insert_input(*code, *modifiers, services),
            ChatInputMode::Normal => self.handle_normal_input(*code, *modifiers),
        }
    }

    fn handle_insert_input(
        &mut self,
        code: KeyCode,
        modifiers: KeyModifiers,
        services: &Services,
    ) -> bool {
        // These always fall through to the global handler
        match (modifiers, code) {
            (KeyModifiers::CONTROL, KeyCode::Char('c')) => return false,
            (_, KeyCode::Tab) | (_, KeyCode::BackTab) => return false,
            _ => {}
        }

        match (modifiers, code) {
            (KeyModifiers::NONE, KeyCode::Esc) => {
                self.input_mode = ChatInputMode::Normal;
                true
            }
            (KeyModifiers::NONE, KeyCode::Enter) => {
                self.submit(services);
                true
            }
            (KeyModifiers::NONE, KeyCode::Backspace) => {
                self.input.backspace();
                true
            }
            (KeyModifiers::NONE, KeyCode::Delete) => {
                self.input.delete();
                true
            }
            (KeyModifiers::NONE, KeyCode::Left) => {
                self.input.move_left();
                true
            }
            (KeyModifiers::NONE, KeyCode::Right) => {
                self.input.move_right();
                true
            }
            (KeyModifiers::NONE, KeyCode::Home) => {
                self.input.move_home();
                true
            }
            (KeyModifiers::NONE, KeyCode::End) => {
                self.input.move_end();
                true
            }
            (KeyModifiers::CONTROL, KeyCode::Char('u')) => {
                self.input.clear();
                true
            }
            (KeyModifiers::CONTROL, KeyCode::Char('a')) => {
                self.input.move_home();
                true
            }
            (KeyModifiers::CONTROL, KeyCode::Char('e')) => {
                self.input.move_end();
                true
            }
            (_, KeyCode::Char(c)) => {
                self.input.insert_char(c);
                true
            }
            _ => true, // Consume but ignore other keys in insert mode
        }
    }

    fn handle_normal_input(&mut self, code: KeyCode, modifiers: KeyModifiers) -> bool {
        if modifiers != KeyModifiers::NONE && modifiers != KeyModifiers::SHIFT {
            return false;
        }

        match code {
            KeyCode::Char('i') | KeyCode::Char('a') | KeyCode::Enter => {
                self.input_mode = ChatInputMode::Insert;
                true
            }
            KeyCode::Char('j') | KeyCode::Down => {
                self.scroll_offset = self.scroll_offset.saturating_add(1);
                self.auto_scroll = false;
                true
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.scroll_offset = self.scroll_offset.saturating_sub(1);
                self.auto_scroll = false;
                true
            }
            KeyCode::Char('G') | KeyCode::End => {
                self.auto_scroll = true;
                true
            }
            KeyCode::Char('g') | KeyCode::Home => {
                self.scroll_offset = 0;
                self.auto_scroll = false;
                true
            }
            _ => false, // Fall through to global handler
        }
    }

    // ── Sending ──────────────────────────────────────────────────────

    fn submit(&mut self, services: &Services) {
        if let Some((snapshot, epoch)) = self.begin_turn() {
            services.send_chat_turn(snapshot, epoch);
        }
    }

    /// Start a turn from the current input: optimistic user append plus a
    /// session snapshot for the network task. Returns `None` (and does
    /// nothing) while a turn is already in flight, when the input is
    /// blank, or when no session is bound.
    fn begin_turn(&mut self) -> Option<(BookChatSession, u64)> {
        if self.is_typing || self.input.is_empty() {
            return None;
        }
        let session = self.session.as_mut()?;

        let text = self.input.take().trim().to_string();
        session.push_user(text.clone());
        self.messages.push(ChatMessage::new(ChatRole::User, text));
        self.is_typing = true;
        self.auto_scroll = true;

        Some((session.clone(), self.epoch))
    }

    // ── Turn completion (called by AppState) ─────────────────────────

    pub fn on_reply(&mut self, epoch: u64, text: String) {
        if epoch != self.epoch {
            log::debug!("Discarding chat reply from stale session (epoch {epoch})");
            return;
        }
        self.is_typing = false;

        let reply = if text.trim().is_empty() {
            SILENT_FALLBACK.to_string()
        } else {
            text
        };
        if let Some(session) = self.session.as_mut() {
            session.push_model(reply.clone());
        }
        self.messages.push(ChatMessage::new(ChatRole::Model, reply));
        self.auto_scroll = true;
    }

    pub fn on_failure(&mut self, epoch: u64) {
        if epoch != self.epoch {
            log::debug!("Discarding chat failure from stale session (epoch {epoch})");
            return;
        }
        self.is_typing = false;

        // The turn never happened as far as the session is concerned
        if let Some(session) = self.session.as_mut() {
            session.pop_unanswered_user();
        }
        self.messages
            .push(ChatMessage::new(ChatRole::Model, APOLOGY_FALLBACK));
        self.auto_scroll = true;
    }

    pub fn handle_event(&mut self, event: &AppEvent) {
        match event {
            AppEvent::ChatReply { epoch, text } => self.on_reply(*epoch, text.clone()),
            AppEvent::ChatFailed { epoch } => self.on_failure(*epoch),
            _ => {}
        }
    }

    // ── Rendering ────────────────────────────────────────────────────

    pub fn render(&mut self, frame: &mut Frame, area: Rect, focused: bool) {
        let block = if focused {
            theme::block_focused("Talk to the Book")
        } else {
            theme::block_default("Talk to the Book")
        }
        .title(
            Line::styled(" AI-Powered Persona ", theme::dim())
                .alignment(ratatui::layout::Alignment::Right),
        );

        let inner = block.inner(area);
        frame.render_widget(block, area);

        let rows = Layout::vertical([Constraint::Min(1), Constraint::Length(3)]).split(inner);
        self.render_transcript(frame, rows[0]);
        self.render_input(frame, rows[1], focused);
    }

    fn render_transcript(&mut self, frame: &mut Frame, area: Rect) {
        let lines = self.transcript_lines(area.width);

        let visible = area.height as usize;
        let max_offset = lines.len().saturating_sub(visible);
        if self.auto_scroll {
            self.scroll_offset = max_offset;
        } else {
            self.scroll_offset = self.scroll_offset.min(max_offset);
        }

        let paragraph =
            Paragraph::new(lines).scroll((self.scroll_offset as u16, 0));
        frame.render_widget(paragraph, area);
    }

    /// Build the transcript as styled lines: a speaker header, wrapped
    /// body, and a blank separator per message, plus the typing indicator.
    fn transcript_lines(&self, width: u16) -> Vec<Line<'static>> {
        let body_width = width.saturating_sub(2).max(20) as usize;
        let mut lines = Vec::new();

        for message in &self.messages {
            let (label, color) = match message.role {
                ChatRole::User => ("You".to_string(), theme::SUCCESS),
                ChatRole::Model => (self.book_title.clone(), theme::BLOOD_LIGHT),
            };
            lines.push(Line::from(Span::styled(
                format!("── {label} ──"),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )));
            for row in super::wrap(&message.text, body_width) {
                lines.push(Line::styled(row, Style::default().fg(theme::TEXT)));
            }
            lines.push(Line::raw(""));
        }

        if self.is_typing {
            let dots = ".".repeat(((self.tick / 3) % 4) as usize);
            lines.push(Line::from(vec![
                Span::styled("▍ ", Style::default().fg(theme::BLOOD)),
                Span::styled(format!("the book is thinking{dots}"), theme::muted()),
            ]));
        }

        lines
    }

    fn render_input(&self, frame: &mut Frame, area: Rect, focused: bool) {
        let (border_color, title) = match self.input_mode {
            ChatInputMode::Insert => (theme::BLOOD, " Message (Esc to exit) "),
            ChatInputMode::Normal if focused => (theme::TEXT_MUTED, " Message (i to type) "),
            ChatInputMode::Normal => (theme::TEXT_DIM, " Message "),
        };

        let display = if self.input.text().is_empty() {
            Line::styled(
                "Ask about the plot, meaning, or secrets...",
                theme::dim(),
            )
        } else {
            let (before, at, after) = self.input.split_at_cursor();
            if self.input_mode == ChatInputMode::Insert {
                let cursor_char = at.map(|c| c.to_string()).unwrap_or_else(|| " ".to_string());
                Line::from(vec![
                    Span::raw(before),
                    Span::styled(
                        cursor_char,
                        Style::default().bg(theme::TEXT).fg(theme::BG_BASE),
                    ),
                    Span::raw(after),
                ])
            } else {
                Line::raw(self.input.text())
            }
        };

        let block = ratatui::widgets::Block::default()
            .borders(ratatui::widgets::Borders::ALL)
            .border_style(Style::default().fg(border_color))
            .title(title);

        frame.render_widget(Paragraph::new(display).block(block), area);
    }
}

impl Default for ChatWidgetState {
    fn default() -> Self {
        Self::new()
    }
}

fn greeting_for(title: &str) -> String {
    format!(
        "Greetings. I am the spirit of \"{title}\". Ask me anything about my \
         pages, my secrets, or the characters that dwell within."
    )
}
