//! Central application state and event loop (Elm architecture).
//!
//! One task owns all state: render a frame, wait for the next event
//! (tick, backend completion, terminal input), update, repeat. Network
//! completions carry generation/epoch tags so anything superseded by a
//! newer search is discarded on arrival.

use std::io;
use std::time::Duration;

use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame, Terminal,
};
use tokio::sync::mpsc;

use crate::config::AppConfig;
use crate::core::book::BookRecord;

use super::events::{AppEvent, LoadingState, PanelFocus};
use super::layout::AppLayout;
use super::services::Services;
use super::theme;
use super::views;
use super::views::chat::{ChatInputMode, ChatWidgetState};
use super::widgets::input_buffer::InputBuffer;

/// Fixed user-facing message for a failed book fetch.
pub const FETCH_ERROR_MESSAGE: &str =
    "Failed to conjure the book details. The spirits are quiet.";
/// Loader copy.
pub const LOADING_MESSAGE: &str = "Consulting the library of infinite pages...";

const SPINNER_FRAMES: [&str; 8] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧"];

/// Central application state.
pub struct AppState {
    /// Whether the app is still running.
    running: bool,
    /// Page-level state machine.
    status: LoadingState,
    /// The live book record (Success only).
    book: Option<BookRecord>,
    /// The live error message (Error only).
    error_message: Option<String>,
    /// Which panel receives input on the success screen.
    focus: PanelFocus,
    /// Header search input.
    search: InputBuffer,
    /// Whether the search box has input focus.
    search_active: bool,
    /// Scroll offset into the landing page.
    page_scroll: usize,
    /// Whether the help modal is open.
    show_help: bool,
    /// Monotonic fetch counter; completions with an older tag are stale.
    generation: u64,
    /// Query used at startup and for retry.
    default_query: String,
    /// Chat panel state.
    chat: ChatWidgetState,
    /// Animation counter.
    tick: u64,
    /// Receiver for backend events.
    event_rx: mpsc::UnboundedReceiver<AppEvent>,
    /// Backend services handle.
    services: Services,
}

impl AppState {
    pub fn new(
        config: &AppConfig,
        event_rx: mpsc::UnboundedReceiver<AppEvent>,
        services: Services,
    ) -> Self {
        Self {
            running: true,
            status: LoadingState::Idle,
            book: None,
            error_message: None,
            focus: PanelFocus::Page,
            search: InputBuffer::new(),
            search_active: false,
            page_scroll: 0,
            show_help: false,
            generation: 0,
            default_query: config.page.default_query.clone(),
            chat: ChatWidgetState::new(),
            tick: 0,
            event_rx,
            services,
        }
    }

    pub fn status(&self) -> LoadingState {
        self.status
    }

    pub fn book(&self) -> Option<&BookRecord> {
        self.book.as_ref()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn focus(&self) -> PanelFocus {
        self.focus
    }

    pub fn chat(&self) -> &ChatWidgetState {
        &self.chat
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    // ── Elm event loop ──────────────────────────────────────────────────

    /// Main event loop: render → select → update → loop.
    pub async fn run(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
        tick_rate: Duration,
    ) -> io::Result<()> {
        let mut tick_interval = tokio::time::interval(tick_rate);
        let mut event_stream = EventStream::new();

        // App start: auto-fetch the default book
        self.start_fetch(self.default_query.clone());

        while self.running {
            terminal.draw(|frame| self.render(frame))?;

            tokio::select! {
                _ = tick_interval.tick() => {
                    self.handle_event(AppEvent::Tick);
                }
                Some(event) = self.event_rx.recv() => {
                    self.handle_event(event);
                }
                Some(Ok(crossterm_event)) = event_stream.next() => {
                    self.handle_event(AppEvent::Input(crossterm_event));
                }
            }
        }

        Ok(())
    }

    // ── Event handling ──────────────────────────────────────────────────

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Input(crossterm_event) => self.handle_input(crossterm_event),
            AppEvent::Tick => {
                self.tick = self.tick.wrapping_add(1);
                self.chat.on_tick();
            }
            AppEvent::BookLoaded { generation, book } => {
                self.on_book_loaded(generation, *book);
            }
            AppEvent::BookFailed { generation, error } => {
                self.on_book_failed(generation, &error);
            }
            chat_event @ (AppEvent::ChatReply { .. } | AppEvent::ChatFailed { .. }) => {
                self.chat.handle_event(&chat_event);
            }
            AppEvent::Quit => {
                self.running = false;
            }
        }
    }

    fn handle_input(&mut self, event: Event) {
        // Priority 1: help modal consumes everything
        if self.show_help {
            if let Event::Key(KeyEvent {
                code,
                kind: KeyEventKind::Press,
                ..
            }) = event
            {
                if matches!(code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                    self.show_help = false;
                }
            }
            return;
        }

        // Priority 2: search box
        if self.search_active {
            self.handle_search_input(&event);
            return;
        }

        // Priority 3: chat panel (success screen only)
        if self.focus == PanelFocus::Chat
            && self.status == LoadingState::Success
            && self.chat.handle_input(&event, &self.services)
        {
            return;
        }

        // Priority 4: global keybindings
        let Event::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            ..
        }) = event
        else {
            return;
        };

        match (modifiers, code) {
            (KeyModifiers::CONTROL, KeyCode::Char('c')) => self.running = false,
            (KeyModifiers::NONE | KeyModifiers::SHIFT, _) => match code {
                KeyCode::Char('q') => self.running = false,
                KeyCode::Char('?') => self.show_help = true,
                KeyCode::Char('/') => {
                    self.search_active = true;
                }
                KeyCode::Tab => {
                    if self.status == LoadingState::Success {
                        self.focus = self.focus.toggle();
                    }
                }
                KeyCode::Char('r') => {
                    if self.status == LoadingState::Error {
                        self.retry();
                    }
                }
                // Page scrolling
                KeyCode::Char('j') | KeyCode::Down => self.scroll_page(1),
                KeyCode::Char('k') | KeyCode::Up => self.scroll_page(-1),
                KeyCode::PageDown => self.scroll_page(10),
                KeyCode::PageUp => self.scroll_page(-10),
                KeyCode::Char('g') | KeyCode::Home => self.page_scroll = 0,
                KeyCode::Char('G') | KeyCode::End => self.page_scroll = usize::MAX,
                _ => {}
            },
            _ => {}
        }
    }

    fn handle_search_input(&mut self, event: &Event) {
        let Event::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            ..
        }) = event
        else {
            return;
        };

        match (*modifiers, *code) {
            (KeyModifiers::NONE, KeyCode::Esc) => self.search_active = false,
            (KeyModifiers::NONE, KeyCode::Enter) => self.submit_search(),
            (KeyModifiers::NONE, KeyCode::Backspace) => self.search.backspace(),
            (KeyModifiers::NONE, KeyCode::Delete) => self.search.delete(),
            (KeyModifiers::NONE, KeyCode::Left) => self.search.move_left(),
            (KeyModifiers::NONE, KeyCode::Right) => self.search.move_right(),
            (KeyModifiers::NONE, KeyCode::Home) => self.search.move_home(),
            (KeyModifiers::NONE, KeyCode::End) => self.search.move_end(),
            (KeyModifiers::CONTROL, KeyCode::Char('u')) => self.search.clear(),
            (KeyModifiers::CONTROL, KeyCode::Char('c')) => self.running = false,
            (_, KeyCode::Char(c)) => self.search.insert_char(c),
            _ => {}
        }
    }

    // ── State machine ───────────────────────────────────────────────────

    /// Submit the header search. Empty or whitespace-only input is a
    /// no-op: state stays exactly as it was.
    pub fn submit_search(&mut self) {
        let query = self.search.text().trim().to_string();
        if query.is_empty() {
            return;
        }
        self.search_active = false;
        self.start_fetch(query);
    }

    /// Re-issue the default query from the error screen.
    pub fn retry(&mut self) {
        self.start_fetch(self.default_query.clone());
    }

    /// Transition to LOADING (synchronously) and spawn the fetch.
    /// Any previous record or error is discarded; completions of older
    /// fetches become stale via the generation counter.
    pub fn start_fetch(&mut self, query: String) {
        self.generation += 1;
        self.status = LoadingState::Loading;
        self.book = None;
        self.error_message = None;
        self.page_scroll = 0;
        self.focus = PanelFocus::Page;
        self.services.fetch_book(query, self.generation);
    }

    pub fn on_book_loaded(&mut self, generation: u64, book: BookRecord) {
        if generation != self.generation {
            log::debug!("Discarding stale book fetch (generation {generation})");
            return;
        }
        log::info!("Book record loaded: {:?}", book.title);
        self.chat.bind_book(self.services.gemini.clone(), &book);
        self.book = Some(book);
        self.error_message = None;
        self.status = LoadingState::Success;
        self.page_scroll = 0;
    }

    pub fn on_book_failed(&mut self, generation: u64, error: &str) {
        if generation != self.generation {
            log::debug!("Discarding stale fetch failure (generation {generation})");
            return;
        }
        log::error!("Book fetch failed: {error}");
        self.book = None;
        self.error_message = Some(FETCH_ERROR_MESSAGE.to_string());
        self.status = LoadingState::Error;
    }

    fn scroll_page(&mut self, delta: i64) {
        if delta >= 0 {
            self.page_scroll = self.page_scroll.saturating_add(delta as usize);
        } else {
            self.page_scroll = self.page_scroll.saturating_sub((-delta) as usize);
        }
        // Clamped against content length at render time
    }

    // ── Rendering ───────────────────────────────────────────────────────

    fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();

        let chat_available = self.status == LoadingState::Success;
        let (layout, _) = AppLayout::compute(area, chat_available);

        self.render_header(frame, layout.header);

        match self.status {
            LoadingState::Idle | LoadingState::Loading => {
                self.render_loader(frame, layout.page)
            }
            LoadingState::Error => self.render_error(frame, layout.page),
            LoadingState::Success => self.render_page(frame, layout.page),
        }

        if let Some(chat_area) = layout.chat {
            self.chat
                .render(frame, chat_area, self.focus == PanelFocus::Chat);
        }

        self.render_status_bar(frame, layout.status);

        if self.show_help {
            self.render_help_modal(frame, area);
        }
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(if self.search_active {
                theme::border_focused()
            } else {
                theme::border_default()
            });
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let search_display: Line = if self.search_active {
            let (before, at, after) = self.search.split_at_cursor();
            let cursor_char = at.map(|c| c.to_string()).unwrap_or_else(|| " ".to_string());
            Line::from(vec![
                Span::styled("⌕ ", Style::default().fg(theme::BLOOD)),
                Span::raw(before),
                Span::styled(
                    cursor_char,
                    Style::default().bg(theme::TEXT).fg(theme::BG_BASE),
                ),
                Span::raw(after),
            ])
        } else if self.search.text().is_empty() {
            Line::from(vec![
                Span::styled("⌕ ", theme::dim()),
                Span::styled("Search another book... (/)", theme::dim()),
            ])
        } else {
            Line::from(vec![
                Span::styled("⌕ ", theme::dim()),
                Span::styled(self.search.text(), theme::muted()),
            ])
        };

        let header = Line::from(
            std::iter::once(Span::styled(" BookLens ", theme::brand_badge()))
                .chain(std::iter::once(Span::raw("  ")))
                .chain(search_display.spans)
                .collect::<Vec<_>>(),
        );
        frame.render_widget(Paragraph::new(header), inner);
    }

    fn render_loader(&self, frame: &mut Frame, area: Rect) {
        let spinner = SPINNER_FRAMES[(self.tick as usize) % SPINNER_FRAMES.len()];
        let lines = vec![
            Line::raw(""),
            Line::from(Span::styled(
                spinner.to_string(),
                Style::default().fg(theme::BLOOD),
            )),
            Line::raw(""),
            Line::from(Span::styled(LOADING_MESSAGE, theme::muted())),
        ];
        frame.render_widget(
            Paragraph::new(lines).alignment(Alignment::Center),
            vertical_center(area, 5),
        );
    }

    fn render_error(&self, frame: &mut Frame, area: Rect) {
        let message = self
            .error_message
            .clone()
            .unwrap_or_else(|| FETCH_ERROR_MESSAGE.to_string());
        let lines = vec![
            Line::from(Span::styled(
                "✗",
                Style::default()
                    .fg(theme::ERROR)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::raw(""),
            Line::from(Span::styled(
                "Error Fetching Data",
                Style::default()
                    .fg(theme::TEXT)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(message, theme::muted())),
            Line::raw(""),
            Line::from(vec![
                Span::styled("Press ", theme::dim()),
                Span::styled("r", theme::highlight()),
                Span::styled(" to try again", theme::dim()),
            ]),
        ];
        frame.render_widget(
            Paragraph::new(lines).alignment(Alignment::Center),
            vertical_center(area, 7),
        );
    }

    fn render_page(&mut self, frame: &mut Frame, area: Rect) {
        let Some(book) = &self.book else {
            return;
        };

        let lines = views::landing_page(book, area.width.saturating_sub(2));
        let max_offset = lines.len().saturating_sub(area.height as usize);
        self.page_scroll = self.page_scroll.min(max_offset);

        let paragraph = Paragraph::new(lines)
            .scroll((self.page_scroll as u16, 0))
            .block(Block::default().padding(ratatui::widgets::Padding::horizontal(1)));
        frame.render_widget(paragraph, area);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let state_color = match self.status {
            LoadingState::Loading => theme::INFO,
            LoadingState::Success => theme::SUCCESS,
            LoadingState::Error => theme::ERROR,
            LoadingState::Idle => theme::TEXT_MUTED,
        };

        let mode_indicator = match self.chat.input_mode() {
            ChatInputMode::Insert if self.focus == PanelFocus::Chat => {
                Span::styled(" INSERT ", theme::insert_badge())
            }
            _ if self.search_active => Span::styled(" SEARCH ", theme::insert_badge()),
            _ => Span::raw(""),
        };

        let status = Line::from(vec![
            Span::styled(" BookLens ", theme::brand_badge()),
            Span::raw(" "),
            mode_indicator,
            Span::raw(" "),
            Span::styled(self.status.label(), Style::default().fg(state_color)),
            Span::raw(" │ "),
            Span::styled(
                self.focus.label(),
                Style::default()
                    .fg(theme::BLOOD_LIGHT)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" │ "),
            Span::styled("/", theme::key_hint()),
            Span::raw(":search "),
            Span::styled("Tab", theme::key_hint()),
            Span::raw(":chat "),
            Span::styled("j/k", theme::key_hint()),
            Span::raw(":scroll "),
            Span::styled("?", theme::key_hint()),
            Span::raw(":help "),
            Span::styled("q", theme::key_hint()),
            Span::raw(":quit"),
        ]);

        frame.render_widget(Paragraph::new(status), area);
    }

    fn render_help_modal(&self, frame: &mut Frame, area: Rect) {
        let modal = centered_rect(60, 70, area);

        let keybindings = [
            ("Global:", ""),
            ("q", "Quit application"),
            ("?", "Toggle this help"),
            ("/", "Focus the search box"),
            ("Tab", "Toggle page/chat focus"),
            ("Ctrl+C", "Force quit"),
            ("", ""),
            ("Page:", ""),
            ("j/k", "Scroll down/up"),
            ("g / G", "Jump to top / bottom"),
            ("PgUp/PgDn", "Scroll by ten lines"),
            ("r", "Retry (from the error screen)"),
            ("", ""),
            ("Search:", ""),
            ("Enter", "Fetch the typed book"),
            ("Esc", "Leave the search box"),
            ("", ""),
            ("Chat:", ""),
            ("i / Enter", "Enter insert mode"),
            ("Esc", "Exit insert mode"),
            ("Enter", "Send message (insert mode)"),
            ("j/k", "Scroll transcript"),
        ];

        let mut lines = vec![
            Line::raw(""),
            Line::from(Span::styled(
                " Keybindings",
                Style::default()
                    .fg(theme::BLOOD)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::raw(""),
        ];

        for (key, desc) in &keybindings {
            if key.is_empty() {
                lines.push(Line::raw(""));
            } else if desc.is_empty() {
                lines.push(Line::from(Span::styled(
                    format!("  {key}"),
                    Style::default()
                        .fg(theme::BLOOD_LIGHT)
                        .add_modifier(Modifier::BOLD),
                )));
            } else {
                lines.push(Line::from(vec![
                    Span::raw("  "),
                    Span::styled(
                        format!("{key:<14}"),
                        Style::default()
                            .fg(theme::TEXT)
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::styled((*desc).to_string(), theme::muted()),
                ]));
            }
        }

        let block = Block::default()
            .title(" Help ")
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::BLOOD));

        frame.render_widget(Clear, modal);
        frame.render_widget(Paragraph::new(lines).block(block), modal);
    }
}

/// Calculate a centered rect using percentage of parent area.
pub(super) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .split(area);

    Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .split(popup_layout[1])[1]
}

/// A band of `height` rows vertically centered in `area`.
fn vertical_center(area: Rect, height: u16) -> Rect {
    let height = height.min(area.height);
    let top = area.y + (area.height - height) / 2;
    Rect::new(area.x, top, area.width, height)
}
