//! Centralized Crimson & Slate color theme for the BookLens TUI.
//!
//! All color constants are RGB truecolor. Views import from here
//! instead of using inline `Color::*` literals.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders};

// ── Primary palette ─────────────────────────────────────────────────────────

/// Blood crimson — primary accent, headings, the tension curve.
pub const BLOOD: Color = Color::Rgb(0xE1, 0x1D, 0x48);
/// Light crimson — highlights, hover-equivalent emphasis.
pub const BLOOD_LIGHT: Color = Color::Rgb(0xFB, 0x71, 0x85);
/// Dark crimson — subtle fills, chart body.
pub const BLOOD_DARK: Color = Color::Rgb(0x88, 0x13, 0x37);

// ── Accent ──────────────────────────────────────────────────────────────────

/// Gold — star ratings, theme tags.
pub const GOLD: Color = Color::Rgb(0xEA, 0xB3, 0x08);

// ── Backgrounds ─────────────────────────────────────────────────────────────

/// Near-black slate — base background.
pub const BG_BASE: Color = Color::Rgb(0x02, 0x06, 0x17);
/// Surface slate — elevated panels, cards.
pub const BG_SURFACE: Color = Color::Rgb(0x0F, 0x17, 0x2A);

// ── Text ────────────────────────────────────────────────────────────────────

/// Primary text.
pub const TEXT: Color = Color::Rgb(0xE2, 0xE8, 0xF0);
/// Muted text — secondary labels, body copy.
pub const TEXT_MUTED: Color = Color::Rgb(0x94, 0xA3, 0xB8);
/// Dim text — hints, separators, faint chrome.
pub const TEXT_DIM: Color = Color::Rgb(0x47, 0x55, 0x69);

// ── Semantic ────────────────────────────────────────────────────────────────

/// Error — failed fetches, failed turns.
pub const ERROR: Color = Color::Rgb(0xDC, 0x26, 0x26);
/// Success — confirmations.
pub const SUCCESS: Color = Color::Rgb(0x4A, 0xDE, 0x80);
/// Info — informational highlights.
pub const INFO: Color = Color::Rgb(0x38, 0xBD, 0xF8);

// ── Style helpers ───────────────────────────────────────────────────────────

/// Page/section title (crimson bold).
pub fn title() -> Style {
    Style::default().fg(BLOOD).add_modifier(Modifier::BOLD)
}

/// Section header style.
pub fn heading() -> Style {
    Style::default().fg(TEXT).add_modifier(Modifier::BOLD)
}

/// Focused border style.
pub fn border_focused() -> Style {
    Style::default().fg(BLOOD)
}

/// Unfocused border style.
pub fn border_default() -> Style {
    Style::default().fg(TEXT_DIM)
}

/// Highlighted/selected item.
pub fn highlight() -> Style {
    Style::default().fg(BLOOD_LIGHT).add_modifier(Modifier::BOLD)
}

/// Muted label text.
pub fn muted() -> Style {
    Style::default().fg(TEXT_MUTED)
}

/// Dim text for faint chrome.
pub fn dim() -> Style {
    Style::default().fg(TEXT_DIM)
}

/// Key hint style (e.g., "[q]:quit").
pub fn key_hint() -> Style {
    Style::default().fg(TEXT_DIM)
}

/// Status bar brand badge.
pub fn brand_badge() -> Style {
    Style::default()
        .fg(BG_BASE)
        .bg(BLOOD)
        .add_modifier(Modifier::BOLD)
}

/// Insert mode badge.
pub fn insert_badge() -> Style {
    Style::default()
        .fg(BG_BASE)
        .bg(BLOOD_LIGHT)
        .add_modifier(Modifier::BOLD)
}

// ── Block builders ──────────────────────────────────────────────────────────

/// A bordered block with focused styling.
pub fn block_focused(title: &str) -> Block<'_> {
    Block::default()
        .title(format!(" {title} "))
        .borders(Borders::ALL)
        .border_style(border_focused())
}

/// A bordered block with default (unfocused) styling.
pub fn block_default(title: &str) -> Block<'_> {
    Block::default()
        .title(format!(" {title} "))
        .borders(Borders::ALL)
        .border_style(border_default())
}
