//! Root layout computation for header + page + chat panel + status bar.

use ratatui::layout::{Constraint, Layout, Rect};

/// Height of the header bar (brand + search box).
pub const HEADER_HEIGHT: u16 = 3;
/// Height of the chat panel when visible.
pub const CHAT_PANEL_HEIGHT: u16 = 14;
/// Hide the chat panel below this terminal height.
pub const HIDE_CHAT_THRESHOLD: u16 = 24;

/// Computed layout regions for a single frame.
pub struct AppLayout {
    /// Header bar (brand + search input).
    pub header: Rect,
    /// Scrollable landing-page area.
    pub page: Rect,
    /// Chat panel (None when hidden).
    pub chat: Option<Rect>,
    /// Status bar (bottom row).
    pub status: Rect,
}

/// Chat panel visibility derived from page state and terminal height.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatVisibility {
    Visible,
    Hidden,
}

impl AppLayout {
    /// Compute layout regions from the terminal area.
    ///
    /// `chat_available`: the page is in the success state, so a chat
    /// widget exists to show. It is still hidden on very short terminals.
    pub fn compute(area: Rect, chat_available: bool) -> (Self, ChatVisibility) {
        let visibility = if chat_available && area.height >= HIDE_CHAT_THRESHOLD {
            ChatVisibility::Visible
        } else {
            ChatVisibility::Hidden
        };

        let rows = match visibility {
            ChatVisibility::Visible => Layout::vertical([
                Constraint::Length(HEADER_HEIGHT),
                Constraint::Min(1),
                Constraint::Length(CHAT_PANEL_HEIGHT),
                Constraint::Length(1),
            ])
            .split(area),
            ChatVisibility::Hidden => Layout::vertical([
                Constraint::Length(HEADER_HEIGHT),
                Constraint::Min(1),
                Constraint::Length(0),
                Constraint::Length(1),
            ])
            .split(area),
        };

        let chat = match visibility {
            ChatVisibility::Visible => Some(rows[2]),
            ChatVisibility::Hidden => None,
        };

        (
            Self {
                header: rows[0],
                page: rows[1],
                chat,
                status: rows[3],
            },
            visibility,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_visible_on_tall_terminal() {
        let area = Rect::new(0, 0, 100, 40);
        let (layout, visibility) = AppLayout::compute(area, true);
        assert_eq!(visibility, ChatVisibility::Visible);
        let chat = layout.chat.expect("chat region");
        assert_eq!(chat.height, CHAT_PANEL_HEIGHT);
        assert_eq!(layout.header.height, HEADER_HEIGHT);
        assert_eq!(layout.status.height, 1);
    }

    #[test]
    fn test_chat_hidden_when_unavailable() {
        let area = Rect::new(0, 0, 100, 40);
        let (layout, visibility) = AppLayout::compute(area, false);
        assert_eq!(visibility, ChatVisibility::Hidden);
        assert!(layout.chat.is_none());
    }

    #[test]
    fn test_chat_hidden_on_short_terminal() {
        let area = Rect::new(0, 0, 100, HIDE_CHAT_THRESHOLD - 1);
        let (layout, visibility) = AppLayout::compute(area, true);
        assert_eq!(visibility, ChatVisibility::Hidden);
        assert!(layout.chat.is_none());
    }

    #[test]
    fn test_regions_cover_height() {
        let area = Rect::new(0, 0, 80, 40);
        let (layout, _) = AppLayout::compute(area, true);
        let total = layout.header.height
            + layout.page.height
            + layout.chat.map_or(0, |c| c.height)
            + layout.status.height;
        assert_eq!(total, 40);
    }
}
