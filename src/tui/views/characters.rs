//! "Key Figures" — one card per character, in list order.

use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

use crate::core::book::BookRecord;
use crate::tui::theme;

pub fn lines(book: &BookRecord, width: u16) -> Vec<Line<'static>> {
    let body_width = width.saturating_sub(6).max(20) as usize;
    let mut out = Vec::new();

    out.push(super::section_header("Key Figures"));
    out.push(Line::raw(""));

    for character in &book.characters {
        let initial = character.name.chars().next().unwrap_or('?');
        out.push(Line::from(vec![
            Span::styled(
                format!(" ({initial}) "),
                Style::default()
                    .fg(theme::BLOOD_LIGHT)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                character.name.clone(),
                Style::default()
                    .fg(theme::TEXT)
                    .add_modifier(Modifier::BOLD),
            ),
        ]));

        if !character.role.is_empty() {
            out.push(Line::from(vec![
                Span::raw("     "),
                Span::styled(
                    character.role.to_uppercase(),
                    Style::default().fg(theme::BLOOD),
                ),
            ]));
        }

        for row in super::wrap(&character.description, body_width) {
            out.push(Line::from(vec![
                Span::raw("     "),
                Span::styled(row, theme::muted()),
            ]));
        }
        out.push(Line::raw(""));
    }

    out
}
