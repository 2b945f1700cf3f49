//! Landing-page sections.
//!
//! Each section module builds styled lines for the scrollable page; the
//! chat view is the one interactive widget and keeps its own state.

pub mod characters;
pub mod chat;
pub mod hero;
pub mod narrative;
pub mod reviews;

use ratatui::text::{Line, Span};

use crate::core::book::BookRecord;
use crate::tui::theme;

/// Compose the whole landing page: hero, character grid, narrative
/// charts, review quotes, footer. Exactly one of each per render.
pub fn landing_page(book: &BookRecord, width: u16) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    lines.extend(hero::lines(book, width));
    lines.extend(characters::lines(book, width));
    lines.extend(narrative::lines(book, width));
    lines.extend(reviews::lines(book, width));

    lines.push(Line::raw(""));
    lines.push(Line::styled(
        "Enhanced by BookLens AI • Data generated by Gemini • Not affiliated with Goodreads",
        theme::dim(),
    ));
    lines.push(Line::raw(""));

    lines
}

/// Section header in the `── Title ──` style.
pub(crate) fn section_header(title: &str) -> Line<'static> {
    Line::from(Span::styled(format!("── {title} ──"), theme::title()))
}

/// Greedy word wrap to a display width. Words longer than the width are
/// hard-broken.
pub(crate) fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(8);
    let mut out = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word = word;
        // Hard-break oversized words
        while word.chars().count() > width {
            if !current.is_empty() {
                out.push(std::mem::take(&mut current));
            }
            let split: usize = word.char_indices().nth(width).map(|(i, _)| i).unwrap_or(word.len());
            out.push(word[..split].to_string());
            word = &word[split..];
        }

        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > width && !current.is_empty() {
            out.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }

    if !current.is_empty() {
        out.push(current);
    }
    out
}

/// Truncate to `max` characters, appending an ellipsis when cut.
pub(crate) fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max).collect();
        format!("{}...", cut.trim_end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_book() -> BookRecord {
        BookRecord::from_json(
            &serde_json::json!({
                "title": "It's in the Blood",
                "author": "Mara Voss",
                "tagline": "Some inheritances cannot be refused.",
                "synopsis": "A forensic pathologist returns to her island hometown to bury her father and finds a second body in his grave.",
                "genres": ["Thriller"],
                "publicationYear": "2024",
                "characters": [
                    {"name": "Dr. Elin Hart", "role": "Protagonist", "description": "A pathologist with steady hands."}
                ],
                "reviews": [
                    {"source": "The Herald", "quote": "Chilling and precise.", "rating": 5}
                ],
                "themes": ["Inheritance", "Guilt"],
                "emotionalArc": [
                    {"chapter": 1, "tension": 20, "label": "The return"},
                    {"chapter": 9, "tension": 95, "label": "The reveal"}
                ]
            })
            .to_string(),
        )
        .unwrap()
    }

    fn flatten(lines: &[Line<'_>]) -> String {
        lines
            .iter()
            .map(|l| {
                l.spans
                    .iter()
                    .map(|s| s.content.as_ref())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_landing_page_has_every_section_once() {
        let book = sample_book();
        let text = flatten(&landing_page(&book, 80));
        assert_eq!(text.matches("Key Figures").count(), 1);
        assert_eq!(text.matches("Deconstructed Narrative").count(), 1);
        assert_eq!(text.matches("Critical Acclaim").count(), 1);
        assert!(text.contains("It's in the Blood"));
        assert!(text.contains("Enhanced by BookLens AI"));
    }

    #[test]
    fn test_wrap_respects_width() {
        let wrapped = wrap("the quick brown fox jumps over the lazy dog", 10);
        assert!(wrapped.iter().all(|l| l.chars().count() <= 10));
        assert_eq!(wrapped.join(" "), "the quick brown fox jumps over the lazy dog");
    }

    #[test]
    fn test_wrap_hard_breaks_long_words() {
        let wrapped = wrap("abcdefghijklmnopqrstuvwxyz", 10);
        assert!(wrapped.len() >= 2);
        assert!(wrapped.iter().all(|l| l.chars().count() <= 10));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("0123456789ABC", 10), "0123456789...");
    }
}
