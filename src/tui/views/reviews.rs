//! "Critical Acclaim" — every review quote with source and star rating.

use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

use crate::core::book::BookRecord;
use crate::tui::theme;

pub fn lines(book: &BookRecord, width: u16) -> Vec<Line<'static>> {
    let body_width = width.saturating_sub(4).max(20) as usize;
    let mut out = Vec::new();

    if book.reviews.is_empty() {
        return out;
    }

    out.push(super::section_header("Critical Acclaim"));
    out.push(Line::raw(""));

    for review in &book.reviews {
        for row in super::wrap(&format!("“{}”", review.quote), body_width) {
            out.push(Line::from(vec![
                Span::raw("  "),
                Span::styled(
                    row,
                    Style::default()
                        .fg(theme::TEXT)
                        .add_modifier(Modifier::ITALIC),
                ),
            ]));
        }

        let stars = "★".repeat(usize::from(review.rating));
        out.push(Line::from(vec![
            Span::raw("  "),
            Span::styled(
                review.source.to_uppercase(),
                Style::default()
                    .fg(theme::BLOOD_LIGHT)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(stars, Style::default().fg(theme::GOLD)),
        ]));
        out.push(Line::raw(""));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_book() -> BookRecord {
        BookRecord::from_json(
            &serde_json::json!({
                "title": "T",
                "author": "A",
                "synopsis": "S",
                "characters": [{"name": "X"}],
                "reviews": [
                    {"source": "The Herald", "quote": "Chilling.", "rating": 5},
                    {"source": "Daily Page", "quote": "A slow burn.", "rating": 3}
                ],
                "emotionalArc": [{"chapter": 1, "tension": 10}]
            })
            .to_string(),
        )
        .unwrap()
    }

    fn flatten(lines: &[Line<'_>]) -> String {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_quotes_and_star_counts() {
        let text = flatten(&lines(&sample_book(), 80));
        assert!(text.contains("Critical Acclaim"));
        assert!(text.contains("“Chilling.”"));
        assert!(text.contains("THE HERALD"));
        assert!(text.contains("★★★★★"));
        assert!(text.contains("“A slow burn.”"));
        assert!(text.contains("DAILY PAGE"));
        // Exactly three stars for the three-star review
        assert!(text.contains("★★★"));
        assert!(!text.contains("★★★★★★"));
    }

    #[test]
    fn test_no_reviews_renders_nothing() {
        let mut book = sample_book();
        book.reviews.clear();
        assert!(lines(&book, 80).is_empty());
    }
}
