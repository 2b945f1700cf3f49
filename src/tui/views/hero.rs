//! Hero section: badge, title, tagline, synopsis teaser, author card,
//! rating/genre/year strip.

use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

use crate::core::book::BookRecord;
use crate::tui::theme;

/// Synopsis teaser length, matching the landing-page treatment.
const SYNOPSIS_TEASER_CHARS: usize = 300;

pub fn lines(book: &BookRecord, width: u16) -> Vec<Line<'static>> {
    let body_width = width.saturating_sub(2).max(20) as usize;
    let mut out = Vec::new();

    out.push(Line::raw(""));
    out.push(Line::from(vec![
        Span::styled("● ", Style::default().fg(theme::BLOOD)),
        Span::styled(
            "NOW TRENDING",
            Style::default()
                .fg(theme::BLOOD_LIGHT)
                .add_modifier(Modifier::BOLD),
        ),
    ]));
    out.push(Line::raw(""));

    out.push(Line::from(Span::styled(
        book.title.clone(),
        Style::default()
            .fg(theme::TEXT)
            .add_modifier(Modifier::BOLD),
    )));
    if !book.tagline.is_empty() {
        out.push(Line::from(Span::styled(
            book.tagline.clone(),
            Style::default()
                .fg(theme::BLOOD)
                .add_modifier(Modifier::ITALIC),
        )));
    }
    out.push(Line::raw(""));

    let teaser = super::truncate(&book.synopsis, SYNOPSIS_TEASER_CHARS);
    for row in super::wrap(&teaser, body_width) {
        out.push(Line::styled(row, theme::muted()));
    }
    out.push(Line::raw(""));

    out.push(Line::from(vec![
        Span::styled("A novel by ", theme::dim()),
        Span::styled(
            book.author.clone(),
            Style::default()
                .fg(theme::TEXT)
                .add_modifier(Modifier::BOLD),
        ),
    ]));

    // Rating / first genre / year strip
    let mut strip: Vec<Span<'static>> = Vec::new();
    if let Some(avg) = average_rating(book) {
        strip.push(Span::styled("★ ", Style::default().fg(theme::GOLD)));
        strip.push(Span::styled(format!("{avg:.1}/5"), theme::muted()));
    }
    if let Some(genre) = book.genres.first() {
        if !strip.is_empty() {
            strip.push(Span::styled(" · ", theme::dim()));
        }
        strip.push(Span::styled(genre.clone(), theme::muted()));
    }
    if !book.publication_year.is_empty() {
        if !strip.is_empty() {
            strip.push(Span::styled(" · ", theme::dim()));
        }
        strip.push(Span::styled(book.publication_year.clone(), theme::muted()));
    }
    if !strip.is_empty() {
        out.push(Line::from(strip));
    }

    if let Some(url) = &book.goodreads_url {
        out.push(Line::from(vec![
            Span::styled("Goodreads: ", theme::dim()),
            Span::styled(url.clone(), Style::default().fg(theme::INFO)),
        ]));
    }
    out.push(Line::raw(""));

    out
}

/// Mean review rating, if any reviews came back.
fn average_rating(book: &BookRecord) -> Option<f64> {
    if book.reviews.is_empty() {
        return None;
    }
    let sum: u32 = book.reviews.iter().map(|r| u32::from(r.rating)).sum();
    Some(f64::from(sum) / book.reviews.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(reviews: serde_json::Value) -> BookRecord {
        BookRecord::from_json(
            &serde_json::json!({
                "title": "It's in the Blood",
                "author": "Mara Voss",
                "tagline": "Some inheritances cannot be refused.",
                "synopsis": "x".repeat(400),
                "genres": ["Thriller"],
                "publicationYear": "2024",
                "goodreadsUrl": "https://goodreads.example/1",
                "characters": [{"name": "Elin"}],
                "reviews": reviews,
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
    fn test_hero_content() {
        let reviews = serde_json::json!([
            {"source": "A", "quote": "q", "rating": 5},
            {"source": "B", "quote": "q", "rating": 4}
        ]);
        let text = flatten(&lines(&book(reviews), 80));
        assert!(text.contains("NOW TRENDING"));
        assert!(text.contains("It's in the Blood"));
        assert!(text.contains("Some inheritances cannot be refused."));
        assert!(text.contains("A novel by Mara Voss"));
        assert!(text.contains("4.5/5"));
        assert!(text.contains("Thriller"));
        assert!(text.contains("2024"));
        assert!(text.contains("https://goodreads.example/1"));
    }

    #[test]
    fn test_synopsis_truncated() {
        let text = flatten(&lines(&book(serde_json::json!([])), 80));
        // 400-char synopsis is cut to the teaser length plus ellipsis
        assert!(text.contains("..."));
        let x_count = text.chars().filter(|&c| c == 'x').count();
        assert_eq!(x_count, SYNOPSIS_TEASER_CHARS);
    }

    #[test]
    fn test_no_reviews_no_rating_strip() {
        let text = flatten(&lines(&book(serde_json::json!([])), 80));
        assert!(!text.contains("/5"));
    }
}
