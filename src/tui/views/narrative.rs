//! "Deconstructed Narrative" — the tension chart, theme tags, and a
//! pull-quote from the first review.

use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

use crate::core::book::BookRecord;
use crate::tui::theme;
use crate::tui::widgets::arc_chart::ArcChart;

pub fn lines(book: &BookRecord, width: u16) -> Vec<Line<'static>> {
    let body_width = width.saturating_sub(2).max(20) as usize;
    let mut out = Vec::new();

    out.push(super::section_header("Deconstructed Narrative"));
    out.push(Line::raw(""));
    for row in super::wrap(
        "An AI-driven breakdown of the emotional cadence and thematic structure \
         hidden within the pages.",
        body_width,
    ) {
        out.push(Line::styled(row, theme::muted()));
    }
    out.push(Line::raw(""));

    out.push(Line::from(vec![
        Span::styled(
            "Narrative Tension",
            Style::default()
                .fg(theme::TEXT)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled("  emotional velocity by chapter", theme::dim()),
    ]));
    out.push(Line::raw(""));
    out.extend(ArcChart::new(&book.emotional_arc).build_lines(width.saturating_sub(2)));
    out.push(Line::raw(""));

    if !book.themes.is_empty() {
        out.push(Line::from(Span::styled(
            "Core Themes",
            Style::default()
                .fg(theme::TEXT)
                .add_modifier(Modifier::BOLD),
        )));
        out.push(Line::raw(""));
        out.extend(theme_tag_rows(&book.themes, body_width));
        out.push(Line::raw(""));
    }

    if let Some(review) = book.reviews.first() {
        let teaser = super::truncate(&review.quote, 80);
        for row in super::wrap(&format!("“{teaser}”"), body_width) {
            out.push(Line::styled(
                row,
                Style::default()
                    .fg(theme::TEXT_MUTED)
                    .add_modifier(Modifier::ITALIC),
            ));
        }
        out.push(Line::from(Span::styled(
            format!("— {}", review.source.to_uppercase()),
            Style::default().fg(theme::BLOOD_LIGHT),
        )));
        out.push(Line::raw(""));
    }

    out
}

/// Lay theme chips out in rows that fit the width.
fn theme_tag_rows(themes: &[String], width: usize) -> Vec<Line<'static>> {
    let mut rows = Vec::new();
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut used = 0usize;

    for theme_name in themes {
        let chip = format!("[ {theme_name} ]");
        let chip_len = chip.chars().count() + 1;
        if used + chip_len > width && !spans.is_empty() {
            rows.push(Line::from(std::mem::take(&mut spans)));
            used = 0;
        }
        spans.push(Span::styled(chip, Style::default().fg(theme::GOLD)));
        spans.push(Span::raw(" "));
        used += chip_len;
    }
    if !spans.is_empty() {
        rows.push(Line::from(spans));
    }
    rows
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
                "reviews": [{"source": "The Herald", "quote": "Chilling and precise.", "rating": 5}],
                "themes": ["Inheritance", "Guilt", "Small towns"],
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
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_section_content() {
        let text = flatten(&lines(&sample_book(), 80));
        assert!(text.contains("Deconstructed Narrative"));
        assert!(text.contains("Narrative Tension"));
        assert!(text.contains("Core Themes"));
        assert!(text.contains("[ Inheritance ]"));
        assert!(text.contains("[ Guilt ]"));
        // Chart body made it in
        assert!(text.contains('█'));
        // Pull-quote from the first review
        assert!(text.contains("Chilling and precise."));
        assert!(text.contains("— THE HERALD"));
    }

    #[test]
    fn test_theme_tags_wrap() {
        let themes: Vec<String> = (0..8).map(|i| format!("Theme number {i}")).collect();
        let rows = theme_tag_rows(&themes, 40);
        assert!(rows.len() > 1, "eight long chips cannot fit one 40-col row");
    }

    #[test]
    fn test_no_themes_section_when_empty() {
        let mut book = sample_book();
        book.themes.clear();
        let text = flatten(&lines(&book, 80));
        assert!(!text.contains("Core Themes"));
    }
}
