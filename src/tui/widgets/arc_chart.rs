//! Narrative-tension chart widget for ratatui.
//!
//! Renders the emotional arc as an area chart built from Unicode block
//! glyphs: one column per arc point, scaled to its tension value, with a
//! chapter axis underneath. The peak column is highlighted and its label
//! (when present) is called out below the axis.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

use crate::core::book::EmotionalArcPoint;
use crate::tui::theme;

/// Default number of rows in the plot body.
pub const DEFAULT_PLOT_HEIGHT: u16 = 8;

/// An area chart of the narrative tension curve.
///
/// # Example
///
/// ```ignore
/// let chart = ArcChart::new(&book.emotional_arc).plot_height(8);
/// frame.render_widget(chart, area);
/// ```
pub struct ArcChart<'a> {
    points: &'a [EmotionalArcPoint],
    plot_height: u16,
}

impl<'a> ArcChart<'a> {
    pub fn new(points: &'a [EmotionalArcPoint]) -> Self {
        Self {
            points,
            plot_height: DEFAULT_PLOT_HEIGHT,
        }
    }

    pub fn plot_height(mut self, rows: u16) -> Self {
        self.plot_height = rows.max(1);
        self
    }

    /// Index of the highest-tension point.
    fn peak_index(&self) -> Option<usize> {
        self.points
            .iter()
            .enumerate()
            .max_by_key(|(_, p)| p.tension)
            .map(|(i, _)| i)
    }

    /// Build the rendered lines for a given width: plot body rows from top
    /// to bottom, an axis rule, a chapter row, and an optional peak label.
    pub fn build_lines(&self, width: u16) -> Vec<Line<'static>> {
        if self.points.is_empty() || width == 0 {
            return vec![Line::styled("no arc data", theme::dim())];
        }

        let n = self.points.len();
        let col_w = ((width as usize) / n).clamp(3, 9);
        let bar_w = col_w - 1;
        let peak = self.peak_index();

        // Column heights in half-rows for half-block resolution
        let total_halves = self.plot_height as u32 * 2;
        let halves: Vec<u32> = self
            .points
            .iter()
            .map(|p| (u32::from(p.tension) * total_halves + 50) / 100)
            .collect();

        let mut lines = Vec::new();

        for row in (0..self.plot_height).rev() {
            // Cell at this row is full below `row * 2`, half at an odd remainder
            let mut spans = Vec::with_capacity(n);
            for (i, &h) in halves.iter().enumerate() {
                let floor = u32::from(row) * 2;
                let glyph = if h >= floor + 2 {
                    "█"
                } else if h == floor + 1 {
                    "▄"
                } else {
                    " "
                };
                let color = if Some(i) == peak {
                    theme::BLOOD_LIGHT
                } else {
                    theme::BLOOD
                };
                let cell = format!("{} ", glyph.repeat(bar_w));
                spans.push(Span::styled(cell, Style::default().fg(color)));
            }
            lines.push(Line::from(spans));
        }

        // Axis rule
        lines.push(Line::styled(
            "─".repeat((col_w * n).min(width as usize)),
            theme::dim(),
        ));

        // Chapter row
        let mut chapter_spans = Vec::with_capacity(n);
        for (i, point) in self.points.iter().enumerate() {
            let label = format!("{:^width$}", point.chapter, width = col_w);
            let style = if Some(i) == peak {
                Style::default()
                    .fg(theme::BLOOD_LIGHT)
                    .add_modifier(Modifier::BOLD)
            } else {
                theme::muted()
            };
            chapter_spans.push(Span::styled(label, style));
        }
        lines.push(Line::from(chapter_spans));

        // Peak callout
        if let Some(i) = peak {
            let point = &self.points[i];
            if !point.label.is_empty() {
                lines.push(Line::from(vec![
                    Span::styled("▲ ", Style::default().fg(theme::BLOOD_LIGHT)),
                    Span::styled(
                        format!("peak: {} (ch. {})", point.label, point.chapter),
                        theme::muted(),
                    ),
                ]));
            }
        }

        lines
    }
}

impl Widget for ArcChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let lines = self.build_lines(area.width);

        for (i, line) in lines.iter().take(area.height as usize).enumerate() {
            let y = area.y + i as u16;
            let mut x = area.x;
            let max_x = area.x + area.width;

            for span in &line.spans {
                if x >= max_x {
                    break;
                }
                let available = (max_x - x) as usize;
                let text: String = span.content.chars().take(available).collect();
                let width = text.chars().count() as u16;
                buf.set_string(x, y, &text, span.style);
                x += width;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(chapter: u32, tension: u8, label: &str) -> EmotionalArcPoint {
        EmotionalArcPoint {
            chapter,
            tension,
            label: label.to_string(),
        }
    }

    /// Helper: create a Buffer of the given size and render the widget into it.
    fn render_to_string(widget: ArcChart<'_>, width: u16, height: u16) -> Vec<String> {
        let area = Rect::new(0, 0, width, height);
        let mut buf = Buffer::empty(area);
        widget.render(area, &mut buf);

        (0..height)
            .map(|y| {
                (0..width)
                    .map(|x| {
                        buf.cell((x, y))
                            .map_or(' ', |c| c.symbol().chars().next().unwrap_or(' '))
                    })
                    .collect::<String>()
                    .trim_end()
                    .to_string()
            })
            .collect()
    }

    #[test]
    fn test_empty_arc() {
        let points: Vec<EmotionalArcPoint> = vec![];
        let widget = ArcChart::new(&points);
        let output = render_to_string(widget, 40, 5);
        assert!(output[0].contains("no arc data"));
    }

    #[test]
    fn test_full_tension_reaches_top_row() {
        let points = vec![point(1, 100, "")];
        let widget = ArcChart::new(&points).plot_height(4);
        let output = render_to_string(widget, 12, 7);
        // Top plot row is filled for a 100-tension point
        assert!(output[0].contains('█'), "top row should be filled: {output:?}");
    }

    #[test]
    fn test_zero_tension_is_blank() {
        let points = vec![point(1, 0, "")];
        let widget = ArcChart::new(&points).plot_height(4);
        let output = render_to_string(widget, 12, 7);
        for row in &output[..4] {
            assert!(
                !row.contains('█') && !row.contains('▄'),
                "zero tension should draw nothing: {output:?}"
            );
        }
    }

    #[test]
    fn test_low_tension_stays_low() {
        let points = vec![point(1, 25, ""), point(2, 100, "")];
        let widget = ArcChart::new(&points).plot_height(4);
        let output = render_to_string(widget, 12, 7);
        // The 25-tension column must not appear in the top plot row
        let top = &output[0];
        let bottom = &output[3];
        assert!(top.trim_start().len() < top.len() || !top.starts_with('█'));
        assert!(bottom.contains('█'), "bottom row should have bars: {output:?}");
    }

    #[test]
    fn test_chapter_axis_rendered() {
        let points = vec![point(1, 40, ""), point(7, 80, ""), point(12, 60, "")];
        let widget = ArcChart::new(&points).plot_height(4);
        let output = render_to_string(widget, 30, 8);
        let joined = output.join("\n");
        assert!(joined.contains('1'), "missing chapter 1: {joined}");
        assert!(joined.contains('7'), "missing chapter 7: {joined}");
        assert!(joined.contains("12"), "missing chapter 12: {joined}");
        assert!(joined.contains('─'), "missing axis rule: {joined}");
    }

    #[test]
    fn test_peak_label_called_out() {
        let points = vec![point(1, 20, "The return"), point(9, 95, "The reveal")];
        let widget = ArcChart::new(&points).plot_height(4);
        let output = render_to_string(widget, 30, 9);
        let joined = output.join("\n");
        assert!(
            joined.contains("peak: The reveal (ch. 9)"),
            "missing peak callout: {joined}"
        );
    }

    #[test]
    fn test_no_label_no_callout() {
        let points = vec![point(1, 20, ""), point(9, 95, "")];
        let widget = ArcChart::new(&points).plot_height(4);
        let lines = widget.build_lines(30);
        // plot rows + axis + chapter row, nothing else
        assert_eq!(lines.len(), 4 + 2);
    }

    #[test]
    fn test_zero_area_does_not_panic() {
        let points = vec![point(1, 50, "x")];
        let area = Rect::new(0, 0, 0, 0);
        let mut buf = Buffer::empty(area);
        ArcChart::new(&points).render(area, &mut buf);
        // No panic = pass.
    }
}
