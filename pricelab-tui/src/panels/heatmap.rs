//! Correlation heatmap panel
//!
//! Layout inside the border:
//! - Header row of column labels
//! - One row per symbol: row label, then one colored cell per column with
//!   the coefficient printed in it (`n/a` when undefined)

use pricelab_core::analysis::CorrelationMatrix;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::theme::Theme;

const MIN_CELL_WIDTH: u16 = 7;
const MAX_CELL_WIDTH: u16 = 14;

/// Heatmap widget
pub struct CorrelationHeatmap<'a> {
    matrix: &'a CorrelationMatrix,
    title: &'a str,
    theme: &'a Theme,
}

impl<'a> CorrelationHeatmap<'a> {
    pub fn new(matrix: &'a CorrelationMatrix, title: &'a str, theme: &'a Theme) -> Self {
        Self {
            matrix,
            title,
            theme,
        }
    }

    fn label_width(&self) -> u16 {
        let longest = self
            .matrix
            .labels()
            .iter()
            .map(|l| l.chars().count())
            .max()
            .unwrap_or(0);
        u16::try_from(longest).unwrap_or(u16::MAX).saturating_add(1)
    }
}

fn fit(text: &str, width: u16) -> String {
    let width = usize::from(width);
    let truncated: String = text.chars().take(width).collect();
    format!("{truncated:^width$}")
}

impl<'a> Widget for CorrelationHeatmap<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(format!(" {} ", self.title))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.neutral))
            .style(Style::default().bg(self.theme.background));

        let n = self.matrix.size();
        if n == 0 {
            Paragraph::new("No columns to correlate.")
                .style(Style::default().fg(self.theme.text_secondary))
                .block(block)
                .render(area, buf);
            return;
        }

        let inner = block.inner(area);
        block.render(area, buf);

        let label_width = self.label_width().min(inner.width / 3);
        let cell_width = (inner.width.saturating_sub(label_width) / n as u16)
            .clamp(MIN_CELL_WIDTH, MAX_CELL_WIDTH);
        let cell_height = (inner.height.saturating_sub(1) / n as u16).clamp(1, 3);

        let label_style = Style::default()
            .fg(self.theme.text_primary)
            .add_modifier(Modifier::BOLD);

        // Header row
        for (j, label) in self.matrix.labels().iter().enumerate() {
            let x = inner.x + label_width + j as u16 * cell_width;
            if x + cell_width > inner.right() {
                break;
            }
            buf.set_string(x, inner.y, fit(label, cell_width), label_style);
        }

        for (i, label) in self.matrix.labels().iter().enumerate() {
            let top = inner.y + 1 + i as u16 * cell_height;
            if top + cell_height > inner.bottom() {
                break;
            }
            let text_row = top + cell_height / 2;
            buf.set_string(
                inner.x,
                text_row,
                fit(label, label_width.saturating_sub(1)),
                label_style,
            );

            for j in 0..n {
                let x = inner.x + label_width + j as u16 * cell_width;
                if x + cell_width > inner.right() {
                    break;
                }
                let r = self.matrix.get(i, j);
                let fill = Style::default().bg(self.theme.correlation_color(r));
                let text_style = fill.fg(self.theme.background).add_modifier(Modifier::BOLD);
                let text = match r {
                    Some(r) => format!("{r:+.2}"),
                    None => "n/a".to_string(),
                };
                let text_style = if r.is_some() {
                    text_style
                } else {
                    text_style.fg(self.theme.text_secondary)
                };

                for y in top..top + cell_height {
                    let content = if y == text_row {
                        fit(&text, cell_width)
                    } else {
                        " ".repeat(usize::from(cell_width))
                    };
                    buf.set_string(x, y, content, text_style);
                }
            }
        }
    }
}
