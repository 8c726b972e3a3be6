//! Multi-series line chart over a date-indexed table.
//!
//! Used for both the price evolution and the period returns. Each column is
//! one dataset; missing cells are left out of its line.

use chrono::NaiveDate;
use pricelab_core::data::PriceTable;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    symbols,
    text::Span,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph, Widget, Wrap},
};

use crate::theme::Theme;

/// How y-axis labels are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueFormat {
    /// Quote-currency price, e.g. `$42150`
    Price,
    /// Fractional value shown as a percentage, e.g. `+12.5%`
    Percent,
}

impl ValueFormat {
    pub fn format(&self, value: f64) -> String {
        match self {
            ValueFormat::Price if value.abs() >= 100.0 => format!("${value:.0}"),
            ValueFormat::Price => format!("${value:.2}"),
            ValueFormat::Percent => format!("{:+.1}%", value * 100.0),
        }
    }
}

/// Line chart widget
pub struct LineChartPanel<'a> {
    table: &'a PriceTable,
    title: &'a str,
    y_title: &'a str,
    format: ValueFormat,
    theme: &'a Theme,
}

impl<'a> LineChartPanel<'a> {
    pub fn new(
        table: &'a PriceTable,
        title: &'a str,
        y_title: &'a str,
        format: ValueFormat,
        theme: &'a Theme,
    ) -> Self {
        Self {
            table,
            title,
            y_title,
            format,
            theme,
        }
    }

    /// Points per column as (days since first row, value).
    fn series_points(&self) -> Vec<(&'a str, Vec<(f64, f64)>)> {
        let table = self.table;
        let Some(origin) = table.dates().first().copied() else {
            return Vec::new();
        };
        table
            .columns()
            .iter()
            .map(|column| {
                let points = table
                    .dates()
                    .iter()
                    .zip(&column.values)
                    .filter_map(|(date, value)| {
                        value
                            .filter(|v| v.is_finite())
                            .map(|v| (day_offset(origin, *date), v))
                    })
                    .collect();
                (column.name.as_str(), points)
            })
            .collect()
    }
}

fn day_offset(origin: NaiveDate, date: NaiveDate) -> f64 {
    (date - origin).num_days() as f64
}

fn render_placeholder(block: Block<'_>, message: &str, theme: &Theme, area: Rect, buf: &mut Buffer) {
    Paragraph::new(message)
        .style(Style::default().fg(theme.text_secondary))
        .wrap(Wrap { trim: true })
        .block(block)
        .render(area, buf);
}

impl<'a> Widget for LineChartPanel<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(format!(" {} ", self.title))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.accent))
            .style(Style::default().bg(self.theme.background));

        let series = self.series_points();
        let values: Vec<f64> = series
            .iter()
            .flat_map(|(_, points)| points.iter().map(|&(_, v)| v))
            .collect();

        let (Some(first), Some(last)) = (self.table.dates().first(), self.table.dates().last())
        else {
            render_placeholder(block, "No data to plot: every symbol failed to download.", self.theme, area, buf);
            return;
        };
        if values.is_empty() {
            render_placeholder(block, "No defined values to plot.", self.theme, area, buf);
            return;
        }

        let x_max = day_offset(*first, *last).max(1.0);
        let y_min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let y_max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        // Add padding to Y axis
        let y_range = y_max - y_min;
        let y_pad = if y_range > 0.0 {
            y_range * 0.05
        } else {
            y_max.abs().max(1.0) * 0.05
        };
        let y_lower = y_min - y_pad;
        let y_upper = y_max + y_pad;

        let datasets: Vec<Dataset> = series
            .iter()
            .enumerate()
            .map(|(i, (name, points))| {
                Dataset::default()
                    .name(*name)
                    .marker(symbols::Marker::Braille)
                    .graph_type(GraphType::Line)
                    .style(Style::default().fg(self.theme.series_color(i)))
                    .data(points)
            })
            .collect();

        let mid = *first + chrono::Duration::days((x_max / 2.0) as i64);
        let x_labels = vec![
            Span::raw(first.format("%Y-%m-%d").to_string()),
            Span::raw(mid.format("%Y-%m-%d").to_string()),
            Span::raw(last.format("%Y-%m-%d").to_string()),
        ];
        let y_labels = vec![
            Span::raw(self.format.format(y_lower)),
            Span::raw(self.format.format((y_lower + y_upper) / 2.0)),
            Span::raw(self.format.format(y_upper)),
        ];

        Chart::new(datasets)
            .block(block)
            .x_axis(
                Axis::default()
                    .title(Span::styled("Time", Style::default().fg(self.theme.text_secondary)))
                    .style(Style::default().fg(self.theme.muted))
                    .bounds([0.0, x_max])
                    .labels(x_labels),
            )
            .y_axis(
                Axis::default()
                    .title(Span::styled(
                        self.y_title,
                        Style::default().fg(self.theme.text_secondary),
                    ))
                    .style(Style::default().fg(self.theme.muted))
                    .bounds([y_lower, y_upper])
                    .labels(y_labels),
            )
            .render(area, buf);
    }
}
