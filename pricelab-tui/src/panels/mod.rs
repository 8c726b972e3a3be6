//! Chart panels
//!
//! - LineChart: one line per column of a date-indexed table (prices, returns)
//! - Heatmap: colored correlation matrix

pub mod heatmap;
pub mod line_chart;

pub use heatmap::CorrelationHeatmap;
pub use line_chart::{LineChartPanel, ValueFormat};
