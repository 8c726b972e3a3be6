//! PriceLab TUI - terminal charts for the price pipeline
//!
//! Provides:
//! - Multi-series line charts for prices and returns
//! - Correlation heatmap
//! - A blocking viewer that shows the three charts one after the other

pub mod panels;
pub mod theme;
pub mod viewer;

pub use theme::Theme;
pub use viewer::{show, ChartKind, ChartSet, ViewerError, ViewerOutcome};
