//! Parrot/neon theme tokens for the PriceLab charts
//!
//! # Color Palette
//! - **Background**: Near-black / deep charcoal (base layer)
//! - **Accent**: Electric cyan (borders, first series)
//! - **Positive**: Neon green (gains, strong positive correlation)
//! - **Negative**: Hot pink (losses, strong negative correlation)
//! - **Warning**: Neon orange (series, mild negative correlation)
//! - **Neutral**: Cool purple (series, heatmap border)
//! - **Muted**: Steel blue (axes, weak correlation)

use ratatui::style::Color;

/// Parrot/neon theme for PriceLab charts
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    /// Near-black background (primary surface)
    pub background: Color,
    /// Electric cyan accent (focus, highlights)
    pub accent: Color,
    /// Neon green (positive values, gains)
    pub positive: Color,
    /// Hot pink (negative values, losses)
    pub negative: Color,
    /// Neon orange (warnings, alerts)
    pub warning: Color,
    /// Cool purple (neutral info, secondary)
    pub neutral: Color,
    /// Steel blue (muted text, axes)
    pub muted: Color,
    /// White (primary text)
    pub text_primary: Color,
    /// Light gray (secondary text)
    pub text_secondary: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::parrot_neon()
    }
}

impl Theme {
    /// Create the default Parrot/neon theme
    pub fn parrot_neon() -> Self {
        Self {
            // Background: deep charcoal (almost black)
            background: Color::Rgb(18, 18, 20),

            // Accent: electric cyan
            accent: Color::Rgb(0, 255, 255),

            // Positive: neon green
            positive: Color::Rgb(0, 255, 128),

            // Negative: hot pink
            negative: Color::Rgb(255, 20, 147),

            // Warning: neon orange
            warning: Color::Rgb(255, 140, 0),

            // Neutral: cool purple
            neutral: Color::Rgb(147, 112, 219),

            // Muted: steel blue
            muted: Color::Rgb(100, 149, 237),

            // Text colors
            text_primary: Color::White,
            text_secondary: Color::Rgb(170, 170, 170),
        }
    }

    /// Line color for the `index`-th series, cycling through the palette
    pub fn series_color(&self, index: usize) -> Color {
        let cycle = [
            self.accent,
            self.warning,
            self.positive,
            self.negative,
            self.neutral,
            self.muted,
        ];
        cycle[index % cycle.len()]
    }

    /// Heatmap cell color for a correlation coefficient
    pub fn correlation_color(&self, r: Option<f64>) -> Color {
        match r {
            Some(r) if r >= 0.75 => self.positive,
            Some(r) if r >= 0.25 => self.accent,
            Some(r) if r > -0.25 => self.muted,
            Some(r) if r > -0.75 => self.warning,
            Some(_) => self.negative,
            None => self.background,
        }
    }
}
